use image::RgbaImage;

use crate::geometry::Rgba;

pub const DEFAULT_FONT: &str = "bold 12px sans-serif";

/// 2x3 affine matrix in `[a, b, c, d, e, f]` order.
pub type Transform2D = [f64; 6];

pub const IDENTITY_TRANSFORM: Transform2D = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// State applied to a surface whenever it is (re)configured.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceDefaults {
    pub font: &'static str,
    pub fill: Rgba,
    pub transform: Transform2D,
}

impl Default for SurfaceDefaults {
    fn default() -> Self {
        Self {
            font: DEFAULT_FONT,
            fill: [0, 0, 0, 255],
            transform: IDENTITY_TRANSFORM,
        }
    }
}

/// Immediate-mode 2D target the render step draws into.
///
/// Coordinates are in surface pixels with the origin at the top-left. Drawing
/// calls clip silently; only reconfiguration can fail.
pub trait DrawingSurface {
    type Error: std::error::Error + 'static;

    fn size(&self) -> (u32, u32);

    fn configure(
        &mut self,
        width: u32,
        height: u32,
        defaults: &SurfaceDefaults,
    ) -> Result<(), Self::Error>;

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgba);

    fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), thickness: f64, color: Rgba);

    /// Draws `image` stretched over the destination rectangle.
    fn draw_image(&mut self, image: &RgbaImage, x: f64, y: f64, width: f64, height: f64);
}
