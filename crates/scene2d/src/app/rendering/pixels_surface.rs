use std::sync::Arc;

use image::RgbaImage;
use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::geometry::Rgba;

use super::raster::{clear_frame, draw_image_scaled, fill_rect_clipped, stroke_line_clipped};
use super::surface::{DrawingSurface, SurfaceDefaults};

/// Window-backed surface. Drawing goes into the `pixels` frame buffer;
/// [`present`](PixelsSurface::present) pushes it to the window.
pub struct PixelsSurface {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    width: u32,
    height: u32,
    defaults: SurfaceDefaults,
}

impl PixelsSurface {
    pub fn new(window: Arc<Window>, width: u32, height: u32) -> Result<Self, Error> {
        let width = width.max(1);
        let height = height.max(1);
        let pixels = Self::build_pixels(Arc::clone(&window), width, height)?;
        Ok(Self {
            window,
            pixels,
            width,
            height,
            defaults: SurfaceDefaults::default(),
        })
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub fn defaults(&self) -> &SurfaceDefaults {
        &self.defaults
    }

    pub fn present(&self) -> Result<(), Error> {
        self.pixels.render()
    }
}

impl DrawingSurface for PixelsSurface {
    type Error = Error;

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn configure(
        &mut self,
        width: u32,
        height: u32,
        defaults: &SurfaceDefaults,
    ) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        if (width, height) != (self.width, self.height) {
            self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
            self.width = width;
            self.height = height;
        }
        self.defaults = defaults.clone();
        clear_frame(self.pixels.frame_mut(), [0, 0, 0, 0]);
        Ok(())
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgba) {
        let (frame_width, frame_height) = (self.width, self.height);
        fill_rect_clipped(
            self.pixels.frame_mut(),
            frame_width,
            frame_height,
            x,
            y,
            width,
            height,
            color,
        );
    }

    fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), thickness: f64, color: Rgba) {
        let (frame_width, frame_height) = (self.width, self.height);
        stroke_line_clipped(
            self.pixels.frame_mut(),
            frame_width,
            frame_height,
            from,
            to,
            thickness,
            color,
        );
    }

    fn draw_image(&mut self, image: &RgbaImage, x: f64, y: f64, width: f64, height: f64) {
        let (frame_width, frame_height) = (self.width, self.height);
        draw_image_scaled(
            self.pixels.frame_mut(),
            frame_width,
            frame_height,
            image,
            x,
            y,
            width,
            height,
        );
    }
}
