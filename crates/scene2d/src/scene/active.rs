use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard};

use image::RgbaImage;
use resvg::usvg;
use thiserror::Error;
use tracing::warn;

use super::prepare::{raster_fits, resize_or_placeholder};

#[derive(Debug, Error)]
pub enum ActiveSourceError {
    #[error("failed to parse svg document: {0}")]
    Svg(#[source] usvg::Error),
}

/// Live drawable behind an [`ActiveObject2D`](super::ActiveObject2D).
///
/// Bitmaps are shared and may be rewritten by application code between frames;
/// vector sources are rasterized at whatever size the frame needs.
#[derive(Clone)]
pub enum ActiveSource {
    Bitmap(Arc<RwLock<RgbaImage>>),
    Vector(Arc<usvg::Tree>),
}

impl Default for ActiveSource {
    fn default() -> Self {
        ActiveSource::Bitmap(Arc::new(RwLock::new(RgbaImage::new(0, 0))))
    }
}

impl fmt::Debug for ActiveSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (width, height) = self.natural_size();
        let kind = match self {
            ActiveSource::Bitmap(_) => "Bitmap",
            ActiveSource::Vector(_) => "Vector",
        };
        f.debug_struct(kind)
            .field("width", &width)
            .field("height", &height)
            .finish()
    }
}

impl ActiveSource {
    pub fn bitmap(image: RgbaImage) -> Self {
        ActiveSource::Bitmap(Arc::new(RwLock::new(image)))
    }

    pub fn from_svg(data: &[u8]) -> Result<Self, ActiveSourceError> {
        let options = usvg::Options::default();
        let tree = usvg::Tree::from_data(data, &options).map_err(ActiveSourceError::Svg)?;
        Ok(ActiveSource::Vector(Arc::new(tree)))
    }

    pub fn natural_size(&self) -> (u32, u32) {
        match self {
            ActiveSource::Bitmap(bitmap) => read_bitmap(bitmap).dimensions(),
            ActiveSource::Vector(tree) => {
                let size = tree.size();
                (
                    size.width().ceil().max(0.0) as u32,
                    size.height().ceil().max(0.0) as u32,
                )
            }
        }
    }

    /// Draws the current state of the source at `width` x `height`.
    pub fn rasterize(&self, width: u32, height: u32) -> RgbaImage {
        match self {
            ActiveSource::Bitmap(bitmap) => {
                resize_or_placeholder(&read_bitmap(bitmap), width, height)
            }
            ActiveSource::Vector(tree) => {
                rasterize_svg(tree, (width, height), RasterRegion::full(width, height))
            }
        }
    }

    /// Draws only `region` of the source as it would look scaled to
    /// `full_width` x `full_height`. Regions over the raster size limit yield
    /// a 1x1 transparent placeholder.
    pub fn rasterize_region(
        &self,
        full_width: u32,
        full_height: u32,
        region: RasterRegion,
    ) -> RgbaImage {
        if region == RasterRegion::full(full_width, full_height) {
            return self.rasterize(full_width, full_height);
        }
        if region.width == 0 || region.height == 0 {
            return RgbaImage::new(1, 1);
        }
        if !raster_fits(region.width, region.height) {
            warn!(
                width = region.width,
                height = region.height,
                "active_region_over_size_limit"
            );
            return RgbaImage::new(1, 1);
        }
        match self {
            ActiveSource::Bitmap(bitmap) => {
                sample_bitmap_region(&read_bitmap(bitmap), (full_width, full_height), region)
            }
            ActiveSource::Vector(tree) => rasterize_svg(tree, (full_width, full_height), region),
        }
    }
}

/// Pixel rectangle inside a scaled raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl RasterRegion {
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }
}

fn read_bitmap(bitmap: &RwLock<RgbaImage>) -> RwLockReadGuard<'_, RgbaImage> {
    match bitmap.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Nearest-neighbour sampling of the part of `source` that lands in `region`.
fn sample_bitmap_region(source: &RgbaImage, full: (u32, u32), region: RasterRegion) -> RgbaImage {
    let mut out = RgbaImage::new(region.width, region.height);
    if source.width() == 0 || source.height() == 0 || full.0 == 0 || full.1 == 0 {
        return out;
    }
    let x_ratio = source.width() as f64 / full.0 as f64;
    let y_ratio = source.height() as f64 / full.1 as f64;
    let max_x = (source.width() - 1) as f64;
    let max_y = (source.height() - 1) as f64;
    for (out_x, out_y, pixel) in out.enumerate_pixels_mut() {
        let src_x = ((f64::from(region.x) + f64::from(out_x) + 0.5) * x_ratio)
            .floor()
            .clamp(0.0, max_x);
        let src_y = ((f64::from(region.y) + f64::from(out_y) + 0.5) * y_ratio)
            .floor()
            .clamp(0.0, max_y);
        *pixel = *source.get_pixel(src_x as u32, src_y as u32);
    }
    out
}

fn rasterize_svg(tree: &usvg::Tree, full: (u32, u32), region: RasterRegion) -> RgbaImage {
    if !raster_fits(region.width, region.height) {
        warn!(
            width = region.width,
            height = region.height,
            "svg_raster_over_size_limit"
        );
        return RgbaImage::new(1, 1);
    }
    let Some(mut pixmap) = tiny_skia::Pixmap::new(region.width, region.height) else {
        return RgbaImage::new(1, 1);
    };
    let tree_size = tree.size();
    let sx = full.0 as f32 / tree_size.width().max(f32::EPSILON);
    let sy = full.1 as f32 / tree_size.height().max(f32::EPSILON);
    let transform = tiny_skia::Transform::from_scale(sx, sy)
        .post_translate(-(region.x as f32), -(region.y as f32));
    resvg::render(tree, transform, &mut pixmap.as_mut());

    let mut out = RgbaImage::new(region.width, region.height);
    for (dst, src) in out.pixels_mut().zip(pixmap.pixels()) {
        let color = src.demultiply();
        dst.0 = [color.red(), color.green(), color.blue(), color.alpha()];
    }
    out
}
