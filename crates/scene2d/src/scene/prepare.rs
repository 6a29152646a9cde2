use std::io::Cursor;

use base64::Engine as _;
use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbaImage};
use tracing::warn;

use crate::geometry::Vector2D;

pub const DATA_URL_PNG_PREFIX: &str = "data:image/png;base64,";

/// Output of one preparation pass over a passive object's source image.
#[derive(Debug, Clone)]
pub(crate) struct PreparedImage {
    pub(crate) render_width: f64,
    pub(crate) render_height: f64,
    pub(crate) raster: RgbaImage,
    pub(crate) data_url: String,
}

/// `(explicit size or natural size) * (positive scale or 1)` per axis.
pub fn compute_render_size(size: Vector2D, scale: Vector2D, natural: (u32, u32)) -> (f64, f64) {
    (
        target_dimension(size.x(), natural.0, scale.x()),
        target_dimension(size.y(), natural.1, scale.y()),
    )
}

fn target_dimension(explicit: f64, natural: u32, scale: f64) -> f64 {
    let base = if explicit >= 0.0 {
        explicit
    } else {
        natural as f64
    };
    if scale > 0.0 {
        base * scale
    } else {
        base
    }
}

/// Upper bound on the pixel count of any raster built for drawing.
pub(crate) const MAX_RASTER_PIXELS: u64 = 4096 * 4096;

pub(crate) fn raster_fits(width: u32, height: u32) -> bool {
    u64::from(width) * u64::from(height) <= MAX_RASTER_PIXELS
}

pub(crate) fn raster_dimension(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    value.round().min(u32::MAX as f64) as u32
}

pub(crate) fn prepare_image(source: &RgbaImage, size: Vector2D, scale: Vector2D) -> PreparedImage {
    let (render_width, render_height) = compute_render_size(size, scale, source.dimensions());
    let raster = resize_or_placeholder(
        source,
        raster_dimension(render_width),
        raster_dimension(render_height),
    );
    let data_url = match encode_png_data_url(&raster) {
        Ok(url) => url,
        Err(error) => {
            warn!(error = %error, "prepared_image_png_encode_failed");
            String::new()
        }
    };
    PreparedImage {
        render_width,
        render_height,
        raster,
        data_url,
    }
}

/// Zero-area targets and targets over [`MAX_RASTER_PIXELS`] become a 1x1
/// transparent raster.
pub(crate) fn resize_or_placeholder(source: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    if width == 0 || height == 0 {
        return RgbaImage::new(1, 1);
    }
    if !raster_fits(width, height) {
        warn!(width, height, max_pixels = MAX_RASTER_PIXELS, "raster_over_size_limit");
        return RgbaImage::new(1, 1);
    }
    if source.width() == 0 || source.height() == 0 {
        return RgbaImage::new(width, height);
    }
    if source.dimensions() == (width, height) {
        return source.clone();
    }
    imageops::resize(source, width, height, FilterType::Triangle)
}

pub fn encode_png_data_url(raster: &RgbaImage) -> Result<String, image::ImageError> {
    let mut png = Vec::new();
    raster.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(&png);
    Ok(format!("{DATA_URL_PNG_PREFIX}{encoded}"))
}
