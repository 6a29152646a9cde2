use std::convert::Infallible;

use image::RgbaImage;

use crate::geometry::Rgba;

use super::raster::{clear_frame, draw_image_scaled, fill_rect_clipped, stroke_line_clipped};
use super::surface::{DrawingSurface, SurfaceDefaults};

/// Software RGBA surface for offscreen rendering.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    defaults: SurfaceDefaults,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; frame_len(width, height)],
            defaults: SurfaceDefaults::default(),
        }
    }

    pub fn frame(&self) -> &[u8] {
        &self.pixels
    }

    pub fn defaults(&self) -> &SurfaceDefaults {
        &self.defaults
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let bytes = self.pixels.get(offset..offset + 4)?;
        Some([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    pub fn to_image(&self) -> Option<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
    }
}

impl DrawingSurface for FrameBuffer {
    type Error = Infallible;

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn configure(
        &mut self,
        width: u32,
        height: u32,
        defaults: &SurfaceDefaults,
    ) -> Result<(), Infallible> {
        self.width = width;
        self.height = height;
        self.pixels = vec![0; frame_len(width, height)];
        self.defaults = defaults.clone();
        Ok(())
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgba) {
        let covers_frame =
            x == 0.0 && y == 0.0 && width >= self.width as f64 && height >= self.height as f64;
        if covers_frame && color[3] == u8::MAX {
            clear_frame(&mut self.pixels, color);
            return;
        }
        fill_rect_clipped(
            &mut self.pixels,
            self.width,
            self.height,
            x,
            y,
            width,
            height,
            color,
        );
    }

    fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), thickness: f64, color: Rgba) {
        stroke_line_clipped(
            &mut self.pixels,
            self.width,
            self.height,
            from,
            to,
            thickness,
            color,
        );
    }

    fn draw_image(&mut self, image: &RgbaImage, x: f64, y: f64, width: f64, height: f64) {
        draw_image_scaled(
            &mut self.pixels,
            self.width,
            self.height,
            image,
            x,
            y,
            width,
            height,
        );
    }
}

fn frame_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configure_resizes_and_clears() {
        let mut buffer = FrameBuffer::new(2, 2);
        buffer.fill_rect(0.0, 0.0, 2.0, 2.0, [1, 1, 1, 255]);
        buffer
            .configure(3, 1, &SurfaceDefaults::default())
            .expect("infallible");
        assert_eq!(buffer.size(), (3, 1));
        assert_eq!(buffer.pixel(2, 0), Some([0, 0, 0, 0]));
        assert_eq!(buffer.pixel(0, 1), None);
        assert_eq!(buffer.defaults().font, "bold 12px sans-serif");
    }

    #[test]
    fn full_screen_fill_covers_every_pixel() {
        let mut buffer = FrameBuffer::new(3, 2);
        buffer.fill_rect(0.0, 0.0, 3.0, 2.0, [0, 0, 0, 255]);
        let image = buffer.to_image().expect("sized");
        assert!(image.pixels().all(|p| p.0 == [0, 0, 0, 255]));
    }
}
