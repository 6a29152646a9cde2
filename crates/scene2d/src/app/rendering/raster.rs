use image::RgbaImage;

use crate::geometry::Rgba;

pub(crate) fn clear_frame(frame: &mut [u8], color: Rgba) {
    for chunk in frame.chunks_exact_mut(4) {
        chunk.copy_from_slice(&color);
    }
}

/// Source-over blend of a straight-alpha color onto one frame pixel.
pub(crate) fn blend_pixel_rgba_clipped(frame: &mut [u8], width: usize, x: i32, y: i32, color: Rgba) {
    if x < 0 || y < 0 || color[3] == 0 {
        return;
    }
    let x = x as usize;
    let y = y as usize;
    if x >= width {
        return;
    }
    let Some(pixel_offset) = y.checked_mul(width).and_then(|row| row.checked_add(x)) else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(end) = byte_offset.checked_add(4) else {
        return;
    };
    if end > frame.len() {
        return;
    }
    let dst = &mut frame[byte_offset..end];
    if color[3] == u8::MAX {
        dst.copy_from_slice(&color);
        return;
    }

    let src_a = color[3] as f32 / 255.0;
    let dst_a = dst[3] as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    if out_a <= 0.0 {
        dst.copy_from_slice(&[0, 0, 0, 0]);
        return;
    }
    for channel in 0..3 {
        let src = color[channel] as f32 * src_a;
        let below = dst[channel] as f32 * dst_a * (1.0 - src_a);
        dst[channel] = ((src + below) / out_a).round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

/// Half-open pixel range covered by `[start, start + len)` and clipped to
/// `[0, limit)`. Negative lengths extend towards lower coordinates.
pub(crate) fn clipped_span(start: f64, len: f64, limit: u32) -> Option<(i32, i32)> {
    if !start.is_finite() || !len.is_finite() {
        return None;
    }
    let (low, high) = if len < 0.0 {
        (start + len, start)
    } else {
        (start, start + len)
    };
    let low = low.round().max(0.0);
    let high = high.round().min(limit as f64);
    if low >= high {
        return None;
    }
    Some((low as i32, high as i32))
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn fill_rect_clipped(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x: f64,
    y: f64,
    rect_width: f64,
    rect_height: f64,
    color: Rgba,
) {
    let Some((left, right)) = clipped_span(x, rect_width, width) else {
        return;
    };
    let Some((top, bottom)) = clipped_span(y, rect_height, height) else {
        return;
    };
    for py in top..bottom {
        for px in left..right {
            blend_pixel_rgba_clipped(frame, width as usize, px, py, color);
        }
    }
}

/// Axis-aligned strokes are filled as a rectangle centered on the line; other
/// strokes are rendered anti-aliased with `tiny-skia` and blended in.
pub(crate) fn stroke_line_clipped(
    frame: &mut [u8],
    width: u32,
    height: u32,
    from: (f64, f64),
    to: (f64, f64),
    thickness: f64,
    color: Rgba,
) {
    if !thickness.is_finite() || thickness <= 0.0 {
        return;
    }
    let half = thickness / 2.0;
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    if dx == 0.0 {
        fill_rect_clipped(frame, width, height, from.0 - half, from.1, thickness, dy, color);
        return;
    }
    if dy == 0.0 {
        fill_rect_clipped(frame, width, height, from.0, from.1 - half, dx, thickness, color);
        return;
    }
    if !dx.is_finite() || !dy.is_finite() {
        return;
    }
    stroke_diagonal(frame, width, height, from, to, thickness, color);
}

/// Renders the stroke into a scratch pixmap covering its clipped bounding box,
/// then source-over blends the demultiplied result into the frame.
fn stroke_diagonal(
    frame: &mut [u8],
    width: u32,
    height: u32,
    from: (f64, f64),
    to: (f64, f64),
    thickness: f64,
    color: Rgba,
) {
    let half = thickness / 2.0;
    let span_x = (to.0 - from.0).abs() + thickness;
    let span_y = (to.1 - from.1).abs() + thickness;
    let Some((left, right)) = clipped_span(from.0.min(to.0) - half, span_x, width) else {
        return;
    };
    let Some((top, bottom)) = clipped_span(from.1.min(to.1) - half, span_y, height) else {
        return;
    };
    let box_width = (right - left) as u32;
    let box_height = (bottom - top) as u32;
    let Some(mut pixmap) = tiny_skia::Pixmap::new(box_width, box_height) else {
        return;
    };

    let mut builder = tiny_skia::PathBuilder::new();
    builder.move_to((from.0 - left as f64) as f32, (from.1 - top as f64) as f32);
    builder.line_to((to.0 - left as f64) as f32, (to.1 - top as f64) as f32);
    let Some(path) = builder.finish() else {
        return;
    };
    let mut paint = tiny_skia::Paint::default();
    paint.set_color_rgba8(color[0], color[1], color[2], color[3]);
    paint.anti_alias = true;
    let stroke = tiny_skia::Stroke {
        width: thickness as f32,
        ..tiny_skia::Stroke::default()
    };
    pixmap.stroke_path(&path, &paint, &stroke, tiny_skia::Transform::identity(), None);

    for (index, pixel) in pixmap.pixels().iter().enumerate() {
        let color = pixel.demultiply();
        let px = left + (index as u32 % box_width) as i32;
        let py = top + (index as u32 / box_width) as i32;
        blend_pixel_rgba_clipped(
            frame,
            width as usize,
            px,
            py,
            [color.red(), color.green(), color.blue(), color.alpha()],
        );
    }
}

/// Nearest-neighbour blit of `image` stretched over the destination rectangle.
#[allow(clippy::too_many_arguments)]
pub(crate) fn draw_image_scaled(
    frame: &mut [u8],
    width: u32,
    height: u32,
    image: &RgbaImage,
    x: f64,
    y: f64,
    dest_width: f64,
    dest_height: f64,
) {
    if image.width() == 0 || image.height() == 0 || width == 0 || height == 0 {
        return;
    }
    if !(dest_width > 0.0 && dest_height > 0.0) {
        return;
    }
    let Some((left, right)) = clipped_span(x, dest_width, width) else {
        return;
    };
    let Some((top, bottom)) = clipped_span(y, dest_height, height) else {
        return;
    };

    let x_ratio = image.width() as f64 / dest_width;
    let y_ratio = image.height() as f64 / dest_height;
    for out_y in top..bottom {
        let src_y = ((out_y as f64 + 0.5 - y) * y_ratio).floor();
        let src_y = src_y.clamp(0.0, (image.height() - 1) as f64) as u32;
        for out_x in left..right {
            let src_x = ((out_x as f64 + 0.5 - x) * x_ratio).floor();
            let src_x = src_x.clamp(0.0, (image.width() - 1) as f64) as u32;
            let color = image.get_pixel(src_x, src_y).0;
            blend_pixel_rgba_clipped(frame, width as usize, out_x, out_y, color);
        }
    }
}
