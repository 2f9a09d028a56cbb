//! Drawing primitives on RGB canvases

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut, draw_line_segment_mut};

/// Line of the given thickness, built from parallel one-pixel segments
pub fn thick_line(
    canvas: &mut RgbImage,
    from: (f32, f32),
    to: (f32, f32),
    thickness: u32,
    color: Rgb<u8>,
) {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let length = (dx * dx + dy * dy).sqrt();
    if length < f32::EPSILON {
        let radius = (thickness / 2).max(1) as i32;
        draw_filled_circle_mut(canvas, (from.0 as i32, from.1 as i32), radius, color);
        return;
    }

    // Unit normal
    let (nx, ny) = (-dy / length, dx / length);
    let half = (thickness.max(1) - 1) as f32 / 2.0;
    for i in 0..thickness.max(1) {
        let offset = i as f32 - half;
        let (ox, oy) = (nx * offset, ny * offset);
        draw_line_segment_mut(canvas, (from.0 + ox, from.1 + oy), (to.0 + ox, to.1 + oy), color);
    }
}

/// Filled keypoint marker with an optional contrasting ring
pub fn marker(
    canvas: &mut RgbImage,
    center: (f32, f32),
    radius: i32,
    color: Rgb<u8>,
    outline: Option<Rgb<u8>>,
) {
    let c = (center.0.round() as i32, center.1.round() as i32);
    draw_filled_circle_mut(canvas, c, radius, color);
    if let Some(ring) = outline {
        draw_hollow_circle_mut(canvas, c, radius, ring);
    }
}

/// Ring of the given thickness
pub fn ring(
    canvas: &mut RgbImage,
    center: (i32, i32),
    radius: i32,
    thickness: i32,
    color: Rgb<u8>,
) {
    for r in (radius - thickness + 1).max(1)..=radius {
        draw_hollow_circle_mut(canvas, center, r, color);
    }
}

/// Blend `color` over a rectangle with opacity `alpha`, clipped to the canvas
pub fn shade_rect(
    canvas: &mut RgbImage,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    color: Rgb<u8>,
    alpha: f32,
) {
    let alpha = alpha.clamp(0.0, 1.0);
    let x_end = x.saturating_add(width).min(canvas.width());
    let y_end = y.saturating_add(height).min(canvas.height());

    for py in y..y_end {
        for px in x..x_end {
            let pixel = canvas.get_pixel_mut(px, py);
            for c in 0..3 {
                let blended = pixel[c] as f32 * (1.0 - alpha) + color[c] as f32 * alpha;
                pixel[c] = blended.round() as u8;
            }
        }
    }
}
