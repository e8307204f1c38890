use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::point::Point;
use imageproc::rect::Rect as ProcRect;

use crate::config::StrokeStyle;
use crate::models::DetectionBox;

/// Stroke a closed polyline. A single point is drawn as a dot.
pub fn draw_closed_polyline(image: &mut RgbImage, points: &[Point<i32>], style: &StrokeStyle) {
    let color = style.rgb();
    match points {
        [] => {}
        [p] => draw_segment(image, *p, *p, style.thickness, color),
        _ => {
            for (i, &start) in points.iter().enumerate() {
                let end = points[(i + 1) % points.len()];
                draw_segment(image, start, end, style.thickness, color);
            }
        }
    }
}

/// Unfilled rectangle, the stroke is centered on the box edges.
/// The box must already be clamped to the image.
pub fn draw_box_outline(image: &mut RgbImage, bbox: &DetectionBox, style: &StrokeStyle) {
    let color = style.rgb();

    if style.thickness <= 1 {
        let rect = ProcRect::at(bbox.x1, bbox.y1)
            .of_size((bbox.x2 - bbox.x1 + 1) as u32, (bbox.y2 - bbox.y1 + 1) as u32);
        draw_hollow_rect_mut(image, rect, color);
        return;
    }

    let corners = [
        Point::new(bbox.x1, bbox.y1),
        Point::new(bbox.x2, bbox.y1),
        Point::new(bbox.x2, bbox.y2),
        Point::new(bbox.x1, bbox.y2),
    ];
    for i in 0..4 {
        draw_segment(image, corners[i], corners[(i + 1) % 4], style.thickness, color);
    }
}

/// Pixels outside the image are skipped
fn draw_segment(image: &mut RgbImage, start: Point<i32>, end: Point<i32>, thickness: u32, color: Rgb<u8>) {
    if thickness <= 1 {
        if start == end {
            if start.x >= 0 && start.y >= 0 && (start.x as u32) < image.width() && (start.y as u32) < image.height() {
                image.put_pixel(start.x as u32, start.y as u32, color);
            }
        } else {
            draw_line_segment_mut(
                image,
                (start.x as f32, start.y as f32),
                (end.x as f32, end.y as f32),
                color,
            );
        }
        return;
    }

    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return;
    }

    let radius = thickness as f32 / 2.0;
    let reach = radius.ceil() as i32;

    let min_x = (start.x.min(end.x) - reach).max(0);
    let min_y = (start.y.min(end.y) - reach).max(0);
    let max_x = (start.x.max(end.x) + reach).min(width as i32 - 1);
    let max_y = (start.y.max(end.y) + reach).min(height as i32 - 1);

    let (ax, ay) = (start.x as f32, start.y as f32);
    let (dx, dy) = ((end.x - start.x) as f32, (end.y - start.y) as f32);
    let length_sq = dx * dx + dy * dy;
    let radius_sq = radius * radius;

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let (px, py) = (x as f32 - ax, y as f32 - ay);
            let t = if length_sq == 0.0 {
                0.0
            } else {
                ((px * dx + py * dy) / length_sq).clamp(0.0, 1.0)
            };
            let (ex, ey) = (px - t * dx, py - t * dy);
            if ex * ex + ey * ey <= radius_sq {
                image.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}
