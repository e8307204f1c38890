use image::{GrayImage, Luma};
use imageproc::contours::{BorderType, find_contours};
use imageproc::point::Point;

use crate::models::Contour;

/// Outer boundaries of the foreground regions of a binary mask.
///
/// Holes and anything nested inside a hole are dropped, and every boundary
/// is compressed to the points where its direction changes.
pub fn find_external_contours(mask: &GrayImage) -> Vec<Contour> {
    // find_contours mislabels borders that start on column 0, so no foreground may touch the edge
    let padded = pad_with_background(mask);

    find_contours::<i32>(&padded)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| {
            let points: Vec<Point<i32>> = c.points.iter().map(|p| Point::new(p.x - 1, p.y - 1)).collect();
            Contour::new(compress_chain(&points))
        })
        .collect()
}

/// Copy of `mask` with a one pixel background frame
fn pad_with_background(mask: &GrayImage) -> GrayImage {
    let (width, height) = mask.dimensions();
    let mut padded = GrayImage::from_pixel(width + 2, height + 2, Luma([0]));
    for (x, y, pixel) in mask.enumerate_pixels() {
        padded.put_pixel(x + 1, y + 1, *pixel);
    }
    padded
}

/// Drop every point whose incoming and outgoing steps share a direction.
/// The chain is treated as closed.
pub fn compress_chain(points: &[Point<i32>]) -> Vec<Point<i32>> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let step = |from: Point<i32>, to: Point<i32>| ((to.x - from.x).signum(), (to.y - from.y).signum());

    let compressed: Vec<Point<i32>> = (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            step(prev, points[i]) != step(points[i], next)
        })
        .map(|i| points[i])
        .collect();

    if compressed.is_empty() {
        // only reachable for a chain of identical points
        vec![points[0]]
    } else {
        compressed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_compresses_to_corners() {
        let mut mask = GrayImage::new(10, 10);
        for y in 2..6 {
            for x in 3..8 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }

        let contours = find_external_contours(&mask);
        assert_eq!(contours.len(), 1);

        let mut corners = contours[0].points.clone();
        corners.sort_by_key(|p| (p.y, p.x));
        assert_eq!(
            corners,
            vec![
                Point::new(3, 2),
                Point::new(7, 2),
                Point::new(3, 5),
                Point::new(7, 5)
            ]
        );
    }

    #[test]
    fn single_pixel_region_keeps_its_point() {
        let mut mask = GrayImage::new(5, 5);
        mask.put_pixel(2, 2, Luma([255]));

        let contours = find_external_contours(&mask);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].points, vec![Point::new(2, 2)]);
    }

    #[test]
    fn pixel_in_the_corner_is_found() {
        let mut mask = GrayImage::new(6, 6);
        mask.put_pixel(0, 0, Luma([255]));
        mask.put_pixel(4, 0, Luma([255]));

        let mut contours = find_external_contours(&mask);
        contours.sort_by_key(|c| c.points[0].x);
        assert_eq!(contours.len(), 2);
        assert_eq!(contours[0].points, vec![Point::new(0, 0)]);
        assert_eq!(contours[1].points, vec![Point::new(4, 0)]);
    }

    #[test]
    fn straight_chain_points_are_dropped() {
        let chain = vec![
            Point::new(0, 0),
            Point::new(1, 0),
            Point::new(2, 0),
            Point::new(2, 1),
            Point::new(2, 2),
            Point::new(1, 1),
        ];
        assert_eq!(
            compress_chain(&chain),
            vec![Point::new(0, 0), Point::new(2, 0), Point::new(2, 2)]
        );
    }
}
