use imageproc::point::Point;

use crate::error::{Result, SoilviewError};

/// Axis-aligned rectangle, `width`/`height` in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    /// Exclusive right edge
    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }
}

/// Outer boundary of one connected foreground region of a mask
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contour {
    pub points: Vec<Point<i32>>,
}

impl Contour {
    pub fn new(points: Vec<Point<i32>>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Smallest rectangle containing every boundary point, `None` for an empty contour
    pub fn bounding_rect(&self) -> Option<Rect> {
        let first = self.points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);

        for p in &self.points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        Some(Rect {
            x: min_x,
            y: min_y,
            width: (max_x - min_x + 1) as u32,
            height: (max_y - min_y + 1) as u32,
        })
    }
}

/// A detector output. Only the geometry is rendered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
    pub confidence: f32,
    pub class_id: u32,
}

impl DetectionBox {
    /// Build a box from two corners; swapped corners are normalized so x1 <= x2, y1 <= y2
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
            confidence: 1.0,
            class_id: 0,
        }
    }

    pub fn with_score(mut self, confidence: f32, class_id: u32) -> Self {
        self.confidence = confidence;
        self.class_id = class_id;
        self
    }

    /// Convert a COCO `[x, y, width, height]` box
    pub fn from_xywh(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(
            x.floor() as i32,
            y.floor() as i32,
            (x + width).floor() as i32,
            (y + height).floor() as i32,
        )
    }

    /// Intersect with a `width`x`height` image. `None` when nothing of the box is inside.
    pub fn clamped(&self, width: u32, height: u32) -> Option<DetectionBox> {
        if width == 0 || height == 0 {
            return None;
        }
        let max_x = width as i32 - 1;
        let max_y = height as i32 - 1;

        if self.x2 < 0 || self.y2 < 0 || self.x1 > max_x || self.y1 > max_y {
            return None;
        }

        Some(DetectionBox {
            x1: self.x1.max(0),
            y1: self.y1.max(0),
            x2: self.x2.min(max_x),
            y2: self.y2.min(max_y),
            ..*self
        })
    }

    /// Strict check used when a caller wants rejection instead of clamping
    pub fn check_within(&self, width: u32, height: u32) -> Result<()> {
        match self.clamped(width, height) {
            Some(clamped) if clamped == *self => Ok(()),
            _ => Err(SoilviewError::OutOfBounds {
                what: format!(
                    "box ({}, {})-({}, {})",
                    self.x1, self.y1, self.x2, self.y2
                ),
                image_width: width,
                image_height: height,
            }),
        }
    }
}
