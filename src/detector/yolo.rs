//! Pre- and post-processing for single-stage YOLO style detectors.
//!
//! The network sees a square, letterboxed RGB tensor in CHW order with values
//! in `0..=1`. Its output is one row of features per anchor:
//! `cx, cy, w, h` in input pixels followed by class scores. Two layouts are
//! accepted and told apart by shape:
//!
//! - `[1, 4 + classes, anchors]`: feature-major, no objectness (YOLOv8 and later)
//! - `[1, anchors, 5 + classes]`: anchor-major, objectness at index 4 (YOLOv5)

use image::RgbImage;
use image::imageops::{self, FilterType};

use crate::config::ModelSettings;
use crate::error::{Result, SoilviewError};
use crate::models::DetectionBox;
use crate::resize::fit_dimensions;

/// Padding value of the letterbox border
pub const LETTERBOX_FILL: f32 = 114.0 / 255.0;

/// How an image was placed inside the square network input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub input_size: u32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub pad_x: u32,
    pub pad_y: u32,
    /// Source image size
    pub width: u32,
    pub height: u32,
}

impl Letterbox {
    /// Map a point from network input pixels back to source image pixels
    pub fn to_image(&self, x: f32, y: f32) -> (f32, f32) {
        (
            (x - self.pad_x as f32) / self.scale_x,
            (y - self.pad_y as f32) / self.scale_y,
        )
    }
}

/// Resize `image` into an `input_size` square keeping its aspect ratio, center it on a gray
/// canvas and lay it out as planar `f32` RGB.
pub fn letterbox(image: &RgbImage, input_size: u32) -> Result<(Vec<f32>, Letterbox)> {
    let (width, height) = image.dimensions();
    let (new_width, new_height) = fit_dimensions(width, height, input_size, input_size)?;
    let resized = imageops::resize(image, new_width, new_height, FilterType::Triangle);

    let pad_x = (input_size - new_width) / 2;
    let pad_y = (input_size - new_height) / 2;
    let side = input_size as usize;
    let plane = side * side;
    let mut data = vec![LETTERBOX_FILL; 3 * plane];

    for (x, y, pixel) in resized.enumerate_pixels() {
        let offset = (y + pad_y) as usize * side + (x + pad_x) as usize;
        for (channel, value) in pixel.0.iter().enumerate() {
            data[channel * plane + offset] = *value as f32 / 255.0;
        }
    }

    Ok((
        data,
        Letterbox {
            input_size,
            scale_x: new_width as f32 / width as f32,
            scale_y: new_height as f32 / height as f32,
            pad_x,
            pad_y,
            width,
            height,
        },
    ))
}

/// Turn a raw output tensor into boxes in source image pixels, after confidence filtering
/// and non-maximum suppression.
pub fn decode_predictions(
    data: &[f32],
    shape: &[usize],
    letterbox: &Letterbox,
    settings: &ModelSettings,
) -> Result<Vec<DetectionBox>> {
    let [batch, rows, columns] = shape else {
        return Err(SoilviewError::Model(format!("expected a 3-d output, got shape {:?}", shape)));
    };
    if *batch != 1 {
        return Err(SoilviewError::Model(format!("expected a batch of 1, got {}", batch)));
    }
    if data.len() != rows * columns {
        return Err(SoilviewError::Model(format!(
            "output holds {} values but shape {:?} needs {}",
            data.len(),
            shape,
            rows * columns
        )));
    }

    let feature_major = rows < columns;
    let (anchors, features) = if feature_major {
        (*columns, *rows)
    } else {
        (*rows, *columns)
    };
    let first_class = if feature_major { 4 } else { 5 };
    if features <= first_class {
        return Err(SoilviewError::Model(format!(
            "output shape {:?} has no class scores",
            shape
        )));
    }

    let value = |anchor: usize, feature: usize| {
        if feature_major {
            data[feature * anchors + anchor]
        } else {
            data[anchor * features + feature]
        }
    };

    let mut candidates = Vec::new();
    for anchor in 0..anchors {
        let (class_id, class_score) = (first_class..features)
            .map(|feature| (feature - first_class, value(anchor, feature)))
            .fold((0, f32::NEG_INFINITY), |best, (class, score)| {
                if score > best.1 { (class, score) } else { best }
            });
        let score = if feature_major {
            class_score
        } else {
            class_score * value(anchor, 4)
        };
        if !score.is_finite() || score < settings.confidence {
            continue;
        }

        let (cx, cy, w, h) = (value(anchor, 0), value(anchor, 1), value(anchor, 2), value(anchor, 3));
        if ![cx, cy, w, h].iter().all(|v| v.is_finite()) || w <= 0.0 || h <= 0.0 {
            continue;
        }

        let (x1, y1) = letterbox.to_image(cx - w / 2.0, cy - h / 2.0);
        let (x2, y2) = letterbox.to_image(cx + w / 2.0, cy + h / 2.0);
        let detection = DetectionBox::new(x1.round() as i32, y1.round() as i32, x2.round() as i32, y2.round() as i32)
            .with_score(score, class_id as u32);

        if let Some(clamped) = detection.clamped(letterbox.width, letterbox.height) {
            candidates.push(clamped);
        }
    }

    Ok(non_max_suppression(candidates, settings.iou, settings.max_detections))
}

/// Greedy per-class suppression. The result is ordered by descending confidence and holds at
/// most `max_detections` boxes.
pub fn non_max_suppression(mut candidates: Vec<DetectionBox>, iou_threshold: f32, max_detections: usize) -> Vec<DetectionBox> {
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<DetectionBox> = Vec::new();
    for candidate in candidates {
        if kept.len() >= max_detections {
            break;
        }
        let overlaps = kept
            .iter()
            .any(|k| k.class_id == candidate.class_id && iou(k, &candidate) > iou_threshold);
        if !overlaps {
            kept.push(candidate);
        }
    }
    kept
}

/// Intersection over union of two inclusive pixel boxes
pub fn iou(a: &DetectionBox, b: &DetectionBox) -> f32 {
    let area = |d: &DetectionBox| (d.x2 - d.x1 + 1) as f32 * (d.y2 - d.y1 + 1) as f32;

    let inter_w = (a.x2.min(b.x2) - a.x1.max(b.x1) + 1).max(0) as f32;
    let inter_h = (a.y2.min(b.y2) - a.y1.max(b.y1) + 1).max(0) as f32;
    let intersection = inter_w * inter_h;
    let union = area(a) + area(b) - intersection;

    if union > 0.0 { intersection / union } else { 0.0 }
}
