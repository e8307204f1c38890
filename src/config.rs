//! Tunable parameters for the viewers and the annotator.
//!
//! A configuration can be loaded from a JSON file; any field left out of the
//! file keeps its default value:
//!
//! ```no_run
//! use soilview::ViewerConfig;
//! use std::path::Path;
//!
//! let config = ViewerConfig::from_json_file(Path::new("soilview.json"))?;
//! # Ok::<(), soilview::SoilviewError>(())
//! ```

use std::path::Path;

use image::Rgb;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SoilviewError};

/// Maximum display size, the image is fit inside it preserving aspect ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitSize {
    pub max_width: u32,
    pub max_height: u32,
}

impl FitSize {
    pub const fn new(max_width: u32, max_height: u32) -> Self {
        Self {
            max_width,
            max_height,
        }
    }
}

/// Color and stroke thickness for an annotation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrokeStyle {
    /// RGB
    pub color: [u8; 3],
    pub thickness: u32,
}

impl StrokeStyle {
    pub fn rgb(&self) -> Rgb<u8> {
        Rgb(self.color)
    }
}

/// Pure red, 20 px: the source images are large, thinner strokes vanish when downscaled
pub const DEFAULT_CONTOUR_STYLE: StrokeStyle = StrokeStyle {
    color: [255, 0, 0],
    thickness: 20,
};

/// Pure green, 30 px
pub const DEFAULT_BOX_STYLE: StrokeStyle = StrokeStyle {
    color: [0, 255, 0],
    thickness: 30,
};

/// Inference parameters for model-backed detection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Square network input side, images are letterboxed into it
    pub input_size: u32,
    /// Minimum class score for a box to be kept
    pub confidence: f32,
    /// Overlap above which the weaker of two same-class boxes is suppressed
    pub iou: f32,
    pub max_detections: usize,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            input_size: 640,
            confidence: 0.25,
            iou: 0.45,
            max_detections: 300,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Thumbnails per grid page
    pub page_size: usize,

    /// Grid columns
    pub columns: usize,

    pub thumbnail: FitSize,

    /// Pane size for the mask tool slides
    pub slide: FitSize,

    /// Pane size for the detection tool
    pub detection_slide: FitSize,

    pub contour: StrokeStyle,

    pub boxes: StrokeStyle,

    /// Processed entries kept in memory, 0 disables the cache
    pub cache_capacity: usize,

    pub model: ModelSettings,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            page_size: 8,
            columns: 4,
            thumbnail: FitSize::new(150, 150),
            slide: FitSize::new(1000, 500),
            detection_slide: FitSize::new(600, 400),
            contour: DEFAULT_CONTOUR_STYLE,
            boxes: DEFAULT_BOX_STYLE,
            cache_capacity: 4,
            model: ModelSettings::default(),
        }
    }
}

impl ViewerConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SoilviewError::MissingFile {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: ViewerConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let checks: [(&str, u64); 12] = [
            ("page_size", self.page_size as u64),
            ("columns", self.columns as u64),
            ("thumbnail.max_width", self.thumbnail.max_width as u64),
            ("thumbnail.max_height", self.thumbnail.max_height as u64),
            ("slide.max_width", self.slide.max_width as u64),
            ("slide.max_height", self.slide.max_height as u64),
            ("detection_slide.max_width", self.detection_slide.max_width as u64),
            ("detection_slide.max_height", self.detection_slide.max_height as u64),
            ("contour.thickness", self.contour.thickness as u64),
            ("boxes.thickness", self.boxes.thickness as u64),
            ("model.input_size", self.model.input_size as u64),
            ("model.max_detections", self.model.max_detections as u64),
        ];

        for (parameter, value) in checks {
            if value == 0 {
                return Err(SoilviewError::Config {
                    parameter: parameter.to_string(),
                    value: value.to_string(),
                });
            }
        }

        for (parameter, value) in [("model.confidence", self.model.confidence), ("model.iou", self.model.iou)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SoilviewError::Config {
                    parameter: parameter.to_string(),
                    value: value.to_string(),
                });
            }
        }

        Ok(())
    }
}
