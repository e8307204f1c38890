//! COCO annotation manifest
//!
//! Only the parts needed to draw boxes are read: `images`, `annotations`
//! and `categories`. Boxes are `[x, y, width, height]`.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogEntry;
use crate::detector::Detector;
use crate::error::{Result, SoilviewError};
use crate::models::DetectionBox;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CocoDataset {
    pub images: Vec<CocoImage>,
    #[serde(default)]
    pub annotations: Vec<CocoAnnotation>,
    #[serde(default)]
    pub categories: Vec<CocoCategory>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CocoImage {
    pub id: u64,
    pub file_name: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CocoAnnotation {
    pub id: u64,
    pub image_id: u64,
    pub category_id: u64,
    pub bbox: Vec<f32>,
    #[serde(default)]
    pub score: Option<f32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CocoCategory {
    pub id: u64,
    pub name: String,
}

impl CocoDataset {
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(SoilviewError::MissingFile {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Drop annotations pointing at unknown images/categories or with a malformed bbox.
    /// Returns one warning per dropped annotation.
    pub fn validate_and_clean(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();

        let image_ids: HashSet<u64> = self.images.iter().map(|img| img.id).collect();
        let category_ids: HashSet<u64> = self.categories.iter().map(|cat| cat.id).collect();

        self.annotations.retain(|ann| {
            if !image_ids.contains(&ann.image_id) {
                warnings.push(format!(
                    "annotation {}: unknown image_id {}",
                    ann.id, ann.image_id
                ));
                return false;
            }
            // manifests without a categories table are accepted as-is
            if !category_ids.is_empty() && !category_ids.contains(&ann.category_id) {
                warnings.push(format!(
                    "annotation {}: unknown category_id {}",
                    ann.id, ann.category_id
                ));
                return false;
            }
            if u32::try_from(ann.category_id).is_err() {
                warnings.push(format!(
                    "annotation {}: category_id {} does not fit in u32",
                    ann.id, ann.category_id
                ));
                return false;
            }
            if ann.bbox.len() != 4 {
                warnings.push(format!(
                    "annotation {}: expected 4 bbox values, got {}",
                    ann.id,
                    ann.bbox.len()
                ));
                return false;
            }
            true
        });

        warnings
    }

    /// Boxes grouped by image file name
    pub fn boxes_by_file_name(&self) -> HashMap<String, Vec<DetectionBox>> {
        let file_names: HashMap<u64, &str> = self
            .images
            .iter()
            .map(|img| (img.id, img.file_name.as_str()))
            .collect();

        let mut map: HashMap<String, Vec<DetectionBox>> = HashMap::new();
        for ann in &self.annotations {
            let (Some(file_name), [x, y, w, h]) = (file_names.get(&ann.image_id), ann.bbox.as_slice()) else {
                continue;
            };
            let Ok(class_id) = u32::try_from(ann.category_id) else {
                tracing::warn!(annotation = ann.id, category_id = ann.category_id, "category_id does not fit in u32, skipping");
                continue;
            };
            let bbox = DetectionBox::from_xywh(*x, *y, *w, *h).with_score(ann.score.unwrap_or(1.0), class_id);
            map.entry(file_name.to_string()).or_default().push(bbox);
        }
        map
    }

    pub fn image_file_names(&self) -> Vec<String> {
        self.images.iter().map(|img| img.file_name.clone()).collect()
    }
}

/// Serves the boxes recorded in a COCO manifest, looked up by image file name.
/// Images missing from the manifest have no detections.
#[derive(Debug, Clone, Default)]
pub struct CocoDetector {
    boxes: HashMap<String, Vec<DetectionBox>>,
}

impl CocoDetector {
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut dataset = CocoDataset::from_file(path)?;
        for warning in dataset.validate_and_clean() {
            tracing::warn!(manifest = %path.display(), "{}", warning);
        }
        tracing::info!(
            manifest = %path.display(),
            images = dataset.images.len(),
            annotations = dataset.annotations.len(),
            "loaded COCO manifest"
        );
        Ok(Self::from_dataset(&dataset))
    }

    pub fn from_dataset(dataset: &CocoDataset) -> Self {
        Self {
            boxes: dataset.boxes_by_file_name(),
        }
    }

    pub fn boxes_for(&self, file_name: &str) -> &[DetectionBox] {
        self.boxes.get(file_name).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Detector for CocoDetector {
    fn detect(&self, entry: &CatalogEntry, _image: &RgbImage) -> Result<Vec<DetectionBox>> {
        Ok(entry
            .file_name()
            .map(|name| self.boxes_for(name).to_vec())
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "coco-manifest"
    }
}
