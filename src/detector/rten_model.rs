use std::path::Path;
use std::sync::Mutex;

use image::RgbImage;
use rten::Model;
use rten_tensor::NdTensor;
use rten_tensor::prelude::*;

use super::Detector;
use super::yolo::{decode_predictions, letterbox};
use crate::catalog::CatalogEntry;
use crate::config::ModelSettings;
use crate::error::{Result, SoilviewError};
use crate::models::DetectionBox;

/// Detector running an exported YOLO network (`.rten` format) on the CPU
pub struct YoloDetector {
    model: Mutex<Model>,
    settings: ModelSettings,
}

impl YoloDetector {
    pub fn from_file(path: &Path, settings: ModelSettings) -> Result<Self> {
        if !path.exists() {
            return Err(SoilviewError::MissingFile {
                path: path.to_path_buf(),
            });
        }

        let model = Model::load_file(path)
            .map_err(|e| SoilviewError::Model(format!("{}: {}", path.display(), e)))?;
        tracing::info!(model = %path.display(), input_size = settings.input_size, "Loaded detection model");

        Ok(Self {
            model: Mutex::new(model),
            settings,
        })
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }
}

impl Detector for YoloDetector {
    fn detect(&self, entry: &CatalogEntry, image: &RgbImage) -> Result<Vec<DetectionBox>> {
        let side = self.settings.input_size as usize;
        let (data, placement) = letterbox(image, self.settings.input_size)?;
        let input = NdTensor::from_data([1, 3, side, side], data);

        let output = {
            let model = self.model.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            model
                .run_one(input.view().into(), None)
                .map_err(|e| SoilviewError::Model(e.to_string()))?
        };
        let output: NdTensor<f32, 3> = output
            .try_into()
            .map_err(|e| SoilviewError::Model(format!("unexpected output tensor: {:?}", e)))?;

        let boxes = decode_predictions(&output.to_vec(), &output.shape(), &placement, &self.settings)?;
        tracing::debug!(entry = %entry.name, boxes = boxes.len(), "Model detections");
        Ok(boxes)
    }

    fn name(&self) -> &str {
        "yolo"
    }
}
