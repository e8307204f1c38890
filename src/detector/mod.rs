#[cfg(feature = "model")]
pub mod rten_model;
pub mod yolo;

use image::RgbImage;

use crate::catalog::CatalogEntry;
use crate::error::Result;
use crate::models::DetectionBox;

/// Black-box object detector. Any model or annotation source producing boxes
/// in the image's pixel coordinates can stand behind this trait.
pub trait Detector: Send + Sync {
    fn detect(&self, entry: &CatalogEntry, image: &RgbImage) -> Result<Vec<DetectionBox>>;

    /// Human-readable name, used in logs
    fn name(&self) -> &str;
}

impl<F> Detector for F
where
    F: Fn(&RgbImage) -> Vec<DetectionBox> + Send + Sync,
{
    fn detect(&self, _entry: &CatalogEntry, image: &RgbImage) -> Result<Vec<DetectionBox>> {
        Ok(self(image))
    }

    fn name(&self) -> &str {
        "closure"
    }
}
