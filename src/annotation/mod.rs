pub mod contours;
pub mod draw;
pub mod mask;

use image::{GrayImage, RgbImage};

use crate::config::{DEFAULT_BOX_STYLE, DEFAULT_CONTOUR_STYLE, StrokeStyle, ViewerConfig};
use crate::error::{Result, SoilviewError};
use crate::models::{Contour, DetectionBox};

/// Output of the mask-driven path
#[derive(Debug, Clone)]
pub struct MaskAnnotation {
    /// Input image with every contour stroked
    pub outlined: RgbImage,
    /// Input pixels under the mask, black elsewhere
    pub masked_only: RgbImage,
    pub contours: Vec<Contour>,
}

/// Turns an image plus a mask or detection boxes into annotated images.
/// Inputs are never modified.
#[derive(Debug, Clone)]
pub struct Annotator {
    pub contour_style: StrokeStyle,
    pub box_style: StrokeStyle,
}

impl Annotator {
    pub fn new() -> Self {
        Self {
            contour_style: DEFAULT_CONTOUR_STYLE,
            box_style: DEFAULT_BOX_STYLE,
        }
    }

    pub fn from_config(config: &ViewerConfig) -> Self {
        Self {
            contour_style: config.contour,
            box_style: config.boxes,
        }
    }

    pub fn with_contour_style(mut self, style: StrokeStyle) -> Self {
        self.contour_style = style;
        self
    }

    pub fn with_box_style(mut self, style: StrokeStyle) -> Self {
        self.box_style = style;
        self
    }

    pub fn annotate_with_mask(&self, image: &RgbImage, mask: &GrayImage) -> Result<MaskAnnotation> {
        ensure_not_empty(image)?;
        if mask.dimensions() != image.dimensions() {
            return Err(SoilviewError::DimensionMismatch {
                what: "mask",
                image_width: image.width(),
                image_height: image.height(),
                width: mask.width(),
                height: mask.height(),
            });
        }

        let binary = mask::binarize(mask);
        let masked_only = mask::apply_mask(image, &binary);
        let contours = contours::find_external_contours(&binary);

        tracing::debug!(
            contours = contours.len(),
            coverage = mask::coverage(&binary),
            "mask annotated"
        );

        let mut outlined = image.clone();
        for contour in &contours {
            draw::draw_closed_polyline(&mut outlined, &contour.points, &self.contour_style);
        }

        Ok(MaskAnnotation {
            outlined,
            masked_only,
            contours,
        })
    }

    /// Boxes are clamped to the image; boxes entirely outside are skipped
    pub fn annotate_with_detections(&self, image: &RgbImage, boxes: &[DetectionBox]) -> Result<RgbImage> {
        ensure_not_empty(image)?;
        let (width, height) = image.dimensions();

        let mut annotated = image.clone();
        for bbox in boxes {
            match bbox.clamped(width, height) {
                Some(clamped) => draw::draw_box_outline(&mut annotated, &clamped, &self.box_style),
                None => tracing::debug!(?bbox, width, height, "skipping box outside the image"),
            }
        }

        Ok(annotated)
    }
}

impl Default for Annotator {
    fn default() -> Self {
        Self::new()
    }
}

fn ensure_not_empty(image: &RgbImage) -> Result<()> {
    if image.width() == 0 || image.height() == 0 {
        return Err(SoilviewError::invalid_image(format!(
            "image is {}x{}",
            image.width(),
            image.height()
        )));
    }
    Ok(())
}
