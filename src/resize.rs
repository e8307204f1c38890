use image::RgbImage;
use image::imageops::{self, FilterType};

use crate::error::{Result, SoilviewError};

/// Size of a `width`x`height` image scaled to fit inside `max_width`x`max_height`.
///
/// `scale = min(max_width / width, max_height / height)`, each side is floored
/// and kept within `1..=max`. Upscaling is allowed.
pub fn fit_dimensions(width: u32, height: u32, max_width: u32, max_height: u32) -> Result<(u32, u32)> {
    if width == 0 || height == 0 {
        return Err(SoilviewError::invalid_image(format!(
            "cannot resize a {}x{} image",
            width, height
        )));
    }
    if max_width == 0 || max_height == 0 {
        return Err(SoilviewError::invalid_image(format!(
            "cannot fit into {}x{}",
            max_width, max_height
        )));
    }

    let scale = (max_width as f64 / width as f64).min(max_height as f64 / height as f64);
    let new_width = ((width as f64 * scale).floor() as u32).clamp(1, max_width);
    let new_height = ((height as f64 * scale).floor() as u32).clamp(1, max_height);

    Ok((new_width, new_height))
}

/// Resize for display, preserving aspect ratio (bilinear).
/// An image that already has the fitted size comes back unchanged.
pub fn fit_within(image: &RgbImage, max_width: u32, max_height: u32) -> Result<RgbImage> {
    let (width, height) = image.dimensions();
    let (new_width, new_height) = fit_dimensions(width, height, max_width, max_height)?;

    if (new_width, new_height) == (width, height) {
        return Ok(image.clone());
    }

    tracing::trace!(width, height, new_width, new_height, "resizing");
    Ok(imageops::resize(image, new_width, new_height, FilterType::Triangle))
}
