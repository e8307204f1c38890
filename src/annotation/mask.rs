use image::{GrayImage, Luma, Rgb, RgbImage};

/// Normalize a mask to 0/255: any non-zero pixel becomes foreground
pub fn binarize(mask: &GrayImage) -> GrayImage {
    let mut binary = mask.clone();
    for pixel in binary.pixels_mut() {
        if pixel[0] != 0 {
            *pixel = Luma([255u8]);
        }
    }
    binary
}

/// Keep the image color where the mask is set, black elsewhere.
/// Expects a binarized mask of the same size as `image`.
pub fn apply_mask(image: &RgbImage, mask: &GrayImage) -> RgbImage {
    let mut result = RgbImage::new(image.width(), image.height());

    for (x, y, pixel) in image.enumerate_pixels() {
        if mask.get_pixel(x, y)[0] == 255 {
            result.put_pixel(x, y, *pixel);
        } else {
            result.put_pixel(x, y, Rgb([0, 0, 0]));
        }
    }

    result
}

/// Fraction of foreground pixels in a binarized mask
pub fn coverage(mask: &GrayImage) -> f32 {
    let total = mask.width() as u64 * mask.height() as u64;
    if total == 0 {
        return 0.0;
    }
    let set = mask.pixels().filter(|p| p[0] == 255).count() as u64;
    set as f32 / total as f32
}
