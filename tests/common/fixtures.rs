use std::path::{Path, PathBuf};

use image::{GrayImage, Luma, Rgb, RgbImage};
use soilview::{Catalog, CatalogEntry};

pub const RED: Rgb<u8> = Rgb([255, 0, 0]);
pub const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// Every pixel distinct enough to catch misplaced copies; never pure red or green
pub fn gradient_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 200) as u8 + 20, (y % 200) as u8 + 20, 128])
    })
}

/// Mask with `value` inside `[x0, x1) x [y0, y1)`, 0 elsewhere
pub fn rect_mask(width: u32, height: u32, (x0, y0, x1, y1): (u32, u32, u32, u32), value: u8) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        if x >= x0 && x < x1 && y >= y0 && y < y1 {
            Luma([value])
        } else {
            Luma([0])
        }
    })
}

pub fn write_png_rgb(dir: &Path, file_name: &str, image: &RgbImage) -> PathBuf {
    let path = dir.join(file_name);
    image
        .save_with_format(&path, image::ImageFormat::Png)
        .expect("Failed to save test image");
    path
}

pub fn write_png_gray(dir: &Path, file_name: &str, image: &GrayImage) -> PathBuf {
    let path = dir.join(file_name);
    image
        .save_with_format(&path, image::ImageFormat::Png)
        .expect("Failed to save test mask");
    path
}

/// `images/` and `masks/` directories with one 60x40 pair per name.
/// Returns the temp dir (keep alive) and the loaded catalog.
pub fn create_masked_dataset(names: &[&str]) -> (tempfile::TempDir, Catalog) {
    let dir = tempfile::TempDir::new().expect("Failed to create temp directory");
    let images = dir.path().join("images");
    let masks = dir.path().join("masks");
    std::fs::create_dir_all(&images).unwrap();
    std::fs::create_dir_all(&masks).unwrap();

    for name in names {
        write_png_rgb(&images, &format!("{}.png", name), &gradient_image(60, 40));
        write_png_gray(&masks, &format!("{}.png", name), &rect_mask(60, 40, (10, 10, 30, 25), 255));
    }

    let catalog = Catalog::load_masked(&images, &masks).expect("Failed to load catalog");
    (dir, catalog)
}

pub fn entry_named<'a>(catalog: &'a Catalog, name: &str) -> &'a CatalogEntry {
    catalog
        .entries()
        .iter()
        .find(|e| e.name == name)
        .expect("entry should exist")
}
