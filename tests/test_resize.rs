//! Display resizing: aspect ratio, bounds and idempotence

mod common;

use image::RgbImage;
use soilview::{fit_dimensions, fit_within};

use common::*;

#[test]
fn test_fit_stays_within_bounds_and_keeps_aspect() -> anyhow::Result<()> {
    let sizes = [(4000, 3000), (3000, 4000), (1920, 1080), (150, 150), (1, 1000), (1000, 1), (7, 3)];
    let bounds = [(1000, 500), (150, 150), (600, 400)];

    for &(width, height) in &sizes {
        for &(max_width, max_height) in &bounds {
            let (w, h) = fit_dimensions(width, height, max_width, max_height)?;
            assert!(w >= 1 && h >= 1);
            assert!(w <= max_width && h <= max_height, "{}x{} into {}x{} gave {}x{}", width, height, max_width, max_height, w, h);

            // at least one side reaches its bound, give or take float rounding
            assert!(w + 1 >= max_width || h + 1 >= max_height || w == 1 || h == 1);

            // flooring costs at most one pixel per side
            let scale = (max_width as f64 / width as f64).min(max_height as f64 / height as f64);
            assert!((w as f64 - width as f64 * scale).abs() <= 1.0);
            assert!((h as f64 - height as f64 * scale).abs() <= 1.0);
        }
    }
    Ok(())
}

#[test]
fn test_known_fits() -> anyhow::Result<()> {
    assert_eq!(fit_dimensions(4000, 3000, 1000, 500)?, (666, 500));
    assert_eq!(fit_dimensions(2000, 500, 1000, 500)?, (1000, 250));
    assert_eq!(fit_dimensions(300, 300, 150, 150)?, (150, 150));
    Ok(())
}

#[test]
fn test_small_images_are_upscaled() -> anyhow::Result<()> {
    assert_eq!(fit_dimensions(50, 25, 1000, 500)?, (1000, 500));

    let image = gradient_image(30, 20);
    let fitted = fit_within(&image, 150, 150)?;
    assert_eq!(fitted.dimensions(), (150, 100));
    Ok(())
}

#[test]
fn test_fitted_image_is_unchanged_when_refit() -> anyhow::Result<()> {
    let image = gradient_image(640, 480);

    let once = fit_within(&image, 200, 200)?;
    assert_eq!(once.dimensions(), (200, 150));

    let twice = fit_within(&once, 200, 200)?;
    assert_eq!(twice, once);

    let exact = fit_within(&image, 640, 480)?;
    assert_eq!(exact, image);
    Ok(())
}

#[test]
fn test_zero_sizes_are_rejected() {
    assert!(matches!(
        fit_dimensions(0, 10, 100, 100),
        Err(SoilviewError::InvalidImage { .. })
    ));
    assert!(matches!(
        fit_dimensions(10, 10, 0, 100),
        Err(SoilviewError::InvalidImage { .. })
    ));
    assert!(matches!(
        fit_within(&RgbImage::new(0, 0), 100, 100),
        Err(SoilviewError::InvalidImage { .. })
    ));
}
