use image::{GrayImage, Luma, Rgb, RgbImage};
use std::path::Path;

/// Writes a small image/mask pair set and a COCO manifest under `sample_data/`
fn main() -> anyhow::Result<()> {
    let root = Path::new("sample_data");
    let images_dir = root.join("images");
    let masks_dir = root.join("masks");
    std::fs::create_dir_all(&images_dir)?;
    std::fs::create_dir_all(&masks_dir)?;

    let mut manifest_images = Vec::new();
    let mut manifest_annotations = Vec::new();

    for i in 0..10u32 {
        let (width, height) = (800, 600);

        // soil-like gradient
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([
                (90 + (x * 60 / width)) as u8,
                (60 + (y * 40 / height)) as u8,
                (30 + ((x + y + i * 13) % 20)) as u8,
            ])
        });

        let (cx, cy, r) = (150 + i * 50, 200 + (i % 3) * 100, 40 + i * 5);
        let mask = GrayImage::from_fn(width, height, |x, y| {
            let dx = x as i64 - cx as i64;
            let dy = y as i64 - cy as i64;
            if dx * dx + dy * dy <= (r * r) as i64 { Luma([255]) } else { Luma([0]) }
        });

        let name = format!("plot_{:02}", i);
        img.save(images_dir.join(format!("{}.png", name)))?;
        mask.save(masks_dir.join(format!("{}.png", name)))?;

        manifest_images.push(serde_json::json!({
            "id": i, "file_name": format!("{}.png", name), "width": width, "height": height
        }));
        manifest_annotations.push(serde_json::json!({
            "id": i, "image_id": i, "category_id": 1,
            "bbox": [cx - r, cy - r, 2 * r, 2 * r]
        }));
    }

    let manifest = serde_json::json!({
        "images": manifest_images,
        "annotations": manifest_annotations,
        "categories": [{ "id": 1, "name": "litter" }]
    });
    std::fs::write(root.join("annotations.json"), serde_json::to_string_pretty(&manifest)?)?;

    println!("Created sample data in {}", root.display());
    Ok(())
}
