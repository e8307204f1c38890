//! Catalog loading, COCO manifests and viewer configuration files

mod common;

use std::path::Path;

use image::GrayImage;

use common::*;

fn make_dirs(root: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
    let images = root.join("images");
    let masks = root.join("masks");
    std::fs::create_dir_all(&images).unwrap();
    std::fs::create_dir_all(&masks).unwrap();
    (images, masks)
}

#[test]
fn test_pairs_images_and_masks_by_stem() {
    let (_dir, catalog) = create_masked_dataset(&["b_plot", "a_plot", "c_plot"]);

    assert_eq!(catalog.len(), 3);
    assert!(catalog.issues().is_empty());

    let names: Vec<&str> = catalog.entries().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["a_plot", "b_plot", "c_plot"]);

    let entry = entry_named(&catalog, "b_plot");
    assert_eq!(entry.file_name(), Some("b_plot.png"));
    match &entry.source {
        AnnotationSource::Mask(path) => assert!(path.ends_with("masks/b_plot.png")),
        other => panic!("expected a mask source, got {:?}", other),
    }
}

#[test]
fn test_mask_extension_may_differ_from_image() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let (images, masks) = make_dirs(dir.path());

    write_png_rgb(&images, "field.JPG", &gradient_image(10, 10));
    write_png_gray(&masks, "field.png", &GrayImage::new(10, 10));

    let catalog = Catalog::load_masked(&images, &masks)?;
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.entries()[0].name, "field");
    Ok(())
}

#[test]
fn test_unpaired_files_are_reported() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let (images, masks) = make_dirs(dir.path());

    write_png_rgb(&images, "paired.png", &gradient_image(10, 10));
    write_png_gray(&masks, "paired.png", &GrayImage::new(10, 10));
    write_png_rgb(&images, "lonely_image.png", &gradient_image(10, 10));
    write_png_gray(&masks, "lonely_mask.png", &GrayImage::new(10, 10));

    let catalog = Catalog::load_masked(&images, &masks)?;

    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.entries()[0].name, "paired");
    assert_eq!(catalog.issues().len(), 2);
    assert!(catalog.issues().iter().any(|issue| matches!(
        issue,
        LoadIssue::MissingMask { name, .. } if name == "lonely_image"
    )));
    assert!(catalog.issues().iter().any(|issue| matches!(
        issue,
        LoadIssue::MissingImage { name, .. } if name == "lonely_mask"
    )));
    Ok(())
}

#[test]
fn test_duplicate_stems_keep_first_file() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let (images, masks) = make_dirs(dir.path());

    write_png_rgb(&images, "plot.jpeg", &gradient_image(10, 10));
    write_png_rgb(&images, "plot.png", &gradient_image(10, 10));
    write_png_gray(&masks, "plot.png", &GrayImage::new(10, 10));

    let catalog = Catalog::load_masked(&images, &masks)?;

    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.entries()[0].file_name(), Some("plot.jpeg"));
    assert_eq!(catalog.issues().len(), 1);
    let issue = &catalog.issues()[0];
    assert!(matches!(issue, LoadIssue::DuplicateName { name, .. } if name == "plot"));
    assert!(issue.to_string().contains("duplicate name 'plot'"));
    Ok(())
}

#[test]
fn test_non_image_files_are_ignored() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let (images, masks) = make_dirs(dir.path());

    write_png_rgb(&images, "plot.png", &gradient_image(10, 10));
    write_png_gray(&masks, "plot.png", &GrayImage::new(10, 10));
    std::fs::write(images.join("notes.txt"), "not an image")?;
    std::fs::write(masks.join("README"), "not a mask")?;
    std::fs::create_dir(images.join("nested.png"))?;

    let catalog = Catalog::load_masked(&images, &masks)?;

    assert_eq!(catalog.len(), 1);
    assert!(catalog.issues().is_empty());
    Ok(())
}

#[test]
fn test_missing_directory_is_an_error() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let (images, _) = make_dirs(dir.path());
    let absent = dir.path().join("does_not_exist");

    let err = Catalog::load_masked(&images, &absent).unwrap_err();
    assert!(matches!(err, SoilviewError::MissingFile { ref path } if *path == absent));

    assert!(matches!(
        Catalog::load_detections(&absent),
        Err(SoilviewError::MissingFile { .. })
    ));
    Ok(())
}

#[test]
fn test_empty_directories_give_empty_catalog() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let (images, masks) = make_dirs(dir.path());

    let catalog = Catalog::load_masked(&images, &masks)?;
    assert!(catalog.is_empty());
    assert!(catalog.get(0).is_none());
    Ok(())
}

#[test]
fn test_detection_catalog_lists_every_image() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let (images, _) = make_dirs(dir.path());

    for name in ["c.png", "a.jpg", "b.jpeg"] {
        write_png_rgb(&images, name, &gradient_image(8, 8));
    }

    let catalog = Catalog::load_detections(&images)?;

    let files: Vec<_> = catalog.entries().iter().filter_map(|e| e.file_name()).collect();
    assert_eq!(files, vec!["a.jpg", "b.jpeg", "c.png"]);
    assert!(catalog.entries().iter().all(|e| e.source == AnnotationSource::Detections));
    Ok(())
}

const MANIFEST: &str = r#"{
    "images": [
        { "id": 1, "file_name": "a.png", "width": 100, "height": 80 },
        { "id": 2, "file_name": "b.png" }
    ],
    "annotations": [
        { "id": 10, "image_id": 1, "category_id": 1, "bbox": [10.0, 20.0, 30.0, 40.0] },
        { "id": 11, "image_id": 1, "category_id": 1, "bbox": [0.5, 0.5, 5.0, 5.0], "score": 0.4 },
        { "id": 12, "image_id": 9, "category_id": 1, "bbox": [1, 1, 1, 1] },
        { "id": 13, "image_id": 2, "category_id": 7, "bbox": [1, 1, 1, 1] },
        { "id": 14, "image_id": 2, "category_id": 1, "bbox": [1, 1, 1] }
    ],
    "categories": [{ "id": 1, "name": "litter" }]
}"#;

#[test]
fn test_coco_manifest_is_cleaned() -> anyhow::Result<()> {
    let mut dataset = CocoDataset::from_json_str(MANIFEST)?;
    assert_eq!(dataset.annotations.len(), 5);

    let warnings = dataset.validate_and_clean();

    assert_eq!(warnings.len(), 3);
    assert!(warnings[0].contains("unknown image_id 9"));
    assert!(warnings[1].contains("unknown category_id 7"));
    assert!(warnings[2].contains("expected 4 bbox values"));
    assert_eq!(dataset.annotations.len(), 2);
    assert_eq!(dataset.image_file_names(), vec!["a.png", "b.png"]);
    Ok(())
}

#[test]
fn test_coco_boxes_by_file_name() -> anyhow::Result<()> {
    let mut dataset = CocoDataset::from_json_str(MANIFEST)?;
    dataset.validate_and_clean();

    let boxes = dataset.boxes_by_file_name();

    assert!(!boxes.contains_key("b.png"));
    let a = &boxes["a.png"];
    assert_eq!(a.len(), 2);
    assert_eq!((a[0].x1, a[0].y1, a[0].x2, a[0].y2), (10, 20, 40, 60));
    assert_eq!(a[0].confidence, 1.0);
    assert_eq!(a[1].confidence, 0.4);
    assert_eq!(a[1].class_id, 1);
    Ok(())
}

#[test]
fn test_coco_manifest_without_categories() -> anyhow::Result<()> {
    let mut dataset = CocoDataset::from_json_str(
        r#"{ "images": [{ "id": 1, "file_name": "a.png" }],
             "annotations": [{ "id": 1, "image_id": 1, "category_id": 3, "bbox": [0, 0, 2, 2] }] }"#,
    )?;

    assert!(dataset.validate_and_clean().is_empty());
    assert_eq!(dataset.annotations.len(), 1);
    Ok(())
}

#[test]
fn test_category_id_beyond_u32_is_dropped() -> anyhow::Result<()> {
    let manifest = r#"{ "images": [{ "id": 1, "file_name": "a.png" }],
         "annotations": [
             { "id": 1, "image_id": 1, "category_id": 4294967296, "bbox": [0, 0, 2, 2] },
             { "id": 2, "image_id": 1, "category_id": 4294967295, "bbox": [4, 4, 2, 2] }
         ] }"#;

    let unchecked = CocoDataset::from_json_str(manifest)?;
    let boxes = unchecked.boxes_by_file_name();
    assert_eq!(boxes["a.png"].len(), 1);
    assert_eq!(boxes["a.png"][0].class_id, u32::MAX);

    let mut dataset = CocoDataset::from_json_str(manifest)?;
    let warnings = dataset.validate_and_clean();
    assert_eq!(warnings, vec!["annotation 1: category_id 4294967296 does not fit in u32".to_string()]);
    assert_eq!(dataset.annotations.len(), 1);
    assert_eq!(dataset.annotations[0].id, 2);
    Ok(())
}

#[test]
fn test_malformed_manifest_is_an_error() {
    assert!(matches!(
        CocoDataset::from_json_str("{ \"images\": 3 }"),
        Err(SoilviewError::Manifest(_))
    ));
    assert!(matches!(
        CocoDataset::from_file(Path::new("/nonexistent/annotations.json")),
        Err(SoilviewError::MissingFile { .. })
    ));
}

#[test]
fn test_coco_detector_reads_manifest_file() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let manifest = dir.path().join("annotations.json");
    std::fs::write(&manifest, MANIFEST)?;

    let detector = CocoDetector::from_file(&manifest)?;

    assert_eq!(detector.boxes_for("a.png").len(), 2);
    assert!(detector.boxes_for("b.png").is_empty());
    assert!(detector.boxes_for("unknown.png").is_empty());
    Ok(())
}

#[test]
fn test_config_defaults_fill_missing_fields() -> anyhow::Result<()> {
    let config = ViewerConfig::from_json_str(r#"{ "page_size": 12, "contour": { "color": [0, 0, 255], "thickness": 5 } }"#)?;

    assert_eq!(config.page_size, 12);
    assert_eq!(config.contour.color, [0, 0, 255]);
    assert_eq!(config.contour.thickness, 5);

    let defaults = ViewerConfig::default();
    assert_eq!(config.columns, defaults.columns);
    assert_eq!(config.slide, defaults.slide);
    assert_eq!(config.boxes, defaults.boxes);
    assert_eq!(defaults.page_size, 8);
    assert_eq!((defaults.slide.max_width, defaults.slide.max_height), (1000, 500));

    assert_eq!(ViewerConfig::from_json_str("{}")?, defaults);
    Ok(())
}

#[test]
fn test_config_rejects_zero_values() {
    let err = ViewerConfig::from_json_str(r#"{ "columns": 0 }"#).unwrap_err();
    assert!(matches!(err, SoilviewError::Config { ref parameter, .. } if parameter == "columns"));

    let err = ViewerConfig::from_json_str(r#"{ "boxes": { "color": [0, 255, 0], "thickness": 0 } }"#).unwrap_err();
    assert!(matches!(err, SoilviewError::Config { ref parameter, .. } if parameter == "boxes.thickness"));

    assert!(matches!(
        ViewerConfig::from_json_str("not json"),
        Err(SoilviewError::Manifest(_))
    ));
}

#[test]
fn test_config_file_loading() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let path = dir.path().join("soilview.json");

    assert!(matches!(
        ViewerConfig::from_json_file(&path),
        Err(SoilviewError::MissingFile { .. })
    ));

    std::fs::write(&path, r#"{ "cache_capacity": 0 }"#)?;
    let config = ViewerConfig::from_json_file(&path)?;
    assert_eq!(config.cache_capacity, 0);
    Ok(())
}

#[test]
fn test_catalog_from_explicit_entries() {
    let entries = vec![
        CatalogEntry {
            name: "z".to_string(),
            image_path: "/data/z.png".into(),
            source: AnnotationSource::Detections,
        },
        CatalogEntry {
            name: "a".to_string(),
            image_path: "/data/a.png".into(),
            source: AnnotationSource::Mask("/masks/a.png".into()),
        },
    ];

    let catalog = Catalog::from_entries(entries);

    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.get(0).map(|e| e.name.as_str()), Some("z"));
    assert_eq!(catalog.get(1).and_then(|e| e.file_name()), Some("a.png"));
    assert!(catalog.issues().is_empty());
}
