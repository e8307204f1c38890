pub mod coco;

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use image::{GrayImage, ImageReader, RgbImage};

use crate::error::{Result, SoilviewError};

/// Extensions picked up by the loader, compared case-insensitively
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Where the annotation for an entry comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationSource {
    /// Precomputed binary mask file
    Mask(PathBuf),
    /// Boxes computed on demand by a detector
    Detections,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Image filename without extension, unique within a catalog
    pub name: String,
    pub image_path: PathBuf,
    pub source: AnnotationSource,
}

impl CatalogEntry {
    pub fn file_name(&self) -> Option<&str> {
        self.image_path.file_name().and_then(|n| n.to_str())
    }
}

/// A file skipped while building a catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadIssue {
    MissingMask { name: String, image_path: PathBuf },
    MissingImage { name: String, mask_path: PathBuf },
    DuplicateName { name: String, path: PathBuf },
}

impl fmt::Display for LoadIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadIssue::MissingMask { name, image_path } => {
                write!(f, "no mask for '{}' ({})", name, image_path.display())
            }
            LoadIssue::MissingImage { name, mask_path } => {
                write!(f, "no image for mask '{}' ({})", name, mask_path.display())
            }
            LoadIssue::DuplicateName { name, path } => {
                write!(f, "duplicate name '{}', ignoring {}", name, path.display())
            }
        }
    }
}

/// Ordered collection of entries presented by the viewer
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    issues: Vec<LoadIssue>,
}

impl Catalog {
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        Self {
            entries,
            issues: Vec::new(),
        }
    }

    /// Pair images with masks by filename stem. Unpaired files are reported, not loaded.
    pub fn load_masked(images_dir: &Path, masks_dir: &Path) -> Result<Self> {
        let mut issues = Vec::new();
        let images = index_by_stem(list_image_files(images_dir)?, &mut issues);
        let masks = index_by_stem(list_image_files(masks_dir)?, &mut issues);
        let mask_lookup: HashMap<&str, &PathBuf> =
            masks.iter().map(|(name, path)| (name.as_str(), path)).collect();

        let mut paired = HashSet::new();
        let mut entries = Vec::with_capacity(images.len());
        for (name, image_path) in &images {
            match mask_lookup.get(name.as_str()) {
                Some(mask_path) => {
                    paired.insert(name.clone());
                    entries.push(CatalogEntry {
                        name: name.clone(),
                        image_path: image_path.clone(),
                        source: AnnotationSource::Mask((*mask_path).clone()),
                    });
                }
                None => issues.push(LoadIssue::MissingMask {
                    name: name.clone(),
                    image_path: image_path.clone(),
                }),
            }
        }
        for (name, mask_path) in masks {
            if !paired.contains(&name) {
                issues.push(LoadIssue::MissingImage { name, mask_path });
            }
        }

        let catalog = Self { entries, issues };
        catalog.log_summary(images_dir);
        Ok(catalog)
    }

    /// Every image in the directory, boxes come from a detector at processing time
    pub fn load_detections(images_dir: &Path) -> Result<Self> {
        let mut issues = Vec::new();
        let entries = index_by_stem(list_image_files(images_dir)?, &mut issues)
            .into_iter()
            .map(|(name, image_path)| CatalogEntry {
                name,
                image_path,
                source: AnnotationSource::Detections,
            })
            .collect();

        let catalog = Self { entries, issues };
        catalog.log_summary(images_dir);
        Ok(catalog)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&CatalogEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn issues(&self) -> &[LoadIssue] {
        &self.issues
    }

    fn log_summary(&self, dir: &Path) {
        for issue in &self.issues {
            tracing::warn!("{}", issue);
        }
        tracing::info!(
            dir = %dir.display(),
            entries = self.entries.len(),
            skipped = self.issues.len(),
            "catalog loaded"
        );
    }
}

/// Image files in `dir`, sorted by file name
pub fn list_image_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(SoilviewError::MissingFile {
            path: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    for dir_entry in std::fs::read_dir(dir)? {
        let path = dir_entry?.path();
        if path.is_file() && has_image_extension(&path) {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.iter().any(|known| e.eq_ignore_ascii_case(known)))
        .unwrap_or(false)
}

/// Keeps the input order. First file wins for a repeated stem, e.g. `a.jpg` over `a.png`.
fn index_by_stem(files: Vec<PathBuf>, issues: &mut Vec<LoadIssue>) -> Vec<(String, PathBuf)> {
    let mut seen = HashSet::new();
    let mut by_stem = Vec::with_capacity(files.len());
    for path in files {
        let Some(name) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
            continue;
        };
        if seen.insert(name.clone()) {
            by_stem.push((name, path));
        } else {
            issues.push(LoadIssue::DuplicateName { name, path });
        }
    }
    by_stem
}

pub fn load_image(path: &Path) -> Result<RgbImage> {
    let image = decode(path)?.to_rgb8();
    if image.width() == 0 || image.height() == 0 {
        return Err(SoilviewError::invalid_image(format!("{} is empty", path.display())));
    }
    Ok(image)
}

pub fn load_mask(path: &Path) -> Result<GrayImage> {
    Ok(decode(path)?.to_luma8())
}

fn decode(path: &Path) -> Result<image::DynamicImage> {
    if !path.is_file() {
        return Err(SoilviewError::MissingFile {
            path: path.to_path_buf(),
        });
    }
    ImageReader::open(path)?
        .decode()
        .map_err(|source| SoilviewError::Decode {
            path: path.to_path_buf(),
            source,
        })
}
