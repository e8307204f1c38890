use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SoilviewError {
    /// Empty, zero-sized or otherwise unusable image
    #[error("Invalid image: {reason}")]
    InvalidImage { reason: String },

    #[error("Dimension mismatch: image is {image_width}x{image_height}, {what} is {width}x{height}")]
    DimensionMismatch {
        what: &'static str,
        image_width: u32,
        image_height: u32,
        width: u32,
        height: u32,
    },

    #[error("Geometry out of bounds: {what} does not fit in {image_width}x{image_height}")]
    OutOfBounds {
        what: String,
        image_width: u32,
        image_height: u32,
    },

    #[error("File not found: {}", path.display())]
    MissingFile { path: PathBuf },

    #[error("Failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid annotation manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("Invalid configuration: {parameter} = {value}")]
    Config { parameter: String, value: String },

    /// Model loading or inference failed, or its output has an unexpected shape
    #[error("Detection model error: {0}")]
    Model(String),

    /// The background processing task panicked or was cancelled
    #[error("Processing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl SoilviewError {
    pub fn invalid_image(reason: impl Into<String>) -> Self {
        Self::InvalidImage {
            reason: reason.into(),
        }
    }

    /// Short message suitable for showing inline next to an entry
    pub fn user_message(&self) -> String {
        match self {
            SoilviewError::InvalidImage { .. } | SoilviewError::Decode { .. } => {
                "Could not read this image.".to_string()
            }
            SoilviewError::DimensionMismatch { .. } => {
                "The mask does not match the image size.".to_string()
            }
            SoilviewError::MissingFile { path } => {
                format!("File is missing: {}", path.display())
            }
            SoilviewError::Task(_) => "Processing stopped unexpectedly.".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SoilviewError>;
