pub mod annotation;
pub mod catalog;
pub mod config;
pub mod detector;
pub mod error;
pub mod models;
pub mod processor;
pub mod resize;
pub mod viewer;

pub use annotation::{Annotator, MaskAnnotation};
pub use catalog::coco::{CocoDataset, CocoDetector};
pub use catalog::{AnnotationSource, Catalog, CatalogEntry, LoadIssue};
pub use config::{FitSize, ModelSettings, StrokeStyle, ViewerConfig};
pub use detector::Detector;
pub use detector::yolo::{Letterbox, decode_predictions, letterbox, non_max_suppression};
#[cfg(feature = "model")]
pub use detector::rten_model::YoloDetector;
pub use error::{Result, SoilviewError};
pub use models::{Contour, DetectionBox, Rect};
pub use processor::{ProcessedEntry, Processor, RequestTracker, Ticket, process_detached};
pub use resize::{fit_dimensions, fit_within};
pub use viewer::{GridCell, Viewer, ViewerState};

#[cfg(feature = "gui")]
pub mod gui;
