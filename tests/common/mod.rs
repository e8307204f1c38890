mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from soilview for tests
pub use soilview::{
    AnnotationSource, Annotator, Catalog, CatalogEntry, CocoDataset, CocoDetector, DetectionBox,
    LoadIssue, Processor, SoilviewError, StrokeStyle, Viewer, ViewerConfig, ViewerState,
};
