mod app;
mod message;
mod screens;

use std::sync::Arc;

use iced::Theme;

pub use app::SoilviewApp;
pub use message::{Message, SlidePanes};

use crate::catalog::Catalog;
use crate::config::ViewerConfig;
use crate::processor::Processor;

/// Which viewer to open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    /// Original / outlined / masked-only panes, starts on the grid
    Mask,
    /// Boxes pane then the untouched original, starts on the first entry
    Detection,
}

impl Tool {
    pub fn pane_count(self) -> usize {
        match self {
            Tool::Mask => 3,
            Tool::Detection => 2,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Tool::Mask => "Soil Pollution - Mask Viewer",
            Tool::Detection => "Soil Pollution - Detections",
        }
    }
}

pub fn run(catalog: Catalog, processor: Processor, config: ViewerConfig, tool: Tool) -> iced::Result {
    let catalog = Arc::new(catalog);
    let processor = Arc::new(processor);

    iced::application(
        move || SoilviewApp::new(catalog.clone(), processor.clone(), config.clone(), tool),
        SoilviewApp::update,
        SoilviewApp::view,
    )
    .title(move |_state: &SoilviewApp| tool.title().to_string())
    .theme(|_state: &SoilviewApp| Theme::Dark)
    .run()
}
