use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use iced::widget::image::Handle;
use iced::{Element, Task};
use image::{DynamicImage, RgbImage};
use rfd::AsyncFileDialog;

use super::Tool;
use super::message::{Message, SlidePanes};
use super::screens;
use crate::catalog::{self, Catalog, CatalogEntry};
use crate::config::{FitSize, ViewerConfig};
use crate::processor::{self, Processor, RequestTracker};
use crate::resize::fit_within;
use crate::viewer::{Viewer, ViewerState};

/// What the slide screen currently shows
#[derive(Debug, Clone)]
pub enum SlideStatus {
    Idle,
    Loading,
    Ready(SlidePanes),
    Failed(String),
}

pub struct SoilviewApp {
    pub(super) catalog: Arc<Catalog>,
    pub(super) processor: Arc<Processor>,
    pub(super) config: ViewerConfig,
    pub(super) tool: Tool,
    pub(super) viewer: Viewer,
    pub(super) thumbnails: HashMap<usize, Result<Handle, String>>,
    pub(super) slide: SlideStatus,
    pub(super) status: String,
    requested_thumbnails: HashSet<usize>,
    tracker: RequestTracker,
}

impl SoilviewApp {
    pub fn new(
        catalog: Arc<Catalog>,
        processor: Arc<Processor>,
        config: ViewerConfig,
        tool: Tool,
    ) -> (Self, Task<Message>) {
        let viewer = Viewer::from_config(catalog.len(), &config, tool.pane_count());
        let status = match catalog.issues().len() {
            0 => String::new(),
            n => format!("{} file(s) skipped while loading", n),
        };

        let mut app = Self {
            catalog,
            processor,
            config,
            tool,
            viewer,
            thumbnails: HashMap::new(),
            slide: SlideStatus::Idle,
            status,
            requested_thumbnails: HashSet::new(),
            tracker: RequestTracker::new(),
        };

        let task = if tool == Tool::Detection && app.viewer.open(0) {
            app.request_slide()
        } else {
            app.request_thumbnails()
        };
        (app, task)
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::NextPage => {
                self.viewer.next_page();
                self.request_thumbnails()
            }
            Message::PrevPage => {
                self.viewer.prev_page();
                self.request_thumbnails()
            }
            Message::Open(index) => {
                if self.viewer.open(index) {
                    self.request_slide()
                } else {
                    Task::none()
                }
            }
            Message::Close => {
                self.viewer.close();
                self.tracker.cancel_all();
                self.slide = SlideStatus::Idle;
                self.request_thumbnails()
            }
            Message::NextPane => {
                self.viewer.next_pane();
                Task::none()
            }
            Message::PrevPane => {
                self.viewer.prev_pane();
                Task::none()
            }
            Message::NextEntry => {
                if self.viewer.next_entry() {
                    self.request_slide()
                } else {
                    Task::none()
                }
            }
            Message::PrevEntry => {
                if self.viewer.prev_entry() {
                    self.request_slide()
                } else {
                    Task::none()
                }
            }
            Message::ThumbnailLoaded(index, result) => {
                if !self.viewer.home_page_entries().contains(&index) {
                    tracing::debug!(index, "dropping thumbnail for a page no longer shown");
                    self.requested_thumbnails.remove(&index);
                    return Task::none();
                }
                if let Err(error) = &result {
                    tracing::warn!(index, "thumbnail failed: {}", error);
                }
                self.thumbnails.insert(index, result);
                Task::none()
            }
            Message::SlideLoaded(ticket, result) => {
                if !self.tracker.is_current(ticket) {
                    tracing::debug!(?ticket, "dropping superseded slide");
                    return Task::none();
                }
                self.slide = match result {
                    Ok(panes) => SlideStatus::Ready(panes),
                    Err(error) => SlideStatus::Failed(error),
                };
                Task::none()
            }
            Message::Export => Task::perform(
                AsyncFileDialog::new()
                    .set_title("Export annotated images")
                    .pick_folder(),
                |handle| Message::ExportFolderPicked(handle.map(|h| h.path().to_path_buf())),
            ),
            Message::ExportFolderPicked(None) => Task::none(),
            Message::ExportFolderPicked(Some(dir)) => match self.open_entry() {
                Some(entry) => {
                    self.status = format!("Exporting {}...", entry.name);
                    Task::perform(
                        export_entry(self.processor.clone(), entry, dir),
                        Message::Exported,
                    )
                }
                None => Task::none(),
            },
            Message::Exported(result) => {
                self.status = match result {
                    Ok(count) => format!("Exported {} image(s)", count),
                    Err(error) => format!("Export failed: {}", error),
                };
                Task::none()
            }
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        match self.viewer.state() {
            ViewerState::Grid { .. } => screens::grid::view(self),
            ViewerState::Slide { pane, .. } => screens::slide::view(self, pane),
        }
    }

    pub(super) fn open_entry(&self) -> Option<CatalogEntry> {
        match self.viewer.state() {
            ViewerState::Slide { entry, .. } => self.catalog.get(entry).cloned(),
            ViewerState::Grid { .. } => None,
        }
    }

    fn slide_size(&self) -> FitSize {
        match self.tool {
            Tool::Mask => self.config.slide,
            Tool::Detection => self.config.detection_slide,
        }
    }

    /// Supersedes any slide still being processed
    fn request_slide(&mut self) -> Task<Message> {
        let Some(entry) = self.open_entry() else {
            return Task::none();
        };

        let ticket = self.tracker.issue();
        self.slide = SlideStatus::Loading;
        Task::perform(
            load_slide(self.processor.clone(), entry, self.slide_size()),
            move |result| Message::SlideLoaded(ticket, result),
        )
    }

    /// Only the home page keeps its thumbnails
    fn retain_visible_thumbnails(&mut self) {
        let visible = self.viewer.home_page_entries();
        self.thumbnails.retain(|index, _| visible.contains(index));
        self.requested_thumbnails.retain(|index| visible.contains(index));
    }

    fn request_thumbnails(&mut self) -> Task<Message> {
        self.retain_visible_thumbnails();
        let size = self.config.thumbnail;
        let mut tasks = Vec::new();

        for cell in self.viewer.grid_cells() {
            if !self.requested_thumbnails.insert(cell.entry) {
                continue;
            }
            let Some(entry) = self.catalog.get(cell.entry) else {
                continue;
            };
            let index = cell.entry;
            tasks.push(Task::perform(
                load_thumbnail(entry.image_path.clone(), size),
                move |result| Message::ThumbnailLoaded(index, result),
            ));
        }

        Task::batch(tasks)
    }
}

fn to_handle(image: &RgbImage) -> Handle {
    let rgba = DynamicImage::ImageRgb8(image.clone()).to_rgba8();
    Handle::from_rgba(rgba.width(), rgba.height(), rgba.into_raw())
}

async fn load_thumbnail(path: PathBuf, size: FitSize) -> Result<Handle, String> {
    tokio::task::spawn_blocking(move || {
        let image = catalog::load_image(&path).map_err(|e| e.user_message())?;
        let small = fit_within(&image, size.max_width, size.max_height).map_err(|e| e.user_message())?;
        Ok(to_handle(&small))
    })
    .await
    .map_err(|e| e.to_string())?
}

async fn load_slide(processor: Arc<Processor>, entry: CatalogEntry, size: FitSize) -> Result<SlidePanes, String> {
    let processed = processor::process_detached(processor, entry)
        .await
        .map_err(|e| e.user_message())?;

    tokio::task::spawn_blocking(move || {
        let mut panes = Vec::new();
        for (_, image) in processed.panes() {
            let resized = fit_within(image, size.max_width, size.max_height).map_err(|e| e.user_message())?;
            panes.push(to_handle(&resized));
        }
        Ok(SlidePanes {
            name: processed.name.clone(),
            panes,
            region_count: processed.region_count,
        })
    })
    .await
    .map_err(|e| e.to_string())?
}

/// Full-resolution PNGs of every pane except the untouched original
async fn export_entry(processor: Arc<Processor>, entry: CatalogEntry, dir: PathBuf) -> Result<usize, String> {
    let processed = processor::process_detached(processor, entry)
        .await
        .map_err(|e| e.user_message())?;

    tokio::task::spawn_blocking(move || {
        let mut written = 0;
        for (suffix, image) in processed.panes() {
            if suffix == "original" {
                continue;
            }
            let path = dir.join(format!("{}_{}.png", processed.name, suffix));
            image.save(&path).map_err(|e| format!("{}: {}", path.display(), e))?;
            written += 1;
        }
        Ok(written)
    })
    .await
    .map_err(|e| e.to_string())?
}
