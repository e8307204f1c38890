use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use image::RgbImage;

use crate::annotation::Annotator;
use crate::catalog::{self, AnnotationSource, CatalogEntry};
use crate::detector::Detector;
use crate::error::{Result, SoilviewError};

/// Full-resolution views of one entry. Resizing for display is left to the caller.
#[derive(Debug, Clone)]
pub struct ProcessedEntry {
    pub name: String,
    pub original: RgbImage,
    pub annotated: RgbImage,
    /// Only for mask-driven entries
    pub masked_only: Option<RgbImage>,
    /// Contours for masks, boxes for detections
    pub region_count: usize,
}

impl ProcessedEntry {
    /// Labelled panes in display order.
    ///
    /// Mask entries: `original`, `outlined`, `masked`. Detection entries: `boxes`, `original`.
    pub fn panes(&self) -> Vec<(&'static str, &RgbImage)> {
        match &self.masked_only {
            Some(masked) => vec![
                ("original", &self.original),
                ("outlined", &self.annotated),
                ("masked", masked),
            ],
            None => vec![("boxes", &self.annotated), ("original", &self.original)],
        }
    }
}

/// Bounded cache, oldest insertion is evicted first
#[derive(Debug, Default)]
struct EntryCache {
    capacity: usize,
    order: VecDeque<String>,
    items: HashMap<String, Arc<ProcessedEntry>>,
}

impl EntryCache {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ..Default::default()
        }
    }

    fn get(&self, name: &str) -> Option<Arc<ProcessedEntry>> {
        self.items.get(name).cloned()
    }

    fn insert(&mut self, processed: Arc<ProcessedEntry>) {
        if self.capacity == 0 || self.items.contains_key(&processed.name) {
            return;
        }
        while self.items.len() >= self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.items.remove(&oldest);
        }
        self.order.push_back(processed.name.clone());
        self.items.insert(processed.name.clone(), processed);
    }
}

/// Decodes and annotates catalog entries on demand
pub struct Processor {
    annotator: Annotator,
    detector: Option<Box<dyn Detector>>,
    cache: Mutex<EntryCache>,
}

impl Processor {
    pub fn new(annotator: Annotator) -> Self {
        Self {
            annotator,
            detector: None,
            cache: Mutex::new(EntryCache::new(4)),
        }
    }

    pub fn with_detector(mut self, detector: Box<dyn Detector>) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = Mutex::new(EntryCache::new(capacity));
        self
    }

    pub fn annotator(&self) -> &Annotator {
        &self.annotator
    }

    /// Process one entry, serving repeated requests from the cache
    pub fn process(&self, entry: &CatalogEntry) -> Result<Arc<ProcessedEntry>> {
        if let Some(hit) = self.lock_cache().get(&entry.name) {
            tracing::trace!(name = %entry.name, "cache hit");
            return Ok(hit);
        }

        let processed = Arc::new(self.process_uncached(entry)?);
        self.lock_cache().insert(processed.clone());
        Ok(processed)
    }

    pub fn is_cached(&self, name: &str) -> bool {
        self.lock_cache().get(name).is_some()
    }

    fn process_uncached(&self, entry: &CatalogEntry) -> Result<ProcessedEntry> {
        let original = catalog::load_image(&entry.image_path)?;

        let processed = match &entry.source {
            AnnotationSource::Mask(mask_path) => {
                let mask = catalog::load_mask(mask_path)?;
                let result = self.annotator.annotate_with_mask(&original, &mask)?;
                ProcessedEntry {
                    name: entry.name.clone(),
                    region_count: result.contours.len(),
                    annotated: result.outlined,
                    masked_only: Some(result.masked_only),
                    original,
                }
            }
            AnnotationSource::Detections => {
                let detector = self.detector.as_ref().ok_or_else(|| SoilviewError::Config {
                    parameter: "detector".to_string(),
                    value: "none".to_string(),
                })?;
                let boxes = detector.detect(entry, &original)?;
                tracing::debug!(name = %entry.name, detector = detector.name(), boxes = boxes.len(), "detected");
                let annotated = self.annotator.annotate_with_detections(&original, &boxes)?;
                ProcessedEntry {
                    name: entry.name.clone(),
                    region_count: boxes.len(),
                    annotated,
                    masked_only: None,
                    original,
                }
            }
        };

        tracing::info!(name = %entry.name, regions = processed.region_count, "processed");
        Ok(processed)
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, EntryCache> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Run [`Processor::process`] on tokio's blocking pool
pub async fn process_detached(processor: Arc<Processor>, entry: CatalogEntry) -> Result<Arc<ProcessedEntry>> {
    tokio::task::spawn_blocking(move || processor.process(&entry)).await?
}

/// Ticket for one in-flight processing request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Issues tickets so that only the latest request's response is accepted.
/// Earlier requests still complete, their results are dropped.
#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: AtomicU64,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Supersede whatever is in flight without issuing a new request
    pub fn cancel_all(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }
}
