use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use soilview::{Annotator, Catalog, CocoDetector, Detector, FitSize, Processor, ViewerConfig, fit_within};

#[derive(Parser)]
#[command(name = "soilview")]
#[command(about = "Inspect soil images against pollution masks and detections")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Outline mask regions for every image/mask pair
    Mask(MaskArgs),
    /// Draw detection boxes for every image
    Detect(DetectArgs),
    /// Browse image/mask pairs in a window
    #[cfg(feature = "gui")]
    ViewMask(MaskArgs),
    /// Browse detections in a window
    #[cfg(feature = "gui")]
    ViewDetect(DetectArgs),
}

#[derive(Args)]
struct MaskArgs {
    /// Directory with the source images
    #[arg(value_name = "IMAGES")]
    images: PathBuf,

    /// Directory with masks named after the images
    #[arg(value_name = "MASKS")]
    masks: PathBuf,

    /// Write annotated images here
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,
}

#[derive(Args)]
struct DetectArgs {
    /// Directory with the images to annotate
    #[arg(value_name = "IMAGES")]
    images: PathBuf,

    /// COCO annotation file providing the boxes
    #[arg(long, value_name = "FILE")]
    manifest: Option<PathBuf>,

    /// Detection network in `.rten` format, run on every image
    #[cfg(feature = "model")]
    #[arg(long, value_name = "FILE", conflicts_with = "manifest")]
    model: Option<PathBuf>,

    /// Write annotated images here
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = match &args.config {
        Some(path) => ViewerConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ViewerConfig::default(),
    };

    match args.command {
        Command::Mask(mask) => {
            let catalog = Catalog::load_masked(&mask.images, &mask.masks)?;
            let processor = Processor::new(Annotator::from_config(&config)).with_cache_capacity(0);
            run_batch(&catalog, &processor, mask.out.as_deref(), config.slide)
        }
        Command::Detect(detect) => {
            let catalog = Catalog::load_detections(&detect.images)?;
            let processor = Processor::new(Annotator::from_config(&config))
                .with_detector(build_detector(&detect, &config)?)
                .with_cache_capacity(0);
            run_batch(&catalog, &processor, detect.out.as_deref(), config.detection_slide)
        }
        #[cfg(feature = "gui")]
        Command::ViewMask(mask) => {
            let catalog = Catalog::load_masked(&mask.images, &mask.masks)?;
            let processor = Processor::new(Annotator::from_config(&config))
                .with_cache_capacity(config.cache_capacity);
            soilview::gui::run(catalog, processor, config, soilview::gui::Tool::Mask)
                .map_err(|e| anyhow::anyhow!("GUI failed: {}", e))
        }
        #[cfg(feature = "gui")]
        Command::ViewDetect(detect) => {
            let catalog = Catalog::load_detections(&detect.images)?;
            let processor = Processor::new(Annotator::from_config(&config))
                .with_detector(build_detector(&detect, &config)?)
                .with_cache_capacity(config.cache_capacity);
            soilview::gui::run(catalog, processor, config, soilview::gui::Tool::Detection)
                .map_err(|e| anyhow::anyhow!("GUI failed: {}", e))
        }
    }
}

/// Boxes come from the model when one is given, otherwise from the manifest
#[cfg_attr(not(feature = "model"), allow(unused_variables))]
fn build_detector(args: &DetectArgs, config: &ViewerConfig) -> anyhow::Result<Box<dyn Detector>> {
    #[cfg(feature = "model")]
    if let Some(path) = &args.model {
        let detector = soilview::YoloDetector::from_file(path, config.model)
            .with_context(|| format!("Failed to load model {}", path.display()))?;
        return Ok(Box::new(detector));
    }

    match &args.manifest {
        Some(path) => Ok(Box::new(CocoDetector::from_file(path)?)),
        None if cfg!(feature = "model") => anyhow::bail!("either --manifest or --model is required"),
        None => anyhow::bail!("--manifest is required"),
    }
}

/// Process every entry; a failing entry is reported and skipped
fn run_batch(catalog: &Catalog, processor: &Processor, out: Option<&Path>, size: FitSize) -> anyhow::Result<()> {
    if let Some(dir) = out {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    }

    let mut failed = 0;
    for entry in catalog.entries() {
        let processed = match processor.process(entry) {
            Ok(processed) => processed,
            Err(e) => {
                tracing::error!(name = %entry.name, "{}", e);
                failed += 1;
                continue;
            }
        };

        println!("{}: {} region(s)", entry.name, processed.region_count);

        if let Some(dir) = out {
            for (suffix, image) in processed.panes().into_iter().filter(|(label, _)| *label != "original") {
                let path = dir.join(format!("{}_{}.png", entry.name, suffix));
                fit_within(image, size.max_width, size.max_height)?
                    .save(&path)
                    .with_context(|| format!("Failed to save {}", path.display()))?;
                tracing::debug!(path = %path.display(), "saved");
            }
        }
    }

    println!(
        "\nProcessed {} of {} entries ({} failed, {} skipped while loading)",
        catalog.len() - failed,
        catalog.len(),
        failed,
        catalog.issues().len()
    );
    Ok(())
}
