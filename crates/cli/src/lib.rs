use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use scalemark_core::{
    CanvasSize, EstimatedTextMeasure, ImageInfo, InputEvent, LabelLayout, MeasureConfig,
    MeasureDocument, MeasurementId, MeasurementKind, Point, ViewState,
};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

pub mod logging;

#[derive(Debug, Parser)]
#[command(name = "scalemark")]
#[command(about = "Calibrate an image scale and measure distances and areas")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Replay a JSON input script and print the resulting measurements.
    Replay {
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,
        /// JSON configuration file. Defaults come from SCALEMARK_* variables.
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
        /// Raster image whose pixel size overrides the script's image size.
        #[arg(long, value_name = "FILE")]
        image: Option<PathBuf>,
    },
    /// Print CLI version.
    Version,
}

/// Recorded input session
#[derive(Debug, Deserialize)]
struct ReplayScript {
    image: Option<ImageInfo>,
    canvas: Option<CanvasSize>,
    events: Vec<InputEvent>,
}

#[derive(Debug, Serialize)]
struct ReplayReport {
    image: ImageInfo,
    scale_factor: Option<f64>,
    scale_summary: Option<String>,
    view: ViewState,
    measurements: Vec<MeasurementOutput>,
    layouts: Vec<LabelLayout>,
    errors: Vec<EventError>,
}

#[derive(Debug, Serialize)]
struct MeasurementOutput {
    id: MeasurementId,
    kind: MeasurementKind,
    points: Vec<Point>,
    value: f64,
    label: Option<String>,
    display_label: String,
    display_value: String,
}

#[derive(Debug, Serialize)]
struct EventError {
    event_index: usize,
    message: String,
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    logging::init_logging(cli.verbose);

    match cli.command {
        Commands::Replay { script, config, image } => {
            run_replay(&script, config.as_deref(), image.as_deref())
        }
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn run_replay(script_path: &Path, config: Option<&Path>, image: Option<&Path>) -> Result<()> {
    ensure_file_exists(script_path)?;

    let contents = fs::read_to_string(script_path)
        .with_context(|| format!("failed to read script {}", script_path.display()))?;
    let script: ReplayScript = serde_json::from_str(&contents)
        .with_context(|| format!("invalid replay script {}", script_path.display()))?;

    let config = load_config(config)?;
    let image_info = match image {
        Some(path) => read_image_info(path)?,
        None => script
            .image
            .context("no image size: pass --image or set \"image\" in the script")?,
    };
    let canvas = script.canvas.unwrap_or(CanvasSize {
        width: f64::from(image_info.width),
        height: f64::from(image_info.height),
    });

    let report = replay(image_info, canvas, config, script.events);

    let json = serde_json::to_string_pretty(&report)?;
    println!("{json}");

    Ok(())
}

/// Apply every event in order. Rejected events are reported and skipped.
fn replay(
    image: ImageInfo,
    canvas: CanvasSize,
    config: MeasureConfig,
    events: Vec<InputEvent>,
) -> ReplayReport {
    let mut document = MeasureDocument::new(image, config);
    let mut errors = Vec::new();

    for (event_index, event) in events.into_iter().enumerate() {
        match document.handle(event) {
            Ok(outcome) => tracing::debug!(event_index, ?outcome, "event applied"),
            Err(error) => {
                tracing::warn!(event_index, %error, "event rejected");
                errors.push(EventError { event_index, message: error.to_string() });
            }
        }
    }

    let measurements = document
        .measurements()
        .iter()
        .enumerate()
        .map(|(index, m)| MeasurementOutput {
            id: m.id(),
            kind: m.kind(),
            points: m.points().to_vec(),
            value: m.value(),
            label: m.label().map(str::to_owned),
            display_label: m.display_label(index),
            display_value: document.formatted_value(m),
        })
        .collect();

    ReplayReport {
        image,
        scale_factor: document.scale_factor(),
        scale_summary: document.scale_summary(),
        view: *document.view(),
        measurements,
        layouts: document.layouts(canvas, &EstimatedTextMeasure::default()),
        errors,
    }
}

fn load_config(path: Option<&Path>) -> Result<MeasureConfig> {
    match path {
        Some(path) => {
            ensure_file_exists(path)?;
            MeasureConfig::from_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))
        }
        None => MeasureConfig::from_env().context("invalid SCALEMARK_* environment"),
    }
}

fn read_image_info(path: &Path) -> Result<ImageInfo> {
    ensure_file_exists(path)?;
    let (width, height) = image::image_dimensions(path)
        .with_context(|| format!("failed to read image {}", path.display()))?;
    Ok(ImageInfo { width, height })
}

fn ensure_file_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("file does not exist: {}", path.display());
    }

    if !path.is_file() {
        anyhow::bail!("path is not a file: {}", path.display());
    }

    Ok(())
}
