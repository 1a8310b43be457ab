use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docscan::upload::read_upload;
use docscan::{Config, DocumentPipeline, DocumentResult, OcrsRecognizer, SharedRecognizer};

#[derive(Parser)]
#[command(name = "docscan")]
#[command(about = "Extract text from document images with quality diagnostics")]
#[command(
    after_help = "Note: the bundled ocrs engine reports no per-line confidence, so \
\"confidence\" is 0.0 for every document it reads. This does not indicate a bad scan; \
see \"quality_check\" for image quality."
)]
struct Cli {
    /// Image files to process
    #[arg(value_name = "IMAGE", required = true)]
    images: Vec<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Save intermediate images to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Write each annotated PNG into this directory
    #[arg(long, value_name = "DIR")]
    save_annotated: Option<PathBuf>,

    /// Include per-region detections in the JSON output
    #[arg(long)]
    detections: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// JSON config file; DOCSCAN_* environment variables override it
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory containing the ocrs models
    #[arg(long, value_name = "DIR")]
    model_dir: Option<PathBuf>,

    /// Laplacian variance below which an image is reported as blurry
    #[arg(long)]
    blur_threshold: Option<f64>,

    /// Larger images are scaled down to this size
    #[arg(long)]
    max_dimension: Option<u32>,

    /// Apply morphological closing before thresholding
    #[arg(long)]
    closing: bool,
}

impl Cli {
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(dir) = &self.model_dir {
            config.recognition.model_dir = Some(dir.clone());
        }
        if let Some(threshold) = self.blur_threshold {
            config.quality.blur_threshold = threshold;
        }
        if let Some(max_dimension) = self.max_dimension {
            config.pipeline.max_dimension = max_dimension;
        }
        if self.closing {
            config.preprocess.apply_closing = true;
        }
    }
}

fn process_file(pipeline: &DocumentPipeline, path: &Path) -> DocumentResult {
    match read_upload(path) {
        Ok(bytes) => pipeline.run(&bytes),
        Err(e) => {
            tracing::warn!("Rejected {}: {}", path.display(), e);
            DocumentResult::failure(e.to_string())
        }
    }
}

fn save_annotated(dir: &Path, source: &Path, result: &DocumentResult) -> anyhow::Result<()> {
    let Some(png) = &result.annotated_image else {
        return Ok(());
    };
    std::fs::create_dir_all(dir)?;
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let output_path = dir.join(format!("{}_annotated.png", stem));
    std::fs::write(&output_path, png)?;
    tracing::info!("Saved annotated image to {}", output_path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    dotenvy::dotenv().ok();

    let default_filter = if args.verbose { "docscan=debug" } else { "docscan=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?.with_env()?,
        None => Config::from_env()?,
    };
    args.apply_overrides(&mut config);
    config.validate()?;

    if args.debug_out.is_some() && args.images.len() > 1 {
        anyhow::bail!("--debug-out only supports a single image");
    }

    let recognizer = OcrsRecognizer::load(config.recognition.model_dir.as_deref())?;
    let mut pipeline = DocumentPipeline::new(SharedRecognizer::new(recognizer), config);
    if let Some(debug_dir) = args.debug_out.clone() {
        pipeline = pipeline.with_debug(debug_dir)?;
    }

    let mut handles = Vec::with_capacity(args.images.len());
    for path in args.images.iter().cloned() {
        let pipeline = pipeline.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            let result = process_file(&pipeline, &path);
            (path, result)
        }));
    }

    let mut responses = Vec::with_capacity(handles.len());
    let mut all_succeeded = true;
    for handle in handles {
        let (path, result) = handle.await?;
        if let Some(dir) = &args.save_annotated {
            save_annotated(dir, &path, &result)?;
        }
        all_succeeded &= result.is_success();
        responses.push(result.to_response(args.detections));
    }

    let output = match (responses.len(), args.pretty) {
        (1, true) => serde_json::to_string_pretty(&responses[0])?,
        (1, false) => serde_json::to_string(&responses[0])?,
        (_, true) => serde_json::to_string_pretty(&responses)?,
        (_, false) => serde_json::to_string(&responses)?,
    };
    println!("{}", output);

    if !all_succeeded {
        std::process::exit(1);
    }
    Ok(())
}
