//! demo - run the local detection path over a single image
//!
//! Decodes a JPEG, scales it to the detector input, runs the on-device
//! model (or the scripted stub), and prints the surviving candidates.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use callout_kernel::detect::{
    classes, BoxDecoder, LocalBackend, StubBackend, DEFAULT_CONFIDENCE_THRESHOLD,
    DEFAULT_IOU_THRESHOLD,
};
use callout_kernel::pipeline::{DetectionSource, LocalSource};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Input JPEG image.
    image: PathBuf,
    /// ONNX model path (requires the backend-tract build).
    #[arg(long)]
    model: Option<PathBuf>,
    /// Confidence floor for the decoder.
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE_THRESHOLD)]
    confidence: f32,
    /// IoU threshold for suppression.
    #[arg(long, default_value_t = DEFAULT_IOU_THRESHOLD)]
    iou: f32,
    /// Square model input size.
    #[arg(long, default_value_t = 640)]
    input_size: u32,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let decoded = image::open(&args.image)
        .with_context(|| format!("decode image {}", args.image.display()))?;
    let rgb = decoded.to_rgb8();
    let scaled = image::imageops::resize(
        &rgb,
        args.input_size,
        args.input_size,
        image::imageops::FilterType::Triangle,
    );
    let pixels = scaled.into_raw();

    let decoder = BoxDecoder::new(
        classes::COCO_CLASSES.len(),
        BoxDecoder::anchors_for_input(args.input_size),
        args.input_size,
    )
    .with_threshold(args.confidence);

    let backend = build_backend(args.model.as_deref(), args.input_size)?;
    let mut source = LocalSource::new(backend, decoder, args.iou);

    let detections = source.detect(&pixels, args.input_size)?;
    if detections.is_empty() {
        println!("no detections");
        return Ok(());
    }
    for candidate in detections.candidates() {
        println!(
            "{:>6.2}  {:<16} [{:.3} {:.3} {:.3} {:.3}]",
            candidate.score, candidate.label, candidate.x1, candidate.y1, candidate.x2, candidate.y2
        );
    }
    Ok(())
}

#[cfg(feature = "backend-tract")]
fn build_backend(
    model: Option<&std::path::Path>,
    input_size: u32,
) -> Result<Box<dyn LocalBackend>> {
    use callout_kernel::detect::TractBackend;

    match model {
        Some(path) => Ok(Box::new(TractBackend::new(path, input_size)?)),
        None => {
            log::warn!("no --model given; using the scripted stub detector");
            Ok(Box::new(StubBackend::empty()))
        }
    }
}

#[cfg(not(feature = "backend-tract"))]
fn build_backend(
    model: Option<&std::path::Path>,
    _input_size: u32,
) -> Result<Box<dyn LocalBackend>> {
    if model.is_some() {
        log::warn!("--model given but built without backend-tract; using the stub detector");
    }
    Ok(Box::new(StubBackend::empty()))
}
