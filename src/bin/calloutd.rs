//! calloutd - camera callout daemon
//!
//! This daemon:
//! 1. Captures frames from the configured source (stub pattern or JPEG replay)
//! 2. Hands them to the analysis worker through a keep-only-latest slot
//! 3. Arbitrates cloud vs local detection per frame
//! 4. Logs the overlay set and emits stable labels as spoken announcements

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;

use callout_kernel::config::CalloutConfig;
use callout_kernel::detect::{classes, BoxDecoder, Candidate, LocalBackend, StubBackend};
use callout_kernel::pipeline::{
    DetectionPipeline, LocalSource, RemoteSource, SourceArbiter, SourceDecision,
};
use callout_kernel::stabilize::Stabilizer;
use callout_kernel::{CloudClient, CloudConfig, FrameSlot, FrameSource, SourceConfig};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Config file path (overrides CALLOUT_CONFIG).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Force the local path even when a cloud key is configured.
    #[arg(long)]
    offline: bool,
    /// Disable spoken announcements (detection keeps running).
    #[arg(long)]
    no_speech: bool,
    /// Use a scripted stub detector instead of the bundled model.
    #[arg(long)]
    stub_detector: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Some(path) = &args.config {
        std::env::set_var("CALLOUT_CONFIG", path);
    }
    let cfg = CalloutConfig::load()?;

    let reachable = !args.offline && !cfg.cloud.api_key.trim().is_empty();
    if !reachable {
        log::info!("cloud path disabled; running local-only");
    }
    let speech_enabled = cfg.speech.enabled && !args.no_speech;

    let mut pipeline = build_pipeline(&cfg, args.stub_detector)?;

    let slot = Arc::new(FrameSlot::new());
    let shutdown = Arc::new(AtomicBool::new(false));

    let ctrlc_shutdown = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        ctrlc_shutdown.store(true, Ordering::SeqCst);
    })
    .context("set Ctrl-C handler")?;

    let capture_slot = Arc::clone(&slot);
    let capture_shutdown = Arc::clone(&shutdown);
    let source_cfg = SourceConfig {
        source: cfg.camera.source.clone(),
        input_size: cfg.detector.input_size,
    };
    let frame_interval =
        Duration::from_millis((1000 / u64::from(cfg.camera.target_fps)).max(1));
    let capture = thread::spawn(move || -> Result<()> {
        let mut source = FrameSource::new(source_cfg)?;
        while !capture_shutdown.load(Ordering::SeqCst) {
            match source.next_frame() {
                Ok(frame) => capture_slot.publish(frame),
                Err(err) => log::warn!("frame capture failed: {:#}", err),
            }
            thread::sleep(frame_interval);
        }
        Ok(())
    });

    log::info!(
        "calloutd running. source={} fps={} speech={}",
        cfg.camera.source,
        cfg.camera.target_fps,
        speech_enabled
    );

    while !shutdown.load(Ordering::SeqCst) {
        let Some(frame) = slot.take(Duration::from_millis(500)) else {
            continue;
        };
        let report = pipeline.process_frame(frame.pixels(), frame.size(), reachable)?;
        match report.top_label() {
            Some(label) => log::info!(
                "{}: {} ({} boxes)",
                source_tag(report.source),
                label,
                report.detections.len()
            ),
            None => log::debug!("{}: none", source_tag(report.source)),
        }
        if let Some(label) = report.announcement {
            if speech_enabled {
                log::info!("announce: {}", label);
                println!("speak: {}", label);
            }
        }
    }

    log::info!("shutdown signal received, stopping capture");
    match capture.join() {
        Ok(result) => result?,
        Err(_) => return Err(anyhow!("capture thread panicked")),
    }
    Ok(())
}

fn source_tag(decision: SourceDecision) -> &'static str {
    match decision {
        SourceDecision::Remote => "cloud",
        SourceDecision::Local => "local",
    }
}

fn build_pipeline(cfg: &CalloutConfig, stub_detector: bool) -> Result<DetectionPipeline> {
    let decoder = BoxDecoder::new(
        classes::COCO_CLASSES.len(),
        BoxDecoder::anchors_for_input(cfg.detector.input_size),
        cfg.detector.input_size,
    )
    .with_threshold(cfg.detector.confidence_threshold);

    let backend: Option<Box<dyn LocalBackend>> = if stub_detector {
        Some(Box::new(StubBackend::with_frames(stub_script())))
    } else {
        load_model_backend(cfg)
    };
    let local = match backend {
        Some(backend) => LocalSource::new(backend, decoder, cfg.detector.iou_threshold),
        None => LocalSource::disabled(decoder, cfg.detector.iou_threshold),
    }
    .with_max_results(cfg.detector.max_results);

    let client = CloudClient::new(CloudConfig {
        endpoint: cfg.cloud.endpoint.clone(),
        api_key: cfg.cloud.api_key.clone(),
        jpeg_quality: cfg.cloud.jpeg_quality,
        connect_timeout: cfg.cloud.connect_timeout,
        read_timeout: cfg.cloud.read_timeout,
        write_timeout: cfg.cloud.write_timeout,
    })?;
    let remote = RemoteSource::new(client, cfg.cloud.min_score);

    let arbiter = SourceArbiter::new(cfg.cloud.min_interval);
    let stabilizer = Stabilizer::new(cfg.speech.persistence_frames, cfg.speech.cooldown);

    Ok(DetectionPipeline::new(
        Box::new(remote),
        Box::new(local),
        arbiter,
        stabilizer,
    ))
}

#[cfg(feature = "backend-tract")]
fn load_model_backend(cfg: &CalloutConfig) -> Option<Box<dyn LocalBackend>> {
    use callout_kernel::detect::TractBackend;

    let Some(path) = &cfg.detector.model_path else {
        log::warn!("no model path configured; local path disabled");
        return None;
    };
    match TractBackend::new(path, cfg.detector.input_size) {
        Ok(backend) => Some(Box::new(backend)),
        Err(err) => {
            log::error!("local model failed to load: {:#}", err);
            None
        }
    }
}

#[cfg(not(feature = "backend-tract"))]
fn load_model_backend(cfg: &CalloutConfig) -> Option<Box<dyn LocalBackend>> {
    if cfg.detector.model_path.is_some() {
        log::warn!("model configured but built without backend-tract; local path disabled");
    } else {
        log::warn!("no model runtime built in; local path disabled");
    }
    None
}

/// Scripted detections for `--stub-detector`: a person walks through,
/// a dog shows up, then the scene empties.
fn stub_script() -> Vec<Vec<Candidate>> {
    let person = Candidate {
        x1: 0.2,
        y1: 0.1,
        x2: 0.5,
        y2: 0.9,
        score: 0.85,
        class_id: Some(0),
        label: "person".to_string(),
    };
    let dog = Candidate {
        x1: 0.55,
        y1: 0.5,
        x2: 0.85,
        y2: 0.9,
        score: 0.7,
        class_id: Some(16),
        label: "dog".to_string(),
    };
    vec![
        vec![person.clone()],
        vec![person.clone()],
        vec![person.clone(), dog.clone()],
        vec![person, dog.clone()],
        vec![dog],
        Vec::new(),
        Vec::new(),
    ]
}
