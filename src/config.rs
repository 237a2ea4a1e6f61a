use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::cloud;
use crate::detect;
use crate::pipeline;
use crate::stabilize;

const DEFAULT_INPUT_SIZE: u32 = 640;
const DEFAULT_SOURCE: &str = "stub://camera";
const DEFAULT_TARGET_FPS: u32 = 10;
const DEFAULT_SPEECH_ENABLED: bool = true;

#[derive(Debug, Deserialize, Default)]
struct CalloutConfigFile {
    detector: Option<DetectorConfigFile>,
    cloud: Option<CloudConfigFile>,
    speech: Option<SpeechConfigFile>,
    camera: Option<CameraConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct DetectorConfigFile {
    input_size: Option<u32>,
    confidence_threshold: Option<f32>,
    iou_threshold: Option<f32>,
    max_results: Option<usize>,
    model_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
struct CloudConfigFile {
    endpoint: Option<String>,
    api_key: Option<String>,
    min_score: Option<f32>,
    min_interval_ms: Option<u64>,
    connect_timeout_secs: Option<u64>,
    read_timeout_secs: Option<u64>,
    write_timeout_secs: Option<u64>,
    jpeg_quality: Option<u8>,
}

#[derive(Debug, Deserialize, Default)]
struct SpeechConfigFile {
    enabled: Option<bool>,
    persistence_frames: Option<u32>,
    cooldown_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct CameraConfigFile {
    source: Option<String>,
    target_fps: Option<u32>,
}

/// Resolved daemon configuration: config file (JSON, located via
/// `CALLOUT_CONFIG`), then environment overrides, then validation.
#[derive(Debug, Clone)]
pub struct CalloutConfig {
    pub detector: DetectorSettings,
    pub cloud: CloudSettings,
    pub speech: SpeechSettings,
    pub camera: CameraSettings,
}

#[derive(Debug, Clone)]
pub struct DetectorSettings {
    pub input_size: u32,
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    pub max_results: usize,
    /// ONNX model path for the backend-tract build. Absent means the local
    /// path runs disabled.
    pub model_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct CloudSettings {
    pub endpoint: String,
    pub api_key: String,
    pub min_score: f32,
    pub min_interval: Duration,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub jpeg_quality: u8,
}

#[derive(Debug, Clone)]
pub struct SpeechSettings {
    pub enabled: bool,
    pub persistence_frames: u32,
    pub cooldown: Duration,
}

#[derive(Debug, Clone)]
pub struct CameraSettings {
    pub source: String,
    pub target_fps: u32,
}

impl CalloutConfig {
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("CALLOUT_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: CalloutConfigFile) -> Self {
        let detector_file = file.detector.unwrap_or_default();
        let detector = DetectorSettings {
            input_size: detector_file.input_size.unwrap_or(DEFAULT_INPUT_SIZE),
            confidence_threshold: detector_file
                .confidence_threshold
                .unwrap_or(detect::DEFAULT_CONFIDENCE_THRESHOLD),
            iou_threshold: detector_file
                .iou_threshold
                .unwrap_or(detect::DEFAULT_IOU_THRESHOLD),
            max_results: detector_file
                .max_results
                .unwrap_or(pipeline::DEFAULT_MAX_RESULTS),
            model_path: detector_file.model_path,
        };

        let cloud_file = file.cloud.unwrap_or_default();
        let cloud = CloudSettings {
            endpoint: cloud_file
                .endpoint
                .unwrap_or_else(|| cloud::DEFAULT_ENDPOINT.to_string()),
            api_key: cloud_file.api_key.unwrap_or_default(),
            min_score: cloud_file.min_score.unwrap_or(cloud::DEFAULT_MIN_SCORE),
            min_interval: cloud_file
                .min_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(pipeline::DEFAULT_MIN_REMOTE_INTERVAL),
            connect_timeout: cloud_file
                .connect_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(cloud::DEFAULT_CONNECT_TIMEOUT),
            read_timeout: cloud_file
                .read_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(cloud::DEFAULT_READ_TIMEOUT),
            write_timeout: cloud_file
                .write_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(cloud::DEFAULT_WRITE_TIMEOUT),
            jpeg_quality: cloud_file
                .jpeg_quality
                .unwrap_or(cloud::DEFAULT_JPEG_QUALITY),
        };

        let speech_file = file.speech.unwrap_or_default();
        let speech = SpeechSettings {
            enabled: speech_file.enabled.unwrap_or(DEFAULT_SPEECH_ENABLED),
            persistence_frames: speech_file
                .persistence_frames
                .unwrap_or(stabilize::DEFAULT_PERSISTENCE_FRAMES),
            cooldown: speech_file
                .cooldown_ms
                .map(Duration::from_millis)
                .unwrap_or(stabilize::DEFAULT_COOLDOWN),
        };

        let camera_file = file.camera.unwrap_or_default();
        let camera = CameraSettings {
            source: camera_file
                .source
                .unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
            target_fps: camera_file.target_fps.unwrap_or(DEFAULT_TARGET_FPS),
        };

        Self {
            detector,
            cloud,
            speech,
            camera,
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(key) = std::env::var("CALLOUT_CLOUD_API_KEY") {
            if !key.trim().is_empty() {
                self.cloud.api_key = key;
            }
        }
        if let Ok(endpoint) = std::env::var("CALLOUT_CLOUD_ENDPOINT") {
            if !endpoint.trim().is_empty() {
                self.cloud.endpoint = endpoint;
            }
        }
        if let Ok(source) = std::env::var("CALLOUT_SOURCE") {
            if !source.trim().is_empty() {
                self.camera.source = source;
            }
        }
        if let Ok(model_path) = std::env::var("CALLOUT_MODEL_PATH") {
            if !model_path.trim().is_empty() {
                self.detector.model_path = Some(PathBuf::from(model_path));
            }
        }
        if let Ok(fps) = std::env::var("CALLOUT_TARGET_FPS") {
            let fps: u32 = fps
                .parse()
                .map_err(|_| anyhow!("CALLOUT_TARGET_FPS must be an integer"))?;
            self.camera.target_fps = fps;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.detector.input_size == 0 {
            return Err(anyhow!("detector input_size must be >= 1"));
        }
        if !(0.0..=1.0).contains(&self.detector.confidence_threshold) {
            return Err(anyhow!("confidence_threshold must be within 0..=1"));
        }
        if !(0.0..=1.0).contains(&self.detector.iou_threshold) {
            return Err(anyhow!("iou_threshold must be within 0..=1"));
        }
        if self.detector.max_results == 0 {
            return Err(anyhow!("max_results must be >= 1"));
        }
        if !(0.0..=1.0).contains(&self.cloud.min_score) {
            return Err(anyhow!("cloud min_score must be within 0..=1"));
        }
        if self.cloud.jpeg_quality == 0 || self.cloud.jpeg_quality > 100 {
            return Err(anyhow!("cloud jpeg_quality must be in 1..=100"));
        }
        Url::parse(&self.cloud.endpoint)
            .map_err(|_| anyhow!("cloud endpoint '{}' is not a valid URL", self.cloud.endpoint))?;
        if self.speech.persistence_frames == 0 {
            return Err(anyhow!("speech persistence_frames must be >= 1"));
        }
        if self.camera.target_fps == 0 {
            return Err(anyhow!("camera target_fps must be >= 1"));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<CalloutConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}
