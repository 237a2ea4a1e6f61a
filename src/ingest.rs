//! Frame sources standing in for the camera collaborator.
//!
//! The real product feeds the pipeline from a camera; the daemon and demo
//! run against these stand-ins instead:
//! - `stub://<name>`: synthetic moving-gradient frames, no hardware needed
//! - a path to a JPEG file or a directory of JPEGs, replayed in a loop
//!
//! Sources hand out frames already scaled to the square detector input.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use image::imageops::FilterType;

use crate::frame::Frame;

/// Configuration for the built-in frame sources.
#[derive(Clone, Debug)]
pub struct SourceConfig {
    /// "stub://<name>" or a local JPEG file/directory path.
    pub source: String,
    /// Square detector input size frames are scaled to.
    pub input_size: u32,
}

/// A stand-in camera.
pub struct FrameSource {
    backend: SourceBackend,
}

enum SourceBackend {
    Synthetic(SyntheticSource),
    Jpeg(JpegSource),
}

impl FrameSource {
    pub fn new(config: SourceConfig) -> Result<Self> {
        if config.input_size == 0 {
            return Err(anyhow!("input size must be >= 1"));
        }
        let backend = if config.source.starts_with("stub://") {
            SourceBackend::Synthetic(SyntheticSource::new(config.input_size))
        } else {
            SourceBackend::Jpeg(JpegSource::new(
                Path::new(&config.source),
                config.input_size,
            )?)
        };
        Ok(Self { backend })
    }

    /// Produce the next frame.
    pub fn next_frame(&mut self) -> Result<Frame> {
        match &mut self.backend {
            SourceBackend::Synthetic(source) => source.next_frame(),
            SourceBackend::Jpeg(source) => source.next_frame(),
        }
    }
}

/// Synthetic moving-gradient source for development without a camera.
struct SyntheticSource {
    size: u32,
    tick: u64,
}

impl SyntheticSource {
    fn new(size: u32) -> Self {
        Self { size, tick: 0 }
    }

    fn next_frame(&mut self) -> Result<Frame> {
        let side = self.size as usize;
        let shift = (self.tick % 256) as usize;
        let mut pixels = vec![0u8; side * side * 3];
        for y in 0..side {
            for x in 0..side {
                let idx = (y * side + x) * 3;
                pixels[idx] = ((x + shift) % 256) as u8;
                pixels[idx + 1] = ((y + shift) % 256) as u8;
                pixels[idx + 2] = ((x + y) % 256) as u8;
            }
        }
        self.tick += 1;
        Frame::new(pixels, self.size)
    }
}

/// Replays JPEG stills from a file or directory in a loop.
struct JpegSource {
    paths: Vec<PathBuf>,
    cursor: usize,
    input_size: u32,
}

impl JpegSource {
    fn new(path: &Path, input_size: u32) -> Result<Self> {
        let mut paths = Vec::new();
        if path.is_dir() {
            let entries = std::fs::read_dir(path)
                .with_context(|| format!("read frame directory {}", path.display()))?;
            for entry in entries {
                let candidate = entry?.path();
                let extension = candidate
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| ext.to_ascii_lowercase());
                if matches!(extension.as_deref(), Some("jpg") | Some("jpeg")) {
                    paths.push(candidate);
                }
            }
            paths.sort();
        } else {
            paths.push(path.to_path_buf());
        }
        if paths.is_empty() {
            return Err(anyhow!("no jpeg files under {}", path.display()));
        }
        Ok(Self {
            paths,
            cursor: 0,
            input_size,
        })
    }

    fn next_frame(&mut self) -> Result<Frame> {
        let path = &self.paths[self.cursor % self.paths.len()];
        self.cursor += 1;
        let decoded = image::open(path)
            .with_context(|| format!("decode frame image {}", path.display()))?;
        let rgb = decoded.to_rgb8();
        let scaled = image::imageops::resize(
            &rgb,
            self.input_size,
            self.input_size,
            FilterType::Triangle,
        );
        Frame::new(scaled.into_raw(), self.input_size)
    }
}
