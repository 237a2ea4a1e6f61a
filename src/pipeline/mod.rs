//! Frame analysis pipeline.
//!
//! One frame at a time: the arbiter picks a source, the source produces a
//! detection set, and the stabilizer turns the set into at most one
//! announcement. The host guarantees single-threaded access; the only
//! mutable state is owned here.

mod arbiter;
mod source;

pub use arbiter::{SourceArbiter, SourceDecision, DEFAULT_MIN_REMOTE_INTERVAL};
pub use source::{DetectionSource, LocalSource, RemoteSource, DEFAULT_MAX_RESULTS};

use std::time::Instant;

use anyhow::Result;

use crate::detect::DetectionSet;
use crate::stabilize::Stabilizer;

/// Outcome of analyzing one frame: the overlay set plus an optional
/// announcement.
#[derive(Clone, Debug)]
pub struct FrameReport {
    pub source: SourceDecision,
    pub detections: DetectionSet,
    pub announcement: Option<String>,
}

impl FrameReport {
    /// Top label for a status line, if any detection survived.
    pub fn top_label(&self) -> Option<&str> {
        self.detections.top().map(|c| c.label.as_str())
    }
}

/// The per-frame driver: arbitration, detection, stabilization.
pub struct DetectionPipeline {
    arbiter: SourceArbiter,
    remote: Box<dyn DetectionSource>,
    local: Box<dyn DetectionSource>,
    stabilizer: Stabilizer,
}

impl DetectionPipeline {
    pub fn new(
        remote: Box<dyn DetectionSource>,
        local: Box<dyn DetectionSource>,
        arbiter: SourceArbiter,
        stabilizer: Stabilizer,
    ) -> Self {
        Self {
            arbiter,
            remote,
            local,
            stabilizer,
        }
    }

    /// Analyze one frame. Exactly one source runs.
    pub fn process_frame(
        &mut self,
        pixels: &[u8],
        size: u32,
        reachable: bool,
    ) -> Result<FrameReport> {
        self.process_frame_at(pixels, size, reachable, Instant::now())
    }

    /// Analyze one frame at an explicit instant (drives both the remote
    /// interval and the announcement cooldown; tests pass synthetic times).
    pub fn process_frame_at(
        &mut self,
        pixels: &[u8],
        size: u32,
        reachable: bool,
        now: Instant,
    ) -> Result<FrameReport> {
        let decision = self.arbiter.decide(reachable, now);
        let detections = match decision {
            SourceDecision::Remote => self.remote.detect(pixels, size)?,
            SourceDecision::Local => self.local.detect(pixels, size)?,
        };
        let announcement = self.stabilizer.observe_at(&detections, now);
        Ok(FrameReport {
            source: decision,
            detections,
            announcement,
        })
    }

    /// Drop all stabilization state, e.g. when the user pauses detection,
    /// so resuming starts from a clean slate instead of re-announcing stale
    /// labels.
    pub fn reset(&mut self) {
        self.stabilizer.reset();
    }
}
