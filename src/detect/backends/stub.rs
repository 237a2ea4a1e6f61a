use anyhow::Result;

use crate::detect::backend::{LocalBackend, LocalOutput};
use crate::detect::candidate::Candidate;

/// Scripted backend for tests and stub deployments.
///
/// Cycles through a fixed sequence of per-frame detection lists; an empty
/// script always reports no detections.
pub struct StubBackend {
    frames: Vec<Vec<Candidate>>,
    cursor: usize,
}

impl StubBackend {
    pub fn empty() -> Self {
        Self {
            frames: Vec::new(),
            cursor: 0,
        }
    }

    /// Cycle through the given per-frame detections.
    pub fn with_frames(frames: Vec<Vec<Candidate>>) -> Self {
        Self { frames, cursor: 0 }
    }
}

impl Default for StubBackend {
    fn default() -> Self {
        Self::empty()
    }
}

impl LocalBackend for StubBackend {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn infer(&mut self, _pixels: &[u8], _size: u32) -> Result<LocalOutput> {
        if self.frames.is_empty() {
            return Ok(LocalOutput::Boxes(Vec::new()));
        }
        let frame = self.frames[self.cursor % self.frames.len()].clone();
        self.cursor += 1;
        Ok(LocalOutput::Boxes(frame))
    }
}
