//! Announcement debouncing.
//!
//! Raw per-frame detections are too noisy to speak: boxes flicker between
//! frames, and a flapping network connection swaps label vocabularies. The
//! stabilizer keeps a per-label persistence counter that rises while a label
//! keeps appearing and decays (rather than resetting) across single-frame
//! misses, announcing a label only once it has persisted and the speech
//! cooldown allows it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::detect::DetectionSet;

/// Frames of (near-)consecutive presence before a label may be spoken.
pub const DEFAULT_PERSISTENCE_FRAMES: u32 = 3;

/// Minimum spacing between repeated announcements of the same label.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(2000);

/// Per-label persistence state plus the announcement cooldown.
///
/// Owned by the pipeline and touched only from the analysis worker.
pub struct Stabilizer {
    persistence_frames: u32,
    cooldown: Duration,
    counters: HashMap<String, u32>,
    last_announced: Option<String>,
    last_announced_at: Option<Instant>,
}

impl Stabilizer {
    pub fn new(persistence_frames: u32, cooldown: Duration) -> Self {
        Self {
            persistence_frames,
            cooldown,
            counters: HashMap::new(),
            last_announced: None,
            last_announced_at: None,
        }
    }

    /// Feed one frame's detections; returns at most one label to speak.
    pub fn observe(&mut self, detections: &DetectionSet) -> Option<String> {
        self.observe_at(detections, Instant::now())
    }

    /// As `observe`, at an explicit instant.
    pub fn observe_at(&mut self, detections: &DetectionSet, now: Instant) -> Option<String> {
        // One increment per label per frame, however many boxes carry it.
        let mut present: Vec<&str> = Vec::new();
        for candidate in detections.candidates() {
            if !present.contains(&candidate.label.as_str()) {
                present.push(candidate.label.as_str());
            }
        }
        for label in &present {
            *self.counters.entry((*label).to_string()).or_insert(0) += 1;
        }

        // Labels tracked but absent this frame decay by one and drop out at
        // zero; a single missed frame does not erase accumulated presence.
        self.counters.retain(|label, count| {
            if present.contains(&label.as_str()) {
                true
            } else {
                *count -= 1;
                *count > 0
            }
        });

        // The set is in descending-score order, so the first stable label is
        // the strongest one (ties resolve to the earlier candidate).
        let selected = detections.candidates().iter().find(|candidate| {
            self.counters
                .get(&candidate.label)
                .is_some_and(|count| *count >= self.persistence_frames)
        })?;
        let label = selected.label.clone();

        let switched = self.last_announced.as_deref() != Some(label.as_str());
        let cooled = self
            .last_announced_at
            .map_or(true, |at| now.duration_since(at) > self.cooldown);
        if switched || cooled {
            self.last_announced = Some(label.clone());
            self.last_announced_at = Some(now);
            Some(label)
        } else {
            None
        }
    }

    /// Drop all counters and announcement history.
    pub fn reset(&mut self) {
        self.counters.clear();
        self.last_announced = None;
        self.last_announced_at = None;
    }

    /// Number of labels currently tracked (for debug logging).
    pub fn tracked_labels(&self) -> usize {
        self.counters.len()
    }
}

impl Default for Stabilizer {
    fn default() -> Self {
        Self::new(DEFAULT_PERSISTENCE_FRAMES, DEFAULT_COOLDOWN)
    }
}
