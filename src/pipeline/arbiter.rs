use std::time::{Duration, Instant};

/// Minimum spacing between remote queries. Frames inside the window demote
/// to the local path instead of waiting.
pub const DEFAULT_MIN_REMOTE_INTERVAL: Duration = Duration::from_millis(1500);

/// Which detection backend handles a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceDecision {
    Remote,
    Local,
}

/// Per-frame choice between the rate-limited remote detector and the
/// always-available local one.
///
/// The remote service is rate-limited and cost-bearing; the local model is
/// a zero-cost fallback. Throttling therefore demotes a frame to the local
/// path rather than queueing it for the window to expire.
pub struct SourceArbiter {
    min_remote_interval: Duration,
    last_remote_query: Option<Instant>,
}

impl SourceArbiter {
    pub fn new(min_remote_interval: Duration) -> Self {
        Self {
            min_remote_interval,
            last_remote_query: None,
        }
    }

    /// Resolve the source for a frame arriving at `now`.
    ///
    /// Choosing Remote stamps the query time immediately, so a failed call
    /// still counts against the interval.
    pub fn decide(&mut self, reachable: bool, now: Instant) -> SourceDecision {
        let interval_elapsed = self
            .last_remote_query
            .map_or(true, |last| now.duration_since(last) >= self.min_remote_interval);
        if reachable && interval_elapsed {
            self.last_remote_query = Some(now);
            SourceDecision::Remote
        } else {
            SourceDecision::Local
        }
    }
}

impl Default for SourceArbiter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_REMOTE_INTERVAL)
    }
}
