//! Decoded frames and the keep-only-latest handoff slot.
//!
//! Frames arrive on a capture thread and are analyzed on a single dedicated
//! worker, at most one at a time. Frames that arrive while the worker is
//! busy are dropped, not queued: detection freshness matters more than
//! completeness, and a slow remote round trip must not build a backlog.

use std::sync::{Condvar, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};

/// Decoded RGB frame sized for the detector input.
#[derive(Clone, Debug)]
pub struct Frame {
    pixels: Vec<u8>,
    size: u32,
}

impl Frame {
    /// Wrap a square RGB buffer; the length must match `size * size * 3`.
    pub fn new(pixels: Vec<u8>, size: u32) -> Result<Self> {
        let expected = (size as usize)
            .checked_mul(size as usize)
            .and_then(|v| v.checked_mul(3))
            .ok_or_else(|| anyhow!("frame dimensions overflow"))?;
        if pixels.len() != expected {
            return Err(anyhow!(
                "expected {} RGB bytes for a {}x{} frame, got {}",
                expected,
                size,
                size,
                pixels.len()
            ));
        }
        Ok(Self { pixels, size })
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn size(&self) -> u32 {
        self.size
    }
}

/// Single-slot handoff between the capture thread and the analysis worker.
///
/// Publishing replaces any unconsumed frame, so the worker always sees the
/// most recent one and older frames are silently dropped.
pub struct FrameSlot {
    slot: Mutex<Option<Frame>>,
    available: Condvar,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            available: Condvar::new(),
        }
    }

    /// Publish the newest frame, replacing any pending one.
    pub fn publish(&self, frame: Frame) {
        let mut slot = self.slot.lock().unwrap_or_else(|err| err.into_inner());
        *slot = Some(frame);
        self.available.notify_one();
    }

    /// Take the most recent frame, waiting up to `timeout` for one.
    pub fn take(&self, timeout: Duration) -> Option<Frame> {
        let mut slot = self.slot.lock().unwrap_or_else(|err| err.into_inner());
        if slot.is_none() {
            let (guard, _) = self
                .available
                .wait_timeout(slot, timeout)
                .unwrap_or_else(|err| err.into_inner());
            slot = guard;
        }
        slot.take()
    }
}

impl Default for FrameSlot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(fill: u8) -> Frame {
        Frame::new(vec![fill; 4 * 4 * 3], 4).unwrap()
    }

    #[test]
    fn frame_rejects_wrong_buffer_length() {
        assert!(Frame::new(vec![0u8; 10], 4).is_err());
        assert!(Frame::new(vec![0u8; 48], 4).is_ok());
    }

    #[test]
    fn newer_frames_replace_unconsumed_ones() {
        let slot = FrameSlot::new();
        slot.publish(frame(1));
        slot.publish(frame(2));

        let taken = slot.take(Duration::from_millis(10)).unwrap();
        assert_eq!(taken.pixels()[0], 2);
        // The older frame was dropped, not queued.
        assert!(slot.take(Duration::from_millis(10)).is_none());
    }

    #[test]
    fn take_times_out_on_an_empty_slot() {
        let slot = FrameSlot::new();
        assert!(slot.take(Duration::from_millis(10)).is_none());
    }
}
