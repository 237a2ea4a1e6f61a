//! Callout detection core.
//!
//! This crate implements the decision pipeline of a camera app that overlays
//! detected objects and announces them by speech. The hard part is not
//! running a detector; it is turning raw per-frame detector output into a
//! small set of stable, de-duplicated announcements without flooding the
//! user with noise from frame-to-frame jitter, duplicate overlapping boxes,
//! or a flapping network connection.
//!
//! # Pipeline
//!
//! 1. **Arbitrate**: each analyzed frame runs against exactly one detection
//!    source - a rate-limited cloud annotation call, or the bundled
//!    on-device model when offline or throttled.
//! 2. **Decode + suppress** (local path): a dense anchor-grid tensor becomes
//!    corner-form normalized candidates; greedy IoU suppression removes
//!    overlapping duplicates.
//! 3. **Parse** (cloud path): polygon annotations reduce to bounding boxes
//!    in the same candidate representation, so both sources converge on one
//!    type.
//! 4. **Stabilize**: per-label persistence counters with decay debounce the
//!    per-frame sets into at most one announcement, under a speech cooldown.
//!
//! # Module Structure
//!
//! - `detect`: candidate types, class table, tensor decoding, suppression,
//!   and the local backend contract
//! - `cloud`: remote annotation client and response parsing
//! - `pipeline`: source arbitration and the per-frame driver
//! - `stabilize`: announcement debouncing
//! - `frame`, `ingest`: frame container, keep-only-latest handoff, and the
//!   stand-in camera sources used by the daemon
//! - `config`: daemon configuration (JSON file + env overrides)

pub mod cloud;
pub mod config;
pub mod detect;
pub mod frame;
pub mod ingest;
pub mod pipeline;
pub mod stabilize;

pub use cloud::{CloudClient, CloudConfig};
pub use config::CalloutConfig;
pub use detect::{BoxDecoder, Candidate, DetectionSet, LocalBackend, LocalOutput, StubBackend};
#[cfg(feature = "backend-tract")]
pub use detect::TractBackend;
pub use frame::{Frame, FrameSlot};
pub use ingest::{FrameSource, SourceConfig};
pub use pipeline::{
    DetectionPipeline, DetectionSource, FrameReport, LocalSource, RemoteSource, SourceArbiter,
    SourceDecision,
};
pub use stabilize::Stabilizer;
