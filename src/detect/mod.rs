mod backend;
mod backends;
mod candidate;
pub mod classes;
mod decoder;
mod nms;

pub use backend::{LocalBackend, LocalOutput};
pub use backends::StubBackend;
#[cfg(feature = "backend-tract")]
pub use backends::TractBackend;
pub use candidate::{Candidate, DetectionSet};
pub use decoder::{BoxDecoder, DEFAULT_CONFIDENCE_THRESHOLD};
pub use nms::{suppress, DEFAULT_IOU_THRESHOLD};
