use anyhow::Result;

use crate::detect::candidate::Candidate;

/// Output of one local inference pass.
///
/// Depending on which runtime variant carries the model, inference hands
/// back either a dense anchor-grid tensor or an already-boxed detection
/// list; the pipeline supports both.
#[derive(Clone, Debug)]
pub enum LocalOutput {
    /// Attribute-major tensor, `(4 + num_classes) x num_anchors`, decoded
    /// by `BoxDecoder`.
    DenseTensor(Vec<f32>),
    /// Pre-boxed detections (corner-form, labeled), passed through with
    /// clamping and ordering only.
    Boxes(Vec<Candidate>),
}

/// On-device detector runtime.
///
/// Implementations receive a square RGB frame sized to the model input and
/// must treat the pixel slice as read-only and ephemeral. Inference runs on
/// the single analysis worker, so `&mut self` is enough.
pub trait LocalBackend: Send {
    /// Backend identifier for logs.
    fn name(&self) -> &'static str;

    /// Run inference on a `size` x `size` RGB frame.
    fn infer(&mut self, pixels: &[u8], size: u32) -> Result<LocalOutput>;
}
