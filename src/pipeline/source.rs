use anyhow::Result;

use crate::cloud::CloudClient;
use crate::detect::{suppress, BoxDecoder, Candidate, DetectionSet, LocalBackend, LocalOutput};

/// Cap on detections surviving the local path, applied after suppression.
pub const DEFAULT_MAX_RESULTS: usize = 6;

/// A per-frame detection capability. Exactly one source runs per analyzed
/// frame, selected by the arbiter.
///
/// Recoverable failures (transport errors, malformed responses, unavailable
/// runtimes) degrade to an empty set; `Err` is reserved for configuration
/// errors such as a tensor shape mismatch.
pub trait DetectionSource {
    fn name(&self) -> &'static str;

    fn detect(&mut self, pixels: &[u8], size: u32) -> Result<DetectionSet>;
}

/// Cloud-backed source: annotate the frame remotely and apply the remote
/// score floor before anything reaches the stabilizer.
pub struct RemoteSource {
    client: CloudClient,
    min_score: f32,
}

impl RemoteSource {
    pub fn new(client: CloudClient, min_score: f32) -> Self {
        Self { client, min_score }
    }

    fn winnow(&self, mut candidates: Vec<Candidate>) -> DetectionSet {
        candidates.retain(|candidate| candidate.score >= self.min_score);
        DetectionSet::from_unsorted(candidates)
    }
}

impl DetectionSource for RemoteSource {
    fn name(&self) -> &'static str {
        "cloud"
    }

    fn detect(&mut self, pixels: &[u8], size: u32) -> Result<DetectionSet> {
        let candidates = self.client.annotate(pixels, size);
        Ok(self.winnow(candidates))
    }
}

/// On-device source: local runtime, then tensor decoding and suppression
/// (or a pass-through for runtimes that already box their detections).
pub struct LocalSource {
    backend: Option<Box<dyn LocalBackend>>,
    decoder: BoxDecoder,
    iou_threshold: f32,
    max_results: usize,
}

impl LocalSource {
    pub fn new(backend: Box<dyn LocalBackend>, decoder: BoxDecoder, iou_threshold: f32) -> Self {
        Self {
            backend: Some(backend),
            decoder,
            iou_threshold,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    /// Local path with no usable runtime: frames routed here produce empty
    /// sets for the lifetime of the process.
    pub fn disabled(decoder: BoxDecoder, iou_threshold: f32) -> Self {
        Self {
            backend: None,
            decoder,
            iou_threshold,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

impl DetectionSource for LocalSource {
    fn name(&self) -> &'static str {
        "local"
    }

    fn detect(&mut self, pixels: &[u8], size: u32) -> Result<DetectionSet> {
        let Some(backend) = self.backend.as_mut() else {
            return Ok(DetectionSet::empty());
        };
        let output = match backend.infer(pixels, size) {
            Ok(output) => output,
            Err(err) => {
                log::warn!("local inference failed: {:#}", err);
                return Ok(DetectionSet::empty());
            }
        };
        let mut kept = match output {
            LocalOutput::DenseTensor(data) => {
                let candidates = self.decoder.decode(&data)?;
                suppress(candidates, self.iou_threshold)
            }
            LocalOutput::Boxes(boxes) => {
                let mut boxes: Vec<Candidate> =
                    boxes.into_iter().map(Candidate::clamped).collect();
                boxes.sort_by(|a, b| b.score.total_cmp(&a.score));
                boxes
            }
        };
        kept.truncate(self.max_results);
        Ok(DetectionSet::new(kept))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::CloudConfig;
    use crate::detect::StubBackend;

    fn candidate(label: &str, score: f32) -> Candidate {
        Candidate {
            x1: 0.1,
            y1: 0.1,
            x2: 0.3,
            y2: 0.3,
            score,
            class_id: None,
            label: label.to_string(),
        }
    }

    #[test]
    fn remote_floor_filters_and_orders() {
        let client = CloudClient::new(CloudConfig::default()).unwrap();
        let source = RemoteSource::new(client, 0.45);
        let set = source.winnow(vec![
            candidate("Chair", 0.3),
            candidate("Person", 0.9),
            candidate("Dog", 0.5),
        ]);
        let labels: Vec<&str> = set
            .candidates()
            .iter()
            .map(|c| c.label.as_str())
            .collect();
        assert_eq!(labels, vec!["Person", "Dog"]);
    }

    #[test]
    fn disabled_local_path_yields_empty_sets() {
        let decoder = BoxDecoder::new(80, 8400, 640);
        let mut source = LocalSource::disabled(decoder, 0.45);
        let set = source.detect(&[], 640).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn preboxed_output_is_clamped_sorted_and_capped() {
        let mut boxes = vec![
            candidate("a", 0.2),
            candidate("b", 0.9),
            candidate("c", 0.5),
        ];
        boxes[0].x2 = 1.7; // out of range, must be clamped
        let backend = StubBackend::with_frames(vec![boxes]);
        let decoder = BoxDecoder::new(80, 8400, 640);
        let mut source =
            LocalSource::new(Box::new(backend), decoder, 0.45).with_max_results(2);
        let set = source.detect(&[], 640).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.top().unwrap().label, "b");
        for c in set.candidates() {
            assert!(c.x2 <= 1.0);
        }
    }

    #[test]
    fn dense_tensor_shape_mismatch_propagates() {
        struct BadTensorBackend;
        impl LocalBackend for BadTensorBackend {
            fn name(&self) -> &'static str {
                "bad"
            }
            fn infer(&mut self, _pixels: &[u8], _size: u32) -> Result<LocalOutput> {
                Ok(LocalOutput::DenseTensor(vec![0.0; 7]))
            }
        }
        let decoder = BoxDecoder::new(80, 8400, 640);
        let mut source = LocalSource::new(Box::new(BadTensorBackend), decoder, 0.45);
        assert!(source.detect(&[], 640).is_err());
    }
}
