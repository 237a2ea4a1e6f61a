//! Dense anchor-grid tensor decoding.
//!
//! The bundled detector emits one column per anchor: 4 center-form box
//! parameters followed by one score per class, laid out attribute-major
//! (`(4 + num_classes) x num_anchors`). The decoder turns surviving anchors
//! into corner-form, normalized candidates.

use anyhow::{anyhow, Result};

use crate::detect::candidate::Candidate;
use crate::detect::classes;

/// Default confidence floor for the local path.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.3;

/// Raw box values above this are assumed to be in input-pixel units rather
/// than already normalized to [0,1]. The cutoff distinguishes the two tensor
/// conventions seen across model exports; a third convention would need a
/// new signal, not a wider cutoff.
const NORMALIZED_CUTOFF: f32 = 1.5;

/// Decoder for a fixed tensor shape. Shape is declared up front; a tensor
/// that disagrees with it is rejected outright rather than truncated.
#[derive(Clone, Debug)]
pub struct BoxDecoder {
    num_classes: usize,
    num_anchors: usize,
    input_size: f32,
    confidence_threshold: f32,
}

impl BoxDecoder {
    pub fn new(num_classes: usize, num_anchors: usize, input_size: u32) -> Self {
        Self {
            num_classes,
            num_anchors,
            input_size: input_size as f32,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }

    /// Override the default confidence floor.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn num_attributes(&self) -> usize {
        4 + self.num_classes
    }

    /// Anchor count of the standard three-scale grid (strides 8, 16, 32)
    /// for a square input, e.g. 8400 anchors at 640.
    pub fn anchors_for_input(input_size: u32) -> usize {
        let size = input_size as usize;
        [8usize, 16, 32]
            .iter()
            .map(|stride| (size / stride) * (size / stride))
            .sum()
    }

    /// Decode an attribute-major tensor into candidates, in anchor order
    /// (unsorted; callers sort before suppression).
    ///
    /// Anchors whose best class score does not exceed the confidence floor
    /// are dropped. Every emitted box is clamped into [0,1] x [0,1].
    pub fn decode(&self, data: &[f32]) -> Result<Vec<Candidate>> {
        let expected = self.num_attributes() * self.num_anchors;
        if data.len() != expected {
            return Err(anyhow!(
                "tensor shape mismatch: expected {} values ({} attributes x {} anchors), got {}",
                expected,
                self.num_attributes(),
                self.num_anchors,
                data.len()
            ));
        }

        let n = self.num_anchors;
        let mut out = Vec::new();
        for anchor in 0..n {
            let mut cx = data[anchor];
            let mut cy = data[n + anchor];
            let mut w = data[2 * n + anchor];
            let mut h = data[3 * n + anchor];

            // Linear max over class scores; ties keep the lowest index.
            let mut best_class = 0usize;
            let mut best_score = f32::NEG_INFINITY;
            for class in 0..self.num_classes {
                let score = data[(4 + class) * n + anchor];
                if score > best_score {
                    best_score = score;
                    best_class = class;
                }
            }
            if best_score <= self.confidence_threshold {
                continue;
            }

            if cx > NORMALIZED_CUTOFF
                || cy > NORMALIZED_CUTOFF
                || w > NORMALIZED_CUTOFF
                || h > NORMALIZED_CUTOFF
            {
                cx /= self.input_size;
                cy /= self.input_size;
                w /= self.input_size;
                h /= self.input_size;
            }

            let candidate = Candidate {
                x1: cx - w / 2.0,
                y1: cy - h / 2.0,
                x2: cx + w / 2.0,
                y2: cy + h / 2.0,
                score: best_score,
                class_id: Some(best_class),
                label: classes::label_for(best_class).to_string(),
            }
            .clamped();
            out.push(candidate);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build an attribute-major tensor from per-anchor columns.
    fn tensor(columns: &[Vec<f32>]) -> Vec<f32> {
        let attrs = columns[0].len();
        let mut data = vec![0.0; attrs * columns.len()];
        for (anchor, column) in columns.iter().enumerate() {
            for (attr, value) in column.iter().enumerate() {
                data[attr * columns.len() + anchor] = *value;
            }
        }
        data
    }

    #[test]
    fn anchors_below_threshold_are_dropped() {
        let decoder = BoxDecoder::new(2, 2, 640).with_threshold(0.3);
        // Anchor 0 scores exactly at the floor, anchor 1 above it.
        let data = tensor(&[
            vec![0.5, 0.5, 0.2, 0.2, 0.3, 0.1],
            vec![0.5, 0.5, 0.2, 0.2, 0.8, 0.1],
        ]);
        let candidates = decoder.decode(&data).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].score, 0.8);
        assert_eq!(candidates[0].class_id, Some(0));
        assert_eq!(candidates[0].label, "person");
    }

    #[test]
    fn pixel_unit_boxes_are_normalized_by_input_size() {
        let decoder = BoxDecoder::new(1, 1, 640);
        let data = tensor(&[vec![320.0, 320.0, 128.0, 128.0, 0.9]]);
        let candidates = decoder.decode(&data).unwrap();
        let c = &candidates[0];
        assert!((c.x1 - 0.4).abs() < 1e-5);
        assert!((c.y1 - 0.4).abs() < 1e-5);
        assert!((c.x2 - 0.6).abs() < 1e-5);
        assert!((c.y2 - 0.6).abs() < 1e-5);
    }

    #[test]
    fn normalized_boxes_pass_through_unscaled() {
        let decoder = BoxDecoder::new(1, 1, 640);
        let data = tensor(&[vec![0.5, 0.5, 0.2, 0.2, 0.9]]);
        let c = &decoder.decode(&data).unwrap()[0];
        assert!((c.x1 - 0.4).abs() < 1e-5);
        assert!((c.x2 - 0.6).abs() < 1e-5);
    }

    #[test]
    fn emitted_boxes_are_clamped_into_unit_square() {
        let decoder = BoxDecoder::new(1, 1, 640);
        // Box centered near the edge spills outside the frame.
        let data = tensor(&[vec![0.05, 0.95, 0.3, 0.3, 0.9]]);
        let c = &decoder.decode(&data).unwrap()[0];
        assert!(c.x1 >= 0.0 && c.x1 <= c.x2 && c.x2 <= 1.0);
        assert!(c.y1 >= 0.0 && c.y1 <= c.y2 && c.y2 <= 1.0);
    }

    #[test]
    fn score_ties_keep_the_lowest_class_index() {
        let decoder = BoxDecoder::new(3, 1, 640);
        let data = tensor(&[vec![0.5, 0.5, 0.2, 0.2, 0.7, 0.7, 0.7]]);
        let c = &decoder.decode(&data).unwrap()[0];
        assert_eq!(c.class_id, Some(0));
    }

    #[test]
    fn output_preserves_anchor_order() {
        let decoder = BoxDecoder::new(1, 2, 640);
        let data = tensor(&[
            vec![0.2, 0.2, 0.1, 0.1, 0.5],
            vec![0.8, 0.8, 0.1, 0.1, 0.9],
        ]);
        let candidates = decoder.decode(&data).unwrap();
        assert_eq!(candidates[0].score, 0.5);
        assert_eq!(candidates[1].score, 0.9);
    }

    #[test]
    fn wrong_tensor_length_is_rejected() {
        let decoder = BoxDecoder::new(80, 8400, 640);
        let err = decoder.decode(&[0.0; 16]).unwrap_err();
        assert!(err.to_string().contains("shape mismatch"));
    }

    #[test]
    fn standard_grid_anchor_count() {
        assert_eq!(BoxDecoder::anchors_for_input(640), 8400);
        assert_eq!(BoxDecoder::anchors_for_input(320), 2100);
    }
}
