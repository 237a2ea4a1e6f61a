use std::fmt;

/// Small epsilon in the IoU denominator to avoid division by zero on
/// degenerate boxes.
const IOU_EPSILON: f32 = 1e-7;

/// One proposed detection, before or after suppression.
///
/// Coordinates are corner-form and normalized to [0,1] relative to the model
/// input frame, with `x1 <= x2` and `y1 <= y2`.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    /// Confidence in [0,1].
    pub score: f32,
    /// Fixed class index for the local path; `None` when the source only
    /// carries a free-text label (cloud annotations).
    pub class_id: Option<usize>,
    /// Human-readable label. Always populated.
    pub label: String,
}

impl Candidate {
    pub fn area(&self) -> f32 {
        (self.x2 - self.x1).max(0.0) * (self.y2 - self.y1).max(0.0)
    }

    /// Intersection-over-union with another box.
    pub fn iou(&self, other: &Candidate) -> f32 {
        let left = self.x1.max(other.x1);
        let right = self.x2.min(other.x2);
        let top = self.y1.max(other.y1);
        let bottom = self.y2.min(other.y2);
        let intersection = (right - left).max(0.0) * (bottom - top).max(0.0);
        let union = self.area() + other.area() - intersection;
        intersection / (union + IOU_EPSILON)
    }

    /// Restore the box invariants: corners ordered, every coordinate inside
    /// [0,1]. Sources call this before a candidate leaves their boundary.
    pub fn clamped(mut self) -> Self {
        if self.x1 > self.x2 {
            std::mem::swap(&mut self.x1, &mut self.x2);
        }
        if self.y1 > self.y2 {
            std::mem::swap(&mut self.y1, &mut self.y2);
        }
        self.x1 = self.x1.clamp(0.0, 1.0);
        self.y1 = self.y1.clamp(0.0, 1.0);
        self.x2 = self.x2.clamp(0.0, 1.0);
        self.y2 = self.y2.clamp(0.0, 1.0);
        self
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:.2} [{:.2} {:.2} {:.2} {:.2}]",
            self.label, self.score, self.x1, self.y1, self.x2, self.y2
        )
    }
}

/// Detections for one analyzed frame, ordered by descending score.
///
/// Published to the overlay renderer once per frame; read-only afterwards.
#[derive(Clone, Debug, Default)]
pub struct DetectionSet {
    candidates: Vec<Candidate>,
}

impl DetectionSet {
    /// Wrap candidates that are already in descending-score order
    /// (e.g. the output of suppression).
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }

    /// Sort candidates by descending score, then wrap.
    pub fn from_unsorted(mut candidates: Vec<Candidate>) -> Self {
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        Self { candidates }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Highest-scoring candidate, if any.
    pub fn top(&self) -> Option<&Candidate> {
        self.candidates.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(x1: f32, y1: f32, x2: f32, y2: f32) -> Candidate {
        Candidate {
            x1,
            y1,
            x2,
            y2,
            score: 0.5,
            class_id: Some(0),
            label: "person".to_string(),
        }
    }

    #[test]
    fn iou_of_disjoint_boxes_is_zero() {
        let a = boxed(0.0, 0.0, 0.2, 0.2);
        let b = boxed(0.5, 0.5, 0.7, 0.7);
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn iou_of_identical_boxes_is_one() {
        let a = boxed(0.1, 0.1, 0.5, 0.5);
        let iou = a.iou(&a.clone());
        assert!((iou - 1.0).abs() < 1e-4);
    }

    #[test]
    fn iou_matches_hand_computed_overlap() {
        // Intersection 0.35..0.7 x 0.3..0.7 = 0.14, union 0.18.
        let a = boxed(0.3, 0.3, 0.7, 0.7);
        let b = boxed(0.35, 0.3, 0.75, 0.7);
        let iou = a.iou(&b);
        assert!((iou - 0.14 / 0.18).abs() < 1e-3);
        assert!((a.iou(&b) - b.iou(&a)).abs() < 1e-6);
    }

    #[test]
    fn clamped_restores_invariants() {
        let fixed = boxed(0.9, -0.3, 0.4, 1.4).clamped();
        assert_eq!((fixed.x1, fixed.x2), (0.4, 0.9));
        assert_eq!((fixed.y1, fixed.y2), (0.0, 1.0));
    }

    #[test]
    fn from_unsorted_orders_by_descending_score() {
        let mut low = boxed(0.0, 0.0, 0.1, 0.1);
        low.score = 0.2;
        let mut high = boxed(0.0, 0.0, 0.1, 0.1);
        high.score = 0.9;
        let set = DetectionSet::from_unsorted(vec![low, high]);
        assert_eq!(set.top().unwrap().score, 0.9);
        assert_eq!(set.len(), 2);
    }
}
