//! Greedy non-max suppression.

use crate::detect::candidate::Candidate;

/// Default IoU threshold above which two boxes count as duplicates.
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.45;

/// Remove redundant overlapping candidates, keeping the highest-scoring box
/// per cluster. Suppression is class-agnostic: a box can only be one object.
///
/// The input need not be sorted; the output is in descending-score order.
/// Greedy and O(n^2) on the post-threshold candidate count, which stays
/// small enough that spatial indexing would be wasted machinery.
pub fn suppress(mut candidates: Vec<Candidate>, iou_threshold: f32) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    let mut suppressed = vec![false; candidates.len()];
    let mut kept = Vec::with_capacity(candidates.len());
    for i in 0..candidates.len() {
        if suppressed[i] {
            continue;
        }
        for j in (i + 1)..candidates.len() {
            if !suppressed[j] && candidates[i].iou(&candidates[j]) > iou_threshold {
                suppressed[j] = true;
            }
        }
        kept.push(candidates[i].clone());
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(x1: f32, y1: f32, x2: f32, y2: f32, score: f32, class_id: usize) -> Candidate {
        Candidate {
            x1,
            y1,
            x2,
            y2,
            score,
            class_id: Some(class_id),
            label: format!("class{}", class_id),
        }
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(suppress(Vec::new(), DEFAULT_IOU_THRESHOLD).is_empty());
    }

    #[test]
    fn single_candidate_survives_unchanged() {
        let only = candidate(0.1, 0.1, 0.4, 0.4, 0.7, 3);
        let kept = suppress(vec![only.clone()], DEFAULT_IOU_THRESHOLD);
        assert_eq!(kept, vec![only]);
    }

    #[test]
    fn overlapping_boxes_collapse_to_the_strongest() {
        let strong = candidate(0.3, 0.3, 0.7, 0.7, 0.9, 0);
        let weak = candidate(0.35, 0.3, 0.75, 0.7, 0.8, 0);
        let kept = suppress(vec![weak, strong.clone()], DEFAULT_IOU_THRESHOLD);
        assert_eq!(kept, vec![strong]);
    }

    #[test]
    fn suppression_ignores_class_membership() {
        // Same location, different classes: still one object.
        let strong = candidate(0.3, 0.3, 0.7, 0.7, 0.9, 0);
        let weak = candidate(0.31, 0.3, 0.71, 0.7, 0.8, 16);
        let kept = suppress(vec![weak, strong.clone()], DEFAULT_IOU_THRESHOLD);
        assert_eq!(kept, vec![strong]);
    }

    #[test]
    fn disjoint_boxes_all_survive_in_score_order() {
        let a = candidate(0.0, 0.0, 0.2, 0.2, 0.5, 0);
        let b = candidate(0.5, 0.5, 0.7, 0.7, 0.9, 1);
        let c = candidate(0.0, 0.8, 0.2, 1.0, 0.7, 2);
        let kept = suppress(vec![a, b, c], DEFAULT_IOU_THRESHOLD);
        let scores: Vec<f32> = kept.iter().map(|k| k.score).collect();
        assert_eq!(scores, vec![0.9, 0.7, 0.5]);
    }

    #[test]
    fn survivors_are_pairwise_below_the_threshold() {
        let candidates = vec![
            candidate(0.10, 0.10, 0.50, 0.50, 0.9, 0),
            candidate(0.12, 0.10, 0.52, 0.50, 0.8, 0),
            candidate(0.40, 0.40, 0.80, 0.80, 0.7, 1),
            candidate(0.60, 0.60, 0.90, 0.90, 0.6, 2),
        ];
        let kept = suppress(candidates, DEFAULT_IOU_THRESHOLD);
        for (i, a) in kept.iter().enumerate() {
            for b in kept.iter().skip(i + 1) {
                assert!(a.iou(b) <= DEFAULT_IOU_THRESHOLD);
            }
        }
    }
}
