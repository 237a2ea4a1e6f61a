//! Object-localization response parsing.
//!
//! Annotations arrive as `{name, score, boundingPoly: {normalizedVertices}}`
//! entries. Each polygon is reduced to its axis-aligned bounding box so the
//! cloud path converges on the same candidate type as the local decoder.

use serde::Deserialize;

use crate::detect::Candidate;

/// Label used when an annotation arrives without a name.
pub const FALLBACK_LABEL: &str = "Unknown";

#[derive(Debug, Default, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateResult>,
}

#[derive(Debug, Default, Deserialize)]
struct AnnotateResult {
    #[serde(default, rename = "localizedObjectAnnotations")]
    annotations: Vec<ObjectAnnotation>,
}

#[derive(Debug, Default, Deserialize)]
struct ObjectAnnotation {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    score: f32,
    #[serde(default, rename = "boundingPoly")]
    bounding_poly: BoundingPoly,
}

#[derive(Debug, Default, Deserialize)]
struct BoundingPoly {
    #[serde(default, rename = "normalizedVertices")]
    normalized_vertices: Vec<Vertex>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
struct Vertex {
    #[serde(default)]
    x: f32,
    #[serde(default)]
    y: f32,
}

/// Parse an annotation response body into candidates.
///
/// Absence of detections is a normal outcome: an empty or malformed body
/// yields an empty list, never an error.
pub fn parse_annotations(body: &str) -> Vec<Candidate> {
    let parsed: AnnotateResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(err) => {
            log::warn!("malformed annotation response: {}", err);
            return Vec::new();
        }
    };
    let Some(first) = parsed.responses.into_iter().next() else {
        return Vec::new();
    };
    first
        .annotations
        .into_iter()
        .map(annotation_to_candidate)
        .collect()
}

fn annotation_to_candidate(annotation: ObjectAnnotation) -> Candidate {
    // Clamp each vertex into [0,1] before taking the min/max bound.
    let mut bounds: Option<(f32, f32, f32, f32)> = None;
    for vertex in &annotation.bounding_poly.normalized_vertices {
        let x = vertex.x.clamp(0.0, 1.0);
        let y = vertex.y.clamp(0.0, 1.0);
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x1, y1, x2, y2)) => (x1.min(x), y1.min(y), x2.max(x), y2.max(y)),
        });
    }
    // A polygon with no vertices degrades to a zero-area box at the origin.
    let (x1, y1, x2, y2) = bounds.unwrap_or((0.0, 0.0, 0.0, 0.0));

    Candidate {
        x1,
        y1,
        x2,
        y2,
        score: annotation.score.clamp(0.0, 1.0),
        class_id: None,
        label: annotation
            .name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| FALLBACK_LABEL.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectangle_polygon_becomes_its_bounding_box() {
        let body = r#"{
            "responses": [{
                "localizedObjectAnnotations": [{
                    "name": "Chair",
                    "score": 0.82,
                    "boundingPoly": {
                        "normalizedVertices": [
                            {"x": 0.1, "y": 0.2},
                            {"x": 0.5, "y": 0.2},
                            {"x": 0.5, "y": 0.6},
                            {"x": 0.1, "y": 0.6}
                        ]
                    }
                }]
            }]
        }"#;
        let candidates = parse_annotations(body);
        assert_eq!(candidates.len(), 1);
        let c = &candidates[0];
        assert_eq!((c.x1, c.y1, c.x2, c.y2), (0.1, 0.2, 0.5, 0.6));
        assert_eq!(c.label, "Chair");
        assert_eq!(c.class_id, None);
        assert!((c.score - 0.82).abs() < 1e-6);
    }

    #[test]
    fn vertices_are_clamped_before_bounding() {
        let body = r#"{
            "responses": [{
                "localizedObjectAnnotations": [{
                    "name": "Dog",
                    "score": 0.5,
                    "boundingPoly": {
                        "normalizedVertices": [
                            {"x": -0.2, "y": 0.1},
                            {"x": 1.3, "y": 0.9}
                        ]
                    }
                }]
            }]
        }"#;
        let c = &parse_annotations(body)[0];
        assert_eq!((c.x1, c.y1, c.x2, c.y2), (0.0, 0.1, 1.0, 0.9));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        // No name, no score, vertices with absent coordinates.
        let body = r#"{
            "responses": [{
                "localizedObjectAnnotations": [{
                    "boundingPoly": {
                        "normalizedVertices": [{"y": 0.4}, {"x": 0.3}]
                    }
                }]
            }]
        }"#;
        let c = &parse_annotations(body)[0];
        assert_eq!(c.label, FALLBACK_LABEL);
        assert_eq!(c.score, 0.0);
        assert_eq!((c.x1, c.y1, c.x2, c.y2), (0.0, 0.0, 0.3, 0.4));
    }

    #[test]
    fn empty_responses_yield_an_empty_set() {
        assert!(parse_annotations(r#"{"responses": []}"#).is_empty());
        assert!(parse_annotations(r#"{}"#).is_empty());
        assert!(parse_annotations(r#"{"responses": [{}]}"#).is_empty());
    }

    #[test]
    fn malformed_bodies_yield_an_empty_set() {
        assert!(parse_annotations("not json").is_empty());
        assert!(parse_annotations("").is_empty());
    }

    #[test]
    fn empty_polygon_degrades_to_origin_box() {
        let body = r#"{
            "responses": [{
                "localizedObjectAnnotations": [{
                    "name": "Cat",
                    "score": 0.7,
                    "boundingPoly": {"normalizedVertices": []}
                }]
            }]
        }"#;
        let c = &parse_annotations(body)[0];
        assert_eq!((c.x1, c.y1, c.x2, c.y2), (0.0, 0.0, 0.0, 0.0));
        assert_eq!(c.label, "Cat");
    }
}
