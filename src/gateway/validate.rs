//! Local structural validation of optimization results
//!
//! An explicit schema — required keys mapped to the container kind they must
//! hold — checked generically over parsed JSON. Acceptance is all-or-nothing:
//! one missing key or wrong container kind rejects the whole value.

use serde_json::Value;
use tracing::debug;

/// Container kind a field must hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    /// Present with any value
    Any,
    /// JSON object
    Object,
    /// JSON array
    Array,
}

impl Shape {
    fn matches(self, value: &Value) -> bool {
        match self {
            Shape::Any => true,
            Shape::Object => value.is_object(),
            Shape::Array => value.is_array(),
        }
    }
}

/// Required top-level fields of an optimization result
const TOP_LEVEL: &[(&str, Shape)] = &[
    ("original_text", Shape::Any),
    ("score", Shape::Object),
    ("optimized_text", Shape::Any),
    ("suggestions", Shape::Object),
];

/// Required fields of the score sub-mapping
const SCORE_FIELDS: &[(&str, Shape)] = &[("level", Shape::Any), ("points", Shape::Any)];

/// The six suggestion categories, each of which must be list-shaped
pub const SUGGESTION_CATEGORIES: [&str; 6] = [
    "topic_compliance",
    "spelling_errors",
    "grammar_errors",
    "word_optimization",
    "sentence_optimization",
    "structure_optimization",
];

/// Check that every `(field, shape)` pair is satisfied by `object`
fn check_fields(object: &Value, fields: &[(&str, Shape)], context: &str) -> bool {
    for (field, shape) in fields {
        match object.get(field) {
            Some(value) if shape.matches(value) => {}
            Some(_) => {
                debug!("{}: field {} has the wrong container kind", context, field);
                return false;
            }
            None => {
                debug!("{}: missing field {}", context, field);
                return false;
            }
        }
    }
    true
}

/// Validate the structural invariant of an optimization result
///
/// Extra fields are tolerated; only the required structure is checked.
pub fn validate_optimization_shape(data: &Value) -> bool {
    if !data.is_object() {
        return false;
    }
    if !check_fields(data, TOP_LEVEL, "result") {
        return false;
    }
    // score must carry level and points; container kind already checked above
    let score = &data["score"];
    if !check_fields(score, SCORE_FIELDS, "score") {
        return false;
    }
    // each suggestion category must be present and list-shaped
    let suggestions = &data["suggestions"];
    for category in SUGGESTION_CATEGORIES {
        match suggestions.get(category) {
            Some(value) if value.is_array() => {}
            Some(_) => {
                debug!("suggestions.{} is not a list", category);
                return false;
            }
            None => {
                debug!("suggestions missing category {}", category);
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_candidate() -> Value {
        json!({
            "original_text": "I want join camp",
            "score": {"level": "第三档", "points": 6},
            "optimized_text": "I would like to join the camp.",
            "suggestions": {
                "topic_compliance": [],
                "spelling_errors": [],
                "grammar_errors": ["want join → want to join"],
                "word_optimization": [],
                "sentence_optimization": [],
                "structure_optimization": []
            }
        })
    }

    #[test]
    fn test_valid_candidate_passes() {
        assert!(validate_optimization_shape(&valid_candidate()));
    }

    #[test]
    fn test_each_missing_top_level_field_rejects() {
        for field in ["original_text", "score", "optimized_text", "suggestions"] {
            let mut candidate = valid_candidate();
            candidate.as_object_mut().unwrap().remove(field);
            assert!(!validate_optimization_shape(&candidate), "field {field}");
        }
    }

    #[test]
    fn test_score_must_be_a_mapping_with_level_and_points() {
        let mut candidate = valid_candidate();
        candidate["score"] = json!("第三档");
        assert!(!validate_optimization_shape(&candidate));

        let mut candidate = valid_candidate();
        candidate["score"].as_object_mut().unwrap().remove("points");
        assert!(!validate_optimization_shape(&candidate));
    }

    #[test]
    fn test_each_missing_suggestion_category_rejects() {
        for category in SUGGESTION_CATEGORIES {
            let mut candidate = valid_candidate();
            candidate["suggestions"]
                .as_object_mut()
                .unwrap()
                .remove(category);
            assert!(!validate_optimization_shape(&candidate), "category {category}");
        }
    }

    #[test]
    fn test_non_list_suggestion_category_rejects() {
        let mut candidate = valid_candidate();
        candidate["suggestions"]["spelling_errors"] = json!("无");
        assert!(!validate_optimization_shape(&candidate));
    }

    #[test]
    fn test_extra_fields_are_tolerated() {
        let mut candidate = valid_candidate();
        candidate["extra"] = json!(42);
        candidate["suggestions"]["bonus"] = json!({"nested": true});
        assert!(validate_optimization_shape(&candidate));
    }

    #[test]
    fn test_non_object_rejects() {
        assert!(!validate_optimization_shape(&json!([1, 2, 3])));
        assert!(!validate_optimization_shape(&json!("text")));
    }
}
