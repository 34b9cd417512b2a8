//! JSON span extraction from free-form model output
//!
//! Models are asked for strict JSON but routinely wrap it in explanatory
//! prose. The recovery heuristic takes the span from the first `{` to the
//! last `}` — outermost-span only, with no nested-brace awareness. Anything
//! cleverer has not been needed in practice.

/// Extract the outermost `{...}` span from `text`, if one exists
///
/// Returns `None` when there is no opening brace, no closing brace, or the
/// last `}` precedes the first `{`.
pub fn extract_json_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_object_is_returned_whole() {
        let text = r#"{"a":1}"#;
        assert_eq!(extract_json_span(text), Some(text));
    }

    #[test]
    fn test_prose_wrapping_is_stripped() {
        let text = r#"Here you go: {"a":1} Thanks!"#;
        assert_eq!(extract_json_span(text), Some(r#"{"a":1}"#));
    }

    #[test]
    fn test_no_braces_yields_none() {
        assert_eq!(extract_json_span("no json here"), None);
        assert_eq!(extract_json_span(""), None);
    }

    #[test]
    fn test_unmatched_braces() {
        assert_eq!(extract_json_span("only open {"), None);
        assert_eq!(extract_json_span("} only close"), None);
        // Close before open: not a span
        assert_eq!(extract_json_span("} then {"), None);
    }

    #[test]
    fn test_multiple_objects_yield_the_outermost_span() {
        // Two JSON-looking substrings: the span covers both, parse decides
        let text = r#"first {"a":1} second {"b":2} done"#;
        assert_eq!(extract_json_span(text), Some(r#"{"a":1} second {"b":2}"#));
    }

    #[test]
    fn test_nested_objects_stay_intact() {
        let text = r#"result: {"score":{"level":"第三档","points":6}} end"#;
        assert_eq!(
            extract_json_span(text),
            Some(r#"{"score":{"level":"第三档","points":6}}"#)
        );
    }

    #[test]
    fn test_brace_inside_string_literal_extends_the_span() {
        // The heuristic is textual: a `}` inside a string literal still counts
        // as the last close brace when nothing follows it.
        let text = r#"{"note":"uses } inside"}"#;
        assert_eq!(extract_json_span(text), Some(text));
    }
}
