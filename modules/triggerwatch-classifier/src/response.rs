use ai_client::util::strip_code_blocks;

use triggerwatch_common::{deserialize_trigger_map, TriggerMap};

use crate::error::ClassifyError;

/// First complete top-level `{...}` object embedded in `text`.
///
/// Tracks nesting depth and string-literal state, so braces inside strings
/// and nested objects do not end the object early. Returns `None` when no
/// object closes.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse backend text into a trigger mapping. Values must be 0 or 1
/// (booleans tolerated) and each label may appear once; anything else is
/// [`ClassifyError::Malformed`].
/// Vocabulary completeness is not checked here.
pub fn parse_trigger_response(raw: &str) -> Result<TriggerMap, ClassifyError> {
    let malformed = |reason: String| ClassifyError::Malformed {
        raw: raw.to_string(),
        reason,
    };

    let object = extract_json_object(strip_code_blocks(raw))
        .ok_or_else(|| malformed("no complete JSON object in response".to_string()))?;

    deserialize_trigger_map(&mut serde_json::Deserializer::from_str(object))
        .map_err(|e| malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use triggerwatch_common::Presence;

    #[test]
    fn finds_object_in_prose() {
        let text = r#"Sure! Here you go: {"a cat dies": 0, "someone dies": 1} Hope that helps."#;
        assert_eq!(
            extract_json_object(text),
            Some(r#"{"a cat dies": 0, "someone dies": 1}"#)
        );
    }

    #[test]
    fn nested_objects_and_string_braces_stay_whole() {
        let text = r#"x {"a": {"b": "}{"}, "c": "\"}"} y {"second": 1}"#;
        assert_eq!(
            extract_json_object(text),
            Some(r#"{"a": {"b": "}{"}, "c": "\"}"}"#)
        );
    }

    #[test]
    fn unclosed_object_is_none() {
        assert_eq!(extract_json_object(r#"{"a cat dies": 0"#), None);
        assert_eq!(extract_json_object("no braces"), None);
    }

    #[test]
    fn parses_fenced_response() {
        let raw = "```json\n{\"a cat dies\": 0, \"someone dies\": 1, \"there's torture\": true}\n```";
        let map = parse_trigger_response(raw).unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map["someone dies"], Presence::Present);
        assert_eq!(map["there's torture"], Presence::Present);
        assert_eq!(map["a cat dies"], Presence::Absent);
    }

    #[test]
    fn nested_object_value_is_malformed() {
        let raw = r#"Explanation: here it is {"a cat dies": 0, "nested": {"x":1}}"#;
        let err = parse_trigger_response(raw).unwrap_err();
        match err {
            ClassifyError::Malformed { raw: kept, .. } => assert_eq!(kept, raw),
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn out_of_range_values_are_malformed() {
        assert!(matches!(
            parse_trigger_response(r#"{"a cat dies": 2}"#),
            Err(ClassifyError::Malformed { .. })
        ));
        assert!(matches!(
            parse_trigger_response(r#"{"a cat dies": "yes"}"#),
            Err(ClassifyError::Malformed { .. })
        ));
    }

    #[test]
    fn repeated_label_is_malformed() {
        let raw = r#"{"a cat dies": 1, "a cat dies": 0}"#;
        match parse_trigger_response(raw) {
            Err(ClassifyError::Malformed { reason, .. }) => {
                assert!(reason.contains("duplicate trigger label"), "reason: {reason}");
            }
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn empty_response_is_malformed() {
        assert!(matches!(
            parse_trigger_response(""),
            Err(ClassifyError::Malformed { .. })
        ));
    }
}
