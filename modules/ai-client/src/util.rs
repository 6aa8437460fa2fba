/// Appended to text cut by [`truncate_with_marker`].
pub const TRUNCATION_MARKER: &str = "[... truncated ...]";

/// Truncate a string to at most `max_bytes` bytes at a character boundary.
pub fn truncate_to_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) && end > 0 {
        end -= 1;
    }
    &s[..end]
}

/// Cap `s` at `max_bytes`, appending [`TRUNCATION_MARKER`] on its own line when
/// anything was cut. Text within the limit is returned unchanged.
pub fn truncate_with_marker(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_string();
    }
    let kept = truncate_to_char_boundary(s, max_bytes);
    format!("{}\n{}", kept.trim_end(), TRUNCATION_MARKER)
}

/// Strip markdown code blocks from a response.
pub fn strip_code_blocks(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_on_char_boundary() {
        let text = "Hello 世界";
        let truncated = truncate_to_char_boundary(text, 8);
        assert_eq!(truncated, "Hello ");
        assert!(text.starts_with(truncated));
    }

    #[test]
    fn marker_only_when_cut() {
        assert_eq!(truncate_with_marker("short", 100), "short");

        let capped = truncate_with_marker("INT. APARTMENT - NIGHT\nArthur laughs.", 22);
        assert_eq!(capped, format!("INT. APARTMENT - NIGHT\n{TRUNCATION_MARKER}"));
    }

    #[test]
    fn strips_json_fences() {
        assert_eq!(strip_code_blocks("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_blocks("```\n{}\n```"), "{}");
        assert_eq!(strip_code_blocks("{}"), "{}");
    }
}
