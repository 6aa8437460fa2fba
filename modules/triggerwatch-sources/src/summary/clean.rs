use std::sync::LazyLock;

use regex::Regex;
use scraper::Selector;

use crate::text_extract::html_text;

/// Footnote superscripts and section edit links.
static NOISE_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    ["sup.reference", ".mw-editsection", "link", "meta"]
        .iter()
        .map(|s| Selector::parse(s).expect("valid selector"))
        .collect()
});

static EDIT_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\[\s*edit\s*\]").expect("valid regex"));
static FOOTNOTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\[\s*(?:\d+|note\s+\d+|citation needed)\s*\]").expect("valid regex")
});
// Lettered notes ("film.[a] The") hang off a word or punctuation and are not
// followed by a letter, unlike editorial brackets such as "[h]e said".
static LETTER_NOTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([\p{L}\p{N}.,;:)\]])\[[a-z]\]([^\p{L}]|$)").expect("valid regex")
});
// Blank means whitespace-only, including NBSP and CR.
static BLANK_LINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n(?:[^\S\n]*\n)+").expect("valid regex"));
static CARET_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[^\S\n]*\^").expect("valid regex"));

/// Rendered section markup → cleaned narrative text.
pub fn section_html_to_text(html: &str) -> String {
    clean_section_text(&html_text(html, &NOISE_SELECTORS))
}

/// Normalize extracted section text. Idempotent.
///
/// Removes edit-link and footnote markers, collapses blank lines, and cuts
/// everything from the first line that starts with a citation caret (the
/// reference list that trails a section).
pub fn clean_section_text(text: &str) -> String {
    let mut text = text.to_string();

    // Removing one marker can expose another, e.g. "[[1]edit]".
    loop {
        let next = FOOTNOTE_RE.replace_all(&text, "");
        let next = LETTER_NOTE_RE.replace_all(&next, "${1}${2}");
        let next = EDIT_LINK_RE.replace_all(&next, "").into_owned();
        if next == text {
            break;
        }
        text = next;
    }

    let text = BLANK_LINES_RE.replace_all(&text, "\n");
    let text = match CARET_LINE_RE.find(&text) {
        Some(m) => &text[..m.start()],
        None => &text[..],
    };
    let text = BLANK_LINES_RE.replace_all(text, "\n");

    text.trim().to_string()
}
