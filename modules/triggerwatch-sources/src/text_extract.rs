// Plain-text extraction from raw HTML and PDF bytes.
//
// Both entry points absorb failure: an unreadable document yields an empty
// string, which callers read as "no text obtained".

use scraper::{ElementRef, Html, Selector};
use tracing::warn;

/// Elements whose content is never visible text.
const SKIPPED_TAGS: &[&str] = &["head", "script", "style", "noscript", "template", "svg"];

/// Elements that start and end their own line.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "caption", "center", "dd", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "li", "main", "nav", "ol", "p", "pre", "section", "table", "tbody", "td",
    "tfoot", "th", "thead", "tr", "ul",
];

/// Elements whose text keeps its whitespace.
const PREFORMATTED_TAGS: &[&str] = &["pre", "textarea", "listing", "plaintext", "xmp"];

/// Concatenated text of every page of a PDF, in page order.
pub fn extract_pdf_text(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return String::new();
    }

    // pdf-extract panics on some malformed inputs; treat that like any other parse failure.
    match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            warn!(error = %e, bytes = bytes.len(), "PDF text extraction failed");
            String::new()
        }
        Err(_) => {
            warn!(bytes = bytes.len(), "PDF parser panicked");
            String::new()
        }
    }
}

/// Visible text of an HTML document, one line per block-level element.
pub fn extract_html_text(bytes: &[u8]) -> String {
    html_text(&String::from_utf8_lossy(bytes), &[])
}

/// Visible text of `html`, dropping every element matched by a `skip` selector.
///
/// Outside `<pre>`, whitespace runs collapse to one space and never start a
/// line; preformatted text is kept verbatim.
pub(crate) fn html_text(html: &str, skip: &[Selector]) -> String {
    let document = Html::parse_document(html);
    let mut out = String::new();
    walk(document.root_element(), skip, false, &mut out);
    out.trim().to_string()
}

fn walk(element: ElementRef, skip: &[Selector], preformatted: bool, out: &mut String) {
    let name = element.value().name();
    if SKIPPED_TAGS.contains(&name) || skip.iter().any(|s| s.matches(&element)) {
        return;
    }

    if name == "br" {
        trim_trailing_spaces(out);
        out.push('\n');
        return;
    }

    let preformatted = preformatted || PREFORMATTED_TAGS.contains(&name);
    let block = BLOCK_TAGS.contains(&name);
    if block {
        line_break(out);
    }

    for child in element.children() {
        if let Some(child_el) = ElementRef::wrap(child) {
            walk(child_el, skip, preformatted, out);
        } else if let Some(text) = child.value().as_text() {
            if preformatted {
                out.push_str(text);
            } else {
                push_collapsed(out, text);
            }
        }
    }

    if block {
        line_break(out);
    }
}

fn push_collapsed(out: &mut String, text: &str) {
    for c in text.chars() {
        if c.is_ascii_whitespace() {
            if !out.is_empty() && !out.ends_with([' ', '\n']) {
                out.push(' ');
            }
        } else {
            out.push(c);
        }
    }
}

fn trim_trailing_spaces(out: &mut String) {
    let kept = out.trim_end_matches(' ').len();
    out.truncate(kept);
}

fn line_break(out: &mut String) {
    trim_trailing_spaces(out);
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}
