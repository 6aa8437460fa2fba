// Script locator: catalog scraping → screenplay document → plain text.
//
// Sources are tried in order; the first one that yields text wins and the
// rest are never consulted.

mod dailyscript;
mod sfy;

pub use dailyscript::{imdb_id_from_href, DailyScriptCatalog};
pub use sfy::SfyCatalog;

use std::sync::Arc;

use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::{info, warn};

use triggerwatch_common::{MovieQuery, Script};

use crate::error::{FetchError, ScriptError};
use crate::fetcher::WebFetcher;
use crate::text_extract::{extract_html_text, extract_pdf_text};

// --- ScriptSource trait ---

/// One screenplay catalog.
#[async_trait]
pub trait ScriptSource: Send + Sync {
    /// Short stable name used in logs and [`Script::source`].
    fn name(&self) -> &str;

    async fn find_script(&self, query: &MovieQuery) -> Result<Script, ScriptError>;
}

// --- ScriptLocator ---

pub struct ScriptLocator {
    sources: Vec<Box<dyn ScriptSource>>,
}

impl ScriptLocator {
    pub fn new(sources: Vec<Box<dyn ScriptSource>>) -> Self {
        Self { sources }
    }

    /// sfy.ru first, then dailyscript.com.
    pub fn standard(fetcher: Arc<dyn WebFetcher>) -> Self {
        Self::new(vec![
            Box::new(SfyCatalog::new(fetcher.clone())),
            Box::new(DailyScriptCatalog::new(fetcher)),
        ])
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// First successful source wins. When every source fails, a transport
    /// failure is reported over "not found" so callers can tell them apart.
    pub async fn get_script(&self, query: &MovieQuery) -> Result<Script, ScriptError> {
        let mut transport_error = None;

        for source in &self.sources {
            match source.find_script(query).await {
                Ok(script) => {
                    info!(
                        title = query.title.as_str(),
                        source = source.name(),
                        url = script.url.as_str(),
                        chars = script.text.len(),
                        "Script found"
                    );
                    return Ok(script);
                }
                Err(e) if e.is_not_found() => {
                    info!(
                        title = query.title.as_str(),
                        source = source.name(),
                        reason = %e,
                        "No script from source"
                    );
                }
                Err(e) => {
                    warn!(
                        title = query.title.as_str(),
                        source = source.name(),
                        error = %e,
                        "Script source failed"
                    );
                    transport_error.get_or_insert(e);
                }
            }
        }

        Err(transport_error.unwrap_or(ScriptError::NotFound))
    }
}

// --- Shared scraping helpers ---

/// A link as it appears on a scraped page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Anchor {
    pub href: String,
    pub text: String,
}

/// Every `<a href>` in document order.
pub(crate) fn anchors(html: &str) -> Vec<Anchor> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|el| {
            let href = el.value().attr("href")?.trim();
            Some(Anchor {
                href: href.to_string(),
                text: el.text().collect::<String>(),
            })
        })
        .collect()
}

/// Absolute URL for a possibly-relative `href`.
pub(crate) fn resolve(base: &str, href: &str) -> Result<String, ScriptError> {
    let base = url::Url::parse(base)
        .map_err(|_| FetchError::InvalidUrl(base.to_string()))?;
    let joined = base
        .join(href)
        .map_err(|_| FetchError::InvalidUrl(href.to_string()))?;
    Ok(joined.to_string())
}

/// True when the URL's path ends in `.pdf`, ignoring case.
pub(crate) fn is_pdf_url(url: &str) -> bool {
    let path = match url::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split(['?', '#']).next().unwrap_or(url).to_string(),
    };
    path.to_ascii_lowercase().ends_with(".pdf")
}

/// GET a screenplay document and extract its text by file extension.
pub(crate) async fn fetch_document_text(
    fetcher: &dyn WebFetcher,
    url: &str,
) -> Result<String, ScriptError> {
    let document = fetcher.get(url).await?;

    let text = if is_pdf_url(&document.url) {
        extract_pdf_text(&document.body)
    } else {
        extract_html_text(&document.body)
    };

    let text = text.trim();
    if text.is_empty() {
        return Err(ScriptError::NoText { url: document.url });
    }
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchors_in_document_order() {
        let html = r#"<ul><li><a href="/a">Alien</a></li><li><a>no href</a></li>
            <li><a href=" b.html "><b>Big</b> Fish</a></li></ul>"#;
        let found = anchors(html);
        assert_eq!(
            found,
            vec![
                Anchor { href: "/a".into(), text: "Alien".into() },
                Anchor { href: "b.html".into(), text: "Big Fish".into() },
            ]
        );
    }

    #[test]
    fn resolve_relative_and_absolute() {
        assert_eq!(
            resolve("https://sfy.ru", "/script/joker_2019").unwrap(),
            "https://sfy.ru/script/joker_2019"
        );
        assert_eq!(
            resolve("https://www.dailyscript.com/", "scripts/whiplash.pdf").unwrap(),
            "https://www.dailyscript.com/scripts/whiplash.pdf"
        );
        assert_eq!(
            resolve("https://sfy.ru", "https://cdn.example.org/x.pdf").unwrap(),
            "https://cdn.example.org/x.pdf"
        );
    }

    #[test]
    fn pdf_detection_ignores_case_and_query() {
        assert!(is_pdf_url("https://x.org/Joker.PDF"));
        assert!(is_pdf_url("https://x.org/joker.pdf?download=1"));
        assert!(!is_pdf_url("https://x.org/joker.html"));
        assert!(!is_pdf_url("https://x.org/pdf/joker"));
    }
}
