use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use triggerwatch_common::{normalize_external_id, MovieQuery, Script};

use super::{anchors, fetch_document_text, is_pdf_url, resolve, ScriptSource};
use crate::error::ScriptError;
use crate::fetcher::WebFetcher;
use crate::text_extract::extract_html_text;

pub const SFY_LISTING_URL: &str = "https://sfy.ru/scripts";
pub const SFY_SITE_URL: &str = "https://sfy.ru";

/// Exact text of the anchor that links a script page to its IMDb record.
const IDENTITY_ANCHOR_TEXT: &str = "More info about this movie on IMDb.com";
/// Inline scripts start after this banner.
const INLINE_MARKER: &str = "FOR EDUCATIONAL PURPOSES ONLY";

/// What a verified script page offers.
#[derive(Debug, PartialEq, Eq)]
enum PageContent {
    Document { href: String },
    Inline(String),
}

/// Source A: title-matched listing entry, verified against the IMDb link on
/// the script page, then a PDF document or the inline transcript.
pub struct SfyCatalog {
    fetcher: Arc<dyn WebFetcher>,
    listing_url: String,
    site_url: String,
}

impl SfyCatalog {
    pub fn new(fetcher: Arc<dyn WebFetcher>) -> Self {
        Self::with_urls(fetcher, SFY_LISTING_URL, SFY_SITE_URL)
    }

    pub fn with_urls(
        fetcher: Arc<dyn WebFetcher>,
        listing_url: impl Into<String>,
        site_url: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            listing_url: listing_url.into(),
            site_url: site_url.into(),
        }
    }

    fn script(&self, url: String, text: String) -> Script {
        Script {
            source: self.name().to_string(),
            url,
            text,
        }
    }
}

#[async_trait]
impl ScriptSource for SfyCatalog {
    fn name(&self) -> &str {
        "sfy.ru"
    }

    async fn find_script(&self, query: &MovieQuery) -> Result<Script, ScriptError> {
        let listing = self.fetcher.get(&self.listing_url).await?.text();
        let Some(href) = find_title_link(&listing, &query.title) else {
            debug!(title = query.title.as_str(), "Title not in sfy listing");
            return Err(ScriptError::NotFound);
        };

        let page_url = resolve(&self.site_url, &href)?;
        let page = self.fetcher.get(&page_url).await?.text();

        match inspect_page(&page, &query.external_id)? {
            PageContent::Document { href } => {
                let doc_url = resolve(&self.site_url, &href)?;
                let status = self.fetcher.head(&doc_url).await?;
                if status == 404 {
                    info!(url = doc_url.as_str(), "Script document missing");
                    return Err(ScriptError::DocumentMissing { url: doc_url });
                }
                let text = fetch_document_text(self.fetcher.as_ref(), &doc_url).await?;
                Ok(self.script(doc_url, text))
            }
            PageContent::Inline(text) => Ok(self.script(page_url, text)),
        }
    }
}

/// href of the first listing link whose text contains `title`, ignoring case.
fn find_title_link(html: &str, title: &str) -> Option<String> {
    let needle = title.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    anchors(html)
        .into_iter()
        .find(|a| a.text.to_lowercase().contains(&needle))
        .map(|a| a.href)
}

/// Verify the page belongs to `external_id`, then pick the document link or
/// the inline transcript.
fn inspect_page(html: &str, external_id: &str) -> Result<PageContent, ScriptError> {
    let expected = normalize_external_id(external_id).unwrap_or_else(|| external_id.trim().to_string());
    let links = anchors(html);

    let verified = !expected.is_empty()
        && links
            .iter()
            .find(|a| a.text.trim() == IDENTITY_ANCHOR_TEXT)
            .is_some_and(|a| a.href.contains(&expected));
    if !verified {
        return Err(ScriptError::IdentityMismatch { expected });
    }

    if let Some(doc) = links.iter().find(|a| is_pdf_url(&a.href)) {
        return Ok(PageContent::Document {
            href: doc.href.clone(),
        });
    }

    let text = extract_html_text(html.as_bytes());
    match text.split_once(INLINE_MARKER) {
        Some((_, after)) if !after.trim().is_empty() => Ok(PageContent::Inline(after.trim().to_string())),
        _ => Err(ScriptError::NotFound),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERIFIED: &str = r#"<a href="https://www.imdb.com/title/tt7286456/">More info about this movie on IMDb.com</a>"#;

    #[test]
    fn first_case_insensitive_title_match_wins() {
        let listing = r#"<a href="/script/jokers_wild">Jokers Wild</a>
            <a href="/script/joker">JOKER</a>"#;
        assert_eq!(
            find_title_link(listing, "joker").as_deref(),
            Some("/script/jokers_wild")
        );
        assert_eq!(find_title_link(listing, "Midsommar"), None);
        assert_eq!(find_title_link(listing, "  "), None);
    }

    #[test]
    fn pdf_link_preferred_over_inline_text() {
        let page = format!(
            r#"<html><body>{VERIFIED}<a href="/scripts/Joker.PDF">Download</a>
            <pre>FOR EDUCATIONAL PURPOSES ONLY
            INT. ARKHAM</pre></body></html>"#
        );
        assert_eq!(
            inspect_page(&page, "tt7286456").unwrap(),
            PageContent::Document { href: "/scripts/Joker.PDF".into() }
        );
    }

    #[test]
    fn inline_text_after_first_marker() {
        let page = format!(
            "<html><body>{VERIFIED}<pre>Header\nFOR EDUCATIONAL PURPOSES ONLY\n\nINT. APARTMENT\nFOR EDUCATIONAL PURPOSES ONLY\nEND</pre></body></html>"
        );
        assert_eq!(
            inspect_page(&page, "tt7286456").unwrap(),
            PageContent::Inline("INT. APARTMENT\nFOR EDUCATIONAL PURPOSES ONLY\nEND".into())
        );
    }

    #[test]
    fn missing_marker_is_not_found() {
        let page = format!("<html><body>{VERIFIED}<p>Nothing here.</p></body></html>");
        assert_eq!(inspect_page(&page, "tt7286456"), Err(ScriptError::NotFound));
    }

    #[test]
    fn identity_must_match() {
        let page = format!("<html><body>{VERIFIED}</body></html>");
        assert!(matches!(
            inspect_page(&page, "tt2582802"),
            Err(ScriptError::IdentityMismatch { .. })
        ));

        let unlabeled = r#"<a href="https://www.imdb.com/title/tt7286456/">IMDb</a>"#;
        assert!(matches!(
            inspect_page(unlabeled, "tt7286456"),
            Err(ScriptError::IdentityMismatch { .. })
        ));
    }
}
