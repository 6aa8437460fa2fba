use std::sync::Arc;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use triggerwatch_common::{normalize_external_id, MovieQuery, Script};

use super::{fetch_document_text, resolve, ScriptSource};
use crate::error::ScriptError;
use crate::fetcher::WebFetcher;

pub const DAILYSCRIPT_LISTING_URLS: [&str; 2] = [
    "https://www.dailyscript.com/movie.html",
    "https://www.dailyscript.com/movie_n-z.html",
];
pub const DAILYSCRIPT_SITE_URL: &str = "https://www.dailyscript.com/";

/// Source B: listing rows pair an IMDb link with the screenplay link.
pub struct DailyScriptCatalog {
    fetcher: Arc<dyn WebFetcher>,
    listing_urls: Vec<String>,
    site_url: String,
}

impl DailyScriptCatalog {
    pub fn new(fetcher: Arc<dyn WebFetcher>) -> Self {
        Self::with_urls(fetcher, DAILYSCRIPT_LISTING_URLS, DAILYSCRIPT_SITE_URL)
    }

    pub fn with_urls<I, S>(fetcher: Arc<dyn WebFetcher>, listing_urls: I, site_url: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fetcher,
            listing_urls: listing_urls.into_iter().map(Into::into).collect(),
            site_url: site_url.into(),
        }
    }
}

#[async_trait]
impl ScriptSource for DailyScriptCatalog {
    fn name(&self) -> &str {
        "dailyscript.com"
    }

    async fn find_script(&self, query: &MovieQuery) -> Result<Script, ScriptError> {
        let Some(target) = normalize_external_id(&query.external_id) else {
            debug!(external_id = query.external_id.as_str(), "Unusable external id");
            return Err(ScriptError::NotFound);
        };

        for listing_url in &self.listing_urls {
            let listing = self.fetcher.get(listing_url).await?.text();
            let Some(href) = find_script_link(&listing, &target) else {
                continue;
            };

            let doc_url = resolve(&self.site_url, &href)?;
            let text = fetch_document_text(self.fetcher.as_ref(), &doc_url).await?;
            return Ok(Script {
                source: self.name().to_string(),
                url: doc_url,
                text,
            });
        }

        Err(ScriptError::NotFound)
    }
}

/// Normalized IMDb id embedded in a link, for both
/// `imdb.com/title/tt0298203/` and `imdb.com/Title?0298203`.
pub fn imdb_id_from_href(href: &str) -> Option<String> {
    let lower = href.to_ascii_lowercase();
    let rest = if let Some(idx) = lower.find("imdb.com/title/") {
        &lower[idx + "imdb.com/title/".len()..]
    } else if let Some(idx) = lower.find("imdb.com/title?") {
        &lower[idx + "imdb.com/title?".len()..]
    } else {
        return None;
    };

    let id = rest.split(['/', '?', '&', '#']).next().unwrap_or(rest);
    normalize_external_id(id)
}

/// href of the document link that shares a parent element with the IMDb
/// link for `target`. First matching row wins.
fn find_script_link(html: &str, target: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").ok()?;

    for link in document.select(&selector) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        if imdb_id_from_href(href).as_deref() != Some(target) {
            continue;
        }

        let Some(parent) = link.parent().and_then(ElementRef::wrap) else {
            continue;
        };
        let sibling = parent
            .select(&selector)
            .filter(|other| other.id() != link.id())
            .filter_map(|other| other.value().attr("href"))
            .map(str::trim)
            .find(|h| !h.is_empty());
        if let Some(sibling) = sibling {
            return Some(sibling.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn imdb_ids_from_both_href_shapes() {
        assert_eq!(
            imdb_id_from_href("http://www.imdb.com/title/tt0298203/").as_deref(),
            Some("tt0298203")
        );
        assert_eq!(
            imdb_id_from_href("https://imdb.com/title/tt2582802?ref_=fn").as_deref(),
            Some("tt2582802")
        );
        assert_eq!(
            imdb_id_from_href("http://us.imdb.com/Title?0109040").as_deref(),
            Some("tt0109040")
        );
        assert_eq!(imdb_id_from_href("http://www.imdb.com/name/nm0000123/"), None);
        assert_eq!(imdb_id_from_href("scripts/joker.pdf"), None);
    }

    #[test]
    fn sibling_link_in_same_row() {
        let html = r#"<ul>
            <li><a href="scripts/alien.html">Alien</a> <a href="http://www.imdb.com/title/tt0078748/">(IMDb)</a></li>
            <li><a href="scripts/8mile.pdf">8 Mile</a> <a href="http://us.imdb.com/Title?0298203">(IMDb)</a></li>
        </ul>"#;
        assert_eq!(find_script_link(html, "tt0298203").as_deref(), Some("scripts/8mile.pdf"));
        assert_eq!(find_script_link(html, "tt0078748").as_deref(), Some("scripts/alien.html"));
        assert_eq!(find_script_link(html, "tt9999999"), None);
    }

    #[test]
    fn row_without_document_link_is_skipped() {
        let html = r#"<p><a href="http://www.imdb.com/title/tt0298203/">lonely</a></p>
            <p><a href="scripts/8mile.html">8 Mile</a><a href="http://www.imdb.com/title/tt0298203/">IMDb</a></p>"#;
        assert_eq!(find_script_link(html, "tt0298203").as_deref(), Some("scripts/8mile.html"));
    }
}
