// Test mocks for the source locators.
//
// Two mocks matching the two network trait boundaries:
// - MockFetcher (WebFetcher): HashMap-based URL→body, with a request log
// - MockEncyclopedia (Encyclopedia): HashMap-based lookups, with a call log

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use triggerwatch_common::SectionRef;

use crate::error::FetchError;
use crate::fetcher::{FetchedDocument, WebFetcher};
use crate::summary::Encyclopedia;

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

/// HashMap-based fetcher. Unregistered URLs answer 404.
/// Builder pattern: `.on_page()`, `.on_status()`, `.on_head()`, `.on_error()`.
#[derive(Default)]
pub struct MockFetcher {
    pages: HashMap<String, Vec<u8>>,
    statuses: HashMap<String, u16>,
    heads: HashMap<String, u16>,
    errors: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_page(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.pages.insert(url.to_string(), body.into());
        self
    }

    /// GET on `url` fails with this HTTP status.
    pub fn on_status(mut self, url: &str, status: u16) -> Self {
        self.statuses.insert(url.to_string(), status);
        self
    }

    /// HEAD on `url` answers this status regardless of registered pages.
    pub fn on_head(mut self, url: &str, status: u16) -> Self {
        self.heads.insert(url.to_string(), status);
        self
    }

    /// Any request to `url` fails at the network level.
    pub fn on_error(mut self, url: &str, message: &str) -> Self {
        self.errors.insert(url.to_string(), message.to_string());
        self
    }

    /// Every request so far, as `"GET <url>"` / `"HEAD <url>"`.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requested(&self, method: &str, url: &str) -> bool {
        let entry = format!("{method} {url}");
        self.requests().iter().any(|r| *r == entry)
    }

    fn record(&self, method: &str, url: &str) {
        self.requests.lock().unwrap().push(format!("{method} {url}"));
    }
}

#[async_trait]
impl WebFetcher for MockFetcher {
    async fn get(&self, url: &str) -> Result<FetchedDocument, FetchError> {
        self.record("GET", url);
        if let Some(message) = self.errors.get(url) {
            return Err(FetchError::Network(message.clone()));
        }
        if let Some(&status) = self.statuses.get(url) {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }
        match self.pages.get(url) {
            Some(body) => Ok(FetchedDocument {
                url: url.to_string(),
                body: body.clone(),
            }),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }

    async fn head(&self, url: &str) -> Result<u16, FetchError> {
        self.record("HEAD", url);
        if let Some(message) = self.errors.get(url) {
            return Err(FetchError::Network(message.clone()));
        }
        if let Some(&status) = self.heads.get(url) {
            return Ok(status);
        }
        if let Some(&status) = self.statuses.get(url) {
            return Ok(status);
        }
        Ok(if self.pages.contains_key(url) { 200 } else { 404 })
    }
}

// ---------------------------------------------------------------------------
// MockEncyclopedia
// ---------------------------------------------------------------------------

/// In-memory knowledge source. Unknown pages have no sections; unknown
/// sections are a transport error.
#[derive(Default)]
pub struct MockEncyclopedia {
    by_external_id: HashMap<String, String>,
    searches: HashMap<String, Vec<String>>,
    sections: HashMap<String, Vec<SectionRef>>,
    section_html: HashMap<(String, u32), String>,
    failing_lookups: bool,
    calls: Mutex<Vec<String>>,
}

impl MockEncyclopedia {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_external_id(mut self, external_id: &str, page: &str) -> Self {
        self.by_external_id
            .insert(external_id.to_string(), page.to_string());
        self
    }

    pub fn on_search(mut self, query: &str, hits: &[&str]) -> Self {
        self.searches.insert(
            query.to_string(),
            hits.iter().map(|h| h.to_string()).collect(),
        );
        self
    }

    /// Register a page with `(heading, html)` sections, indexed from 1.
    pub fn on_page(mut self, page: &str, sections: &[(&str, &str)]) -> Self {
        let mut refs = Vec::new();
        for (i, (heading, html)) in sections.iter().enumerate() {
            let index = i as u32 + 1;
            refs.push(SectionRef {
                index,
                heading: heading.to_string(),
            });
            self.section_html
                .insert((page.to_string(), index), html.to_string());
        }
        self.sections.insert(page.to_string(), refs);
        self
    }

    /// Drop the content of one section so fetching it fails.
    pub fn without_section(mut self, page: &str, index: u32) -> Self {
        self.section_html.remove(&(page.to_string(), index));
        self
    }

    /// Cross-reference lookups fail at the transport level.
    pub fn failing_lookups(mut self) -> Self {
        self.failing_lookups = true;
        self
    }

    /// Calls so far, as `"<operation> <argument>"`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn searched(&self) -> bool {
        self.calls().iter().any(|c| c.starts_with("search "))
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Encyclopedia for MockEncyclopedia {
    async fn page_for_external_id(&self, external_id: &str) -> Result<Option<String>, FetchError> {
        self.record(format!("page_for_external_id {external_id}"));
        if self.failing_lookups {
            return Err(FetchError::Network("MockEncyclopedia: lookup unavailable".into()));
        }
        Ok(self.by_external_id.get(external_id).cloned())
    }

    async fn search(&self, query: &str) -> Result<Vec<String>, FetchError> {
        self.record(format!("search {query}"));
        Ok(self.searches.get(query).cloned().unwrap_or_default())
    }

    async fn sections(&self, page_title: &str) -> Result<Vec<SectionRef>, FetchError> {
        self.record(format!("sections {page_title}"));
        Ok(self.sections.get(page_title).cloned().unwrap_or_default())
    }

    async fn section_html(&self, page_title: &str, index: u32) -> Result<String, FetchError> {
        self.record(format!("section_html {page_title}#{index}"));
        self.section_html
            .get(&(page_title.to_string(), index))
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: format!("mock://{page_title}#{index}"),
                status: 404,
            })
    }
}
