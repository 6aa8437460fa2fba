use std::collections::HashMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use triggerwatch_common::SectionRef;

use crate::error::FetchError;

/// Wikidata property holding IMDb identifiers.
const IMDB_PROPERTY: &str = "P345";
const ENWIKI: &str = "enwiki";

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

// --- Encyclopedia trait ---

/// The four lookups the summary locator needs from a knowledge source.
#[async_trait]
pub trait Encyclopedia: Send + Sync {
    /// Exact cross-reference: canonical page title bound to an external id.
    async fn page_for_external_id(&self, external_id: &str) -> Result<Option<String>, FetchError>;

    /// Free-text search. Titles in rank order.
    async fn search(&self, query: &str) -> Result<Vec<String>, FetchError>;

    /// Ordered section index of a page.
    async fn sections(&self, page_title: &str) -> Result<Vec<SectionRef>, FetchError>;

    /// Rendered markup of one section.
    async fn section_html(&self, page_title: &str, index: u32) -> Result<String, FetchError>;
}

// --- Wire types ---

#[derive(Debug, Default, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    query: Option<SearchQuery>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Default, Deserialize)]
struct EntitiesResponse {
    #[serde(default)]
    entities: HashMap<String, Entity>,
}

#[derive(Debug, Default, Deserialize)]
struct Entity {
    #[serde(default)]
    sitelinks: HashMap<String, SiteLink>,
}

#[derive(Debug, Deserialize)]
struct SiteLink {
    title: String,
}

#[derive(Debug, Default, Deserialize)]
struct ParseResponse {
    #[serde(default)]
    parse: Option<ParsedPage>,
}

#[derive(Debug, Default, Deserialize)]
struct ParsedPage {
    #[serde(default)]
    sections: Vec<WireSection>,
    #[serde(default)]
    text: Option<ParsedText>,
}

#[derive(Debug, Deserialize)]
struct WireSection {
    #[serde(default)]
    index: String,
    #[serde(default)]
    line: String,
}

#[derive(Debug, Default, Deserialize)]
struct ParsedText {
    #[serde(rename = "*", default)]
    html: String,
}

// --- Wikipedia + Wikidata ---

pub struct WikipediaClient {
    http: reqwest::Client,
    wikipedia_api_url: String,
    wikidata_api_url: String,
}

impl WikipediaClient {
    pub fn new(
        http: reqwest::Client,
        wikipedia_api_url: impl Into<String>,
        wikidata_api_url: impl Into<String>,
    ) -> Self {
        Self {
            http,
            wikipedia_api_url: wikipedia_api_url.into(),
            wikidata_api_url: wikidata_api_url.into(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        api_url: &str,
        params: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        let resp = self
            .http
            .get(api_url)
            .query(&[("format", "json"), ("formatversion", "1")])
            .query(params)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: api_url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(resp.json().await?)
    }

    /// Wikidata item id (e.g. `Q62095476`) holding `external_id` under P345.
    async fn item_for_external_id(&self, external_id: &str) -> Result<Option<String>, FetchError> {
        let statement = format!("haswbstatement:{IMDB_PROPERTY}={external_id}");
        let response: QueryResponse = self
            .get_json(
                &self.wikidata_api_url,
                &[
                    ("action", "query"),
                    ("list", "search"),
                    ("srsearch", &statement),
                    ("srlimit", "1"),
                ],
            )
            .await?;

        Ok(response
            .query
            .and_then(|q| q.search.into_iter().next())
            .map(|hit| hit.title))
    }
}

#[async_trait]
impl Encyclopedia for WikipediaClient {
    async fn page_for_external_id(&self, external_id: &str) -> Result<Option<String>, FetchError> {
        let Some(item) = self.item_for_external_id(external_id).await? else {
            debug!(external_id, "No Wikidata item for external id");
            return Ok(None);
        };

        let response: EntitiesResponse = self
            .get_json(
                &self.wikidata_api_url,
                &[
                    ("action", "wbgetentities"),
                    ("ids", &item),
                    ("props", "sitelinks"),
                    ("sitefilter", ENWIKI),
                ],
            )
            .await?;

        Ok(response
            .entities
            .into_values()
            .find_map(|mut entity| entity.sitelinks.remove(ENWIKI))
            .map(|link| link.title))
    }

    async fn search(&self, query: &str) -> Result<Vec<String>, FetchError> {
        let response: QueryResponse = self
            .get_json(
                &self.wikipedia_api_url,
                &[("action", "query"), ("list", "search"), ("srsearch", query)],
            )
            .await?;

        Ok(response
            .query
            .map(|q| q.search.into_iter().map(|hit| hit.title).collect())
            .unwrap_or_default())
    }

    async fn sections(&self, page_title: &str) -> Result<Vec<SectionRef>, FetchError> {
        let response: ParseResponse = self
            .get_json(
                &self.wikipedia_api_url,
                &[
                    ("action", "parse"),
                    ("page", page_title),
                    ("prop", "sections"),
                    ("redirects", "1"),
                ],
            )
            .await?;

        let sections = response.parse.map(|p| p.sections).unwrap_or_default();
        Ok(sections
            .into_iter()
            .filter_map(|s| match s.index.parse::<u32>() {
                Ok(index) => Some(SectionRef {
                    index,
                    heading: TAG_RE.replace_all(&s.line, "").trim().to_string(),
                }),
                // Transcluded sections carry indexes like "T-1" and cannot be fetched by number.
                Err(_) => {
                    debug!(page_title, index = %s.index, "Skipping non-numeric section index");
                    None
                }
            })
            .collect())
    }

    async fn section_html(&self, page_title: &str, index: u32) -> Result<String, FetchError> {
        let section = index.to_string();
        let response: ParseResponse = self
            .get_json(
                &self.wikipedia_api_url,
                &[
                    ("action", "parse"),
                    ("page", page_title),
                    ("section", &section),
                    ("prop", "text"),
                    ("redirects", "1"),
                ],
            )
            .await?;

        Ok(response
            .parse
            .and_then(|p| p.text)
            .map(|t| t.html)
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_sections_payload() {
        let payload = r#"{"parse": {"title": "Joker (2019 film)", "sections": [
            {"toclevel": 1, "line": "Plot", "index": "1"},
            {"toclevel": 1, "line": "<i>Joker</i> themes", "index": "2"},
            {"toclevel": 1, "line": "Transcluded", "index": "T-1"}
        ]}}"#;
        let response: ParseResponse = serde_json::from_str(payload).unwrap();
        let sections = response.parse.unwrap().sections;
        assert_eq!(sections.len(), 3);
        assert_eq!(TAG_RE.replace_all(&sections[1].line, ""), "Joker themes");
        assert!(sections[2].index.parse::<u32>().is_err());
    }

    #[test]
    fn parse_section_text_payload() {
        let payload = r#"{"parse": {"title": "Whiplash", "text": {"*": "<p>Andrew drums.</p>"}}}"#;
        let response: ParseResponse = serde_json::from_str(payload).unwrap();
        assert_eq!(response.parse.unwrap().text.unwrap().html, "<p>Andrew drums.</p>");
    }

    #[test]
    fn missing_page_parses_to_nothing() {
        let payload = r#"{"error": {"code": "missingtitle", "info": "The page you specified doesn't exist."}}"#;
        let response: ParseResponse = serde_json::from_str(payload).unwrap();
        assert!(response.parse.is_none());
    }

    #[test]
    fn entity_sitelinks_payload() {
        let payload = r#"{"entities": {"Q62095476": {"type": "item", "id": "Q62095476",
            "sitelinks": {"enwiki": {"site": "enwiki", "title": "Joker (2019 film)", "badges": []}}}}}"#;
        let response: EntitiesResponse = serde_json::from_str(payload).unwrap();
        let title = response
            .entities
            .into_values()
            .find_map(|mut e| e.sitelinks.remove(ENWIKI))
            .map(|l| l.title);
        assert_eq!(title.as_deref(), Some("Joker (2019 film)"));
    }
}
