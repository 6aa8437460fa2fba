// Summary locator: movie identity → description page → relevant sections → cleaned text.

pub mod clean;
mod encyclopedia;

pub use clean::{clean_section_text, section_html_to_text};
pub use encyclopedia::{Encyclopedia, WikipediaClient};

use std::sync::Arc;

use tracing::{info, warn};

use triggerwatch_common::{MovieQuery, Section, SectionRef, Summary, SummaryError, SummaryResult};

/// Section headings containing any of these (case-insensitive) are narrative content.
pub const RELEVANT_KEYWORDS: &[&str] = &["plot", "synopsis", "theme", "analysis", "story", "overview"];

/// Sections whose heading mentions a relevant keyword, in page order.
pub fn filter_relevant_sections(sections: &[SectionRef]) -> Vec<SectionRef> {
    sections
        .iter()
        .filter(|s| {
            let heading = s.heading.to_lowercase();
            RELEVANT_KEYWORDS.iter().any(|kw| heading.contains(kw))
        })
        .cloned()
        .collect()
}

pub struct SummaryLocator {
    encyclopedia: Arc<dyn Encyclopedia>,
}

impl SummaryLocator {
    pub fn new(encyclopedia: Arc<dyn Encyclopedia>) -> Self {
        Self { encyclopedia }
    }

    pub async fn summarize(&self, query: &MovieQuery) -> SummaryResult {
        self.get_summary(
            &query.title,
            query.director.as_deref(),
            Some(query.external_id.as_str()),
        )
        .await
    }

    /// Each stage short-circuits with its own [`SummaryError`]. Transport
    /// failures count as "not found" for the stage they occur in.
    pub async fn get_summary(
        &self,
        title: &str,
        director: Option<&str>,
        external_id: Option<&str>,
    ) -> SummaryResult {
        let page = self
            .resolve_page(title, director, external_id)
            .await
            .ok_or(SummaryError::NoPageFound)?;

        let sections = match self.encyclopedia.sections(&page).await {
            Ok(sections) => sections,
            Err(e) => {
                warn!(page = page.as_str(), error = %e, "Section index fetch failed");
                Vec::new()
            }
        };
        if sections.is_empty() {
            return Err(SummaryError::NoSections);
        }

        let relevant = filter_relevant_sections(&sections);
        if relevant.is_empty() {
            info!(page = page.as_str(), sections = sections.len(), "No narrative sections");
            return Err(SummaryError::NoRelevantContent);
        }

        let mut fetched = Vec::with_capacity(relevant.len());
        for section in relevant {
            match self.encyclopedia.section_html(&page, section.index).await {
                Ok(raw_html) => fetched.push(Section {
                    index: section.index,
                    heading: section.heading,
                    raw_html,
                }),
                Err(e) => warn!(
                    page = page.as_str(),
                    section = section.index,
                    error = %e,
                    "Section content fetch failed"
                ),
            }
        }

        let summary: Summary = fetched
            .into_iter()
            .map(|s| (s.heading, section_html_to_text(&s.raw_html)))
            .collect();

        if summary.is_empty() {
            return Err(SummaryError::NoDetailedContent);
        }

        info!(
            page = page.as_str(),
            sections = summary.len(),
            "Summary extracted"
        );
        Ok(summary)
    }

    /// Cross-reference by external id first; free-text search only when that yields nothing.
    pub async fn resolve_page(
        &self,
        title: &str,
        director: Option<&str>,
        external_id: Option<&str>,
    ) -> Option<String> {
        if let Some(external_id) = external_id.filter(|id| !id.trim().is_empty()) {
            match self.encyclopedia.page_for_external_id(external_id.trim()).await {
                Ok(Some(page)) => {
                    info!(external_id, page = page.as_str(), "Resolved page by cross-reference");
                    return Some(page);
                }
                Ok(None) => info!(external_id, "No cross-reference record, falling back to search"),
                Err(e) => warn!(external_id, error = %e, "Cross-reference lookup failed"),
            }
        }

        let query = match director.filter(|d| !d.trim().is_empty()) {
            Some(director) => format!("{title} {director}"),
            None => title.to_string(),
        };

        match self.encyclopedia.search(&query).await {
            Ok(hits) => {
                let page = hits.into_iter().next();
                match &page {
                    Some(p) => info!(query = query.as_str(), page = p.as_str(), "Resolved page by search"),
                    None => info!(query = query.as_str(), "Search returned no hits"),
                }
                page
            }
            Err(e) => {
                warn!(query = query.as_str(), error = %e, "Page search failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(index: u32, heading: &str) -> SectionRef {
        SectionRef {
            index,
            heading: heading.to_string(),
        }
    }

    #[test]
    fn keeps_narrative_sections_in_order() {
        let sections = vec![
            section(1, "Plot"),
            section(2, "Cast"),
            section(3, "Themes and analysis"),
            section(4, "Production"),
            section(5, "Backstory"),
            section(6, "PLOT OVERVIEW"),
        ];
        let kept: Vec<u32> = filter_relevant_sections(&sections)
            .iter()
            .map(|s| s.index)
            .collect();
        assert_eq!(kept, vec![1, 3, 5, 6]);
    }

    #[test]
    fn relevance_filter_is_idempotent() {
        let sections = vec![
            section(1, "Synopsis"),
            section(2, "Reception"),
            section(3, "Story"),
            section(4, "References"),
        ];
        let once = filter_relevant_sections(&sections);
        assert_eq!(filter_relevant_sections(&once), once);
        assert!(filter_relevant_sections(&[]).is_empty());
    }
}
