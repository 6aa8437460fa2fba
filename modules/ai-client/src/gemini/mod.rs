mod client;
pub mod prompt_builder;
pub(crate) mod types;

pub use prompt_builder::GeminiPromptBuilder;

use crate::traits::Agent;

use client::GeminiClient;

pub const DEFAULT_MODEL: &str = "gemini-2.5-pro-preview-03-25";

// =============================================================================
// Gemini Agent
// =============================================================================

#[derive(Clone)]
pub struct Gemini {
    api_key: String,
    pub(crate) model: String,
    base_url: Option<String>,
}

impl Gemini {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub(crate) fn client(&self) -> GeminiClient {
        let client = GeminiClient::new(&self.api_key);
        if let Some(ref url) = self.base_url {
            client.with_base_url(url)
        } else {
            client
        }
    }
}

// =============================================================================
// Agent Implementation
// =============================================================================

impl Agent for Gemini {
    type PromptBuilder = GeminiPromptBuilder;

    fn prompt(&self, input: impl Into<String>) -> GeminiPromptBuilder {
        GeminiPromptBuilder::new(self.clone(), input.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemini_new() {
        let ai = Gemini::new("g-test", DEFAULT_MODEL);
        assert_eq!(ai.model(), "gemini-2.5-pro-preview-03-25");
        assert_eq!(ai.api_key(), "g-test");
        assert!(ai.base_url.is_none());
    }

    #[test]
    fn test_gemini_with_base_url() {
        let ai = Gemini::new("g-test", DEFAULT_MODEL).with_base_url("http://localhost:9999/v1beta");
        assert_eq!(ai.base_url.as_deref(), Some("http://localhost:9999/v1beta"));
    }
}
