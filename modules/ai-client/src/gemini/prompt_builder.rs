use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::traits::PromptBuilder;

use super::types::*;
use super::Gemini;

pub struct GeminiPromptBuilder {
    agent: Gemini,
    input: String,
    preamble: Option<String>,
    temperature: Option<f32>,
    json: bool,
}

impl GeminiPromptBuilder {
    pub(crate) fn new(agent: Gemini, input: String) -> Self {
        Self {
            agent,
            input,
            preamble: None,
            temperature: None,
            json: false,
        }
    }

    fn build_request(&self) -> GenerateRequest {
        let mut request = GenerateRequest::new();

        if let Some(temp) = self.temperature {
            request = request.temperature(temp);
        }
        if self.json {
            request = request.json_response();
        }
        if let Some(preamble) = self.preamble.as_deref().filter(|p| !p.trim().is_empty()) {
            request = request.system(preamble);
        }
        if !self.input.is_empty() {
            request = request.contents([Content::user(&self.input)]);
        }

        request
    }
}

#[async_trait]
impl PromptBuilder for GeminiPromptBuilder {
    fn preamble(mut self, preamble: impl Into<String>) -> Self {
        self.preamble = Some(preamble.into());
        self
    }

    fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    fn json_response(mut self) -> Self {
        self.json = true;
        self
    }

    async fn send(self) -> Result<String> {
        let request = self.build_request();
        if request.contents.is_empty() {
            return Err(anyhow!("Gemini prompt has no user content"));
        }

        let response = self
            .agent
            .client()
            .generate(&self.agent.model, &request)
            .await?;

        debug!(
            finish_reason = response.finish_reason().unwrap_or("unknown"),
            "Gemini prompt complete"
        );

        Ok(response.text().unwrap_or_default())
    }
}
