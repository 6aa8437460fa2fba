use anyhow::Result;
use async_trait::async_trait;

// =============================================================================
// Agent Trait
// =============================================================================

/// A configured model endpoint. Each prompt is a single-turn request.
pub trait Agent: Clone + Send + Sync {
    type PromptBuilder: PromptBuilder;

    fn prompt(&self, input: impl Into<String>) -> Self::PromptBuilder;
}

// =============================================================================
// PromptBuilder Trait
// =============================================================================

#[async_trait]
pub trait PromptBuilder: Send + Sized {
    /// System instruction sent alongside the user input.
    fn preamble(self, preamble: impl Into<String>) -> Self;
    fn temperature(self, temperature: f32) -> Self;
    /// Ask the provider for a JSON-typed text response. Not schema-enforced.
    fn json_response(self) -> Self;
    async fn send(self) -> Result<String>;
}
