use async_trait::async_trait;
use tracing::{info, warn};

use ai_client::{Agent, Gemini, PromptBuilder};
use triggerwatch_common::{Script, SummaryResult, TriggerMap};

use crate::error::ClassifyError;
use crate::prompt::PromptAssembler;
use crate::response::{extract_json_object, parse_trigger_response};

// --- GenerativeBackend trait ---

/// One system instruction plus one user message in, JSON-flavored text out.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    async fn generate(&self, system: &str, user: &str) -> anyhow::Result<String>;
}

#[async_trait]
impl GenerativeBackend for Gemini {
    async fn generate(&self, system: &str, user: &str) -> anyhow::Result<String> {
        self.prompt(user)
            .preamble(system)
            .temperature(0.0)
            .json_response()
            .send()
            .await
    }
}

// --- TriggerClassifier ---

pub struct TriggerClassifier {
    backend: Box<dyn GenerativeBackend>,
    prompts: PromptAssembler,
}

impl TriggerClassifier {
    pub fn new(backend: Box<dyn GenerativeBackend>, prompts: PromptAssembler) -> Self {
        Self { backend, prompts }
    }

    pub fn prompts(&self) -> &PromptAssembler {
        &self.prompts
    }

    /// One backend call, no retry. The result is not checked against the
    /// vocabulary; callers do that.
    pub async fn classify(
        &self,
        title: &str,
        summary: &SummaryResult,
        script: Option<&Script>,
    ) -> Result<TriggerMap, ClassifyError> {
        let user = self.prompts.user_message(title, summary, script);
        info!(
            title,
            has_summary = summary.is_ok(),
            has_script = script.is_some(),
            system_bytes = self.prompts.system_instruction().len(),
            user_bytes = user.len(),
            "Classifying triggers"
        );

        let raw = self
            .backend
            .generate(self.prompts.system_instruction(), &user)
            .await
            .map_err(ClassifyError::Backend)?;

        match parse_trigger_response(&raw) {
            Ok(map) => {
                let present = map.values().filter(|p| p.is_present()).count();
                info!(title, labels = map.len(), present, "Triggers classified");
                Ok(map)
            }
            Err(e) => {
                warn!(
                    title,
                    error = %e,
                    raw = raw.as_str(),
                    sliced = extract_json_object(&raw).unwrap_or(""),
                    "Malformed classifier response"
                );
                Err(e)
            }
        }
    }
}
