use std::fmt::Write;

use ai_client::util::truncate_with_marker;

use triggerwatch_common::{Script, SummaryResult, TriggerVocabulary};

use crate::reference::{ReferenceSet, WorkedExample};

pub const NO_SCRIPT_PLACEHOLDER: &str = "(no script available)";

/// Per-source caps on text injected into the prompt, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptLimits {
    pub max_script_chars: usize,
    pub max_summary_chars: usize,
}

impl Default for PromptLimits {
    fn default() -> Self {
        Self {
            max_script_chars: triggerwatch_common::config::DEFAULT_MAX_SCRIPT_CHARS,
            max_summary_chars: triggerwatch_common::config::DEFAULT_MAX_SUMMARY_CHARS,
        }
    }
}

const PREAMBLE: &str = r#"You detect content triggers in movies for viewers with PTSD or trauma sensitivity.

For every trigger label you decide whether the event happens in the film, using the encyclopedia summary and the screenplay supplied with the movie, checked against your general knowledge of the film.

## Labeling Policy
- Mark a trigger 1 only when it is explicit in the supplied summary or script, or when it is extremely well established in widely accepted sources about the film.
- When unsure, mark 0. Do not guess.
- Never add, rename, or drop labels.

## Output
Return one JSON object mapping every trigger label to the integer 0 or 1, and nothing else.
The label set and order are exactly those used in the examples below.

Three worked examples follow. They show the expected format and labeling policy only; their content has no bearing on the movie you analyze."#;

const SELF_CHECK: &str = "After drafting the JSON, check every label you marked 1 against the summary and script above. \
Change any 1 that neither source supports to 0. Return only the final JSON object.";

/// Builds the system instruction once and the per-movie user message on demand.
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    system: String,
    limits: PromptLimits,
}

impl PromptAssembler {
    pub fn new(reference: &ReferenceSet, limits: PromptLimits) -> Self {
        Self {
            system: build_system_instruction(reference, limits),
            limits,
        }
    }

    pub fn system_instruction(&self) -> &str {
        &self.system
    }

    pub fn limits(&self) -> PromptLimits {
        self.limits
    }

    /// Target movie context only, plus the self-verification directive.
    pub fn user_message(&self, title: &str, summary: &SummaryResult, script: Option<&Script>) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Use ONLY the summary and script below to determine the triggers of {title}.");
        let _ = writeln!(out, "The examples in your instructions are for guidance only.\n");
        let _ = writeln!(out, "# Movie: {title}\n");
        let _ = writeln!(out, "## Summary\n{}\n", render_summary(summary, self.limits.max_summary_chars));
        let _ = writeln!(
            out,
            "## Script\n{}\n",
            render_script(script.map(|s| s.text.as_str()), self.limits.max_script_chars)
        );
        out.push_str(SELF_CHECK);
        out
    }
}

fn build_system_instruction(reference: &ReferenceSet, limits: PromptLimits) -> String {
    let mut out = String::from(PREAMBLE);
    for (i, example) in reference.examples().iter().enumerate() {
        out.push_str("\n\n---\n\n");
        render_example(&mut out, i + 1, example, reference.vocabulary(), limits);
    }
    out.push_str("\n\n---\n");
    out
}

fn render_example(
    out: &mut String,
    number: usize,
    example: &WorkedExample,
    vocabulary: &TriggerVocabulary,
    limits: PromptLimits,
) {
    let labels = serde_json::to_string_pretty(&vocabulary.ordered_json(&example.labels))
        .unwrap_or_else(|_| "{}".to_string());
    let summary = truncate_with_marker(&example.summary.render(), limits.max_summary_chars);

    let _ = writeln!(out, "## Example {number}: {}", example.title);
    if let Some(director) = &example.director {
        let _ = writeln!(out, "Director: {director}");
    }
    let _ = writeln!(out, "\n### Summary\n{summary}\n");
    let _ = writeln!(out, "### Script\n{}\n", render_script(Some(&example.script), limits.max_script_chars));
    let _ = write!(out, "### Triggers\n{labels}");
}

/// Capped `## heading` rendering, or a placeholder naming why there is none.
pub fn render_summary(summary: &SummaryResult, max_chars: usize) -> String {
    match summary {
        Ok(summary) if !summary.is_empty() => truncate_with_marker(&summary.render(), max_chars),
        Ok(_) => "(no summary available)".to_string(),
        Err(e) => format!("(no summary available: {e})"),
    }
}

pub fn render_script(script: Option<&str>, max_chars: usize) -> String {
    match script.map(str::trim) {
        Some(text) if !text.is_empty() => truncate_with_marker(text, max_chars),
        _ => NO_SCRIPT_PLACEHOLDER.to_string(),
    }
}
