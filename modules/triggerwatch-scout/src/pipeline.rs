// Movie analysis pipeline: summary → script → classify → vocabulary check.
//
// Every stage records its own outcome. A missing summary or script never
// aborts the run; the classifier works with whatever context exists.

use serde_json::{json, Value};
use thiserror::Error;
use tracing::{info, warn};

use triggerwatch_classifier::{ClassifyError, TriggerClassifier};
use triggerwatch_common::{
    summary_to_json, MovieQuery, Script, SummaryResult, TriggerMap, TriggerVocabulary,
    VocabularyViolation,
};
use triggerwatch_sources::{ScriptError, ScriptLocator, SummaryLocator};

/// Why an analysis has no trigger mapping.
#[derive(Error, Debug)]
pub enum TriggerFailure {
    #[error(transparent)]
    Classify(#[from] ClassifyError),

    #[error("classifier output rejected: {0}")]
    Vocabulary(#[from] VocabularyViolation),
}

/// Per-movie report.
#[derive(Debug)]
pub struct MovieAnalysis {
    pub query: MovieQuery,
    pub summary: SummaryResult,
    pub script: Result<Script, ScriptError>,
    pub triggers: Result<TriggerMap, TriggerFailure>,
}

impl MovieAnalysis {
    /// Report JSON. `triggers` is `null` on any classification failure, with
    /// the reason under `triggers_error`.
    pub fn to_json(&self, vocabulary: &TriggerVocabulary) -> Value {
        let script = match &self.script {
            Ok(script) => json!({
                "source": script.source,
                "url": script.url,
                "characters": script.text.chars().count(),
            }),
            Err(e) => json!({ "error": e.to_string() }),
        };

        let mut report = json!({
            "title": self.query.title,
            "external_id": self.query.external_id,
            "director": self.query.director,
            "summary": summary_to_json(&self.summary),
            "script": script,
            "triggers": Value::Null,
        });

        match &self.triggers {
            Ok(map) => report["triggers"] = vocabulary.ordered_json(map),
            Err(e) => report["triggers_error"] = Value::String(e.to_string()),
        }
        report
    }
}

pub struct MovieAnalyzer {
    summaries: SummaryLocator,
    scripts: ScriptLocator,
    classifier: TriggerClassifier,
    vocabulary: TriggerVocabulary,
}

impl MovieAnalyzer {
    pub fn new(
        summaries: SummaryLocator,
        scripts: ScriptLocator,
        classifier: TriggerClassifier,
        vocabulary: TriggerVocabulary,
    ) -> Self {
        Self {
            summaries,
            scripts,
            classifier,
            vocabulary,
        }
    }

    pub fn vocabulary(&self) -> &TriggerVocabulary {
        &self.vocabulary
    }

    pub async fn analyze(&self, query: &MovieQuery) -> MovieAnalysis {
        info!(
            title = query.title.as_str(),
            external_id = query.external_id.as_str(),
            "Analyzing movie"
        );

        let summary = self.summaries.summarize(query).await;
        if let Err(e) = &summary {
            warn!(title = query.title.as_str(), reason = %e, "Continuing without summary");
        }

        let script = self.scripts.get_script(query).await;
        if let Err(e) = &script {
            warn!(title = query.title.as_str(), reason = %e, "Continuing without script");
        }

        let triggers = match self
            .classifier
            .classify(&query.title, &summary, script.as_ref().ok())
            .await
        {
            Ok(map) => match self.vocabulary.validate(&map) {
                Ok(()) => Ok(map),
                Err(violation) => {
                    warn!(title = query.title.as_str(), %violation, "Classifier output violates vocabulary");
                    Err(TriggerFailure::Vocabulary(violation))
                }
            },
            Err(e) => Err(TriggerFailure::Classify(e)),
        };

        info!(
            title = query.title.as_str(),
            summary = summary.is_ok(),
            script = script.is_ok(),
            triggers = triggers.is_ok(),
            "Analysis complete"
        );

        MovieAnalysis {
            query: query.clone(),
            summary,
            script,
            triggers,
        }
    }
}
