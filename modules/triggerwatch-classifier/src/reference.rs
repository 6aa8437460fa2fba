// Worked examples: the fixed few-shot reference movies embedded in every
// classification prompt. Loaded once at startup and read-only afterwards.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use triggerwatch_common::{Summary, TriggerMap, TriggerVocabulary};
use triggerwatch_sources::extract_pdf_text;

use crate::error::ReferenceError;

pub const WORKED_EXAMPLES_FILE: &str = "worked_examples.json";
pub const EXPECTED_EXAMPLES: usize = 3;

#[derive(Debug, Deserialize)]
struct ExamplesFile {
    version: u32,
    examples: Vec<ExampleRecord>,
}

#[derive(Debug, Deserialize)]
struct ExampleRecord {
    title: String,
    #[serde(default)]
    director: Option<String>,
    external_id: String,
    summary: Summary,
    #[serde(default)]
    script_excerpt: String,
    /// Relative to the data directory.
    #[serde(default)]
    script_pdf: Option<PathBuf>,
    #[serde(deserialize_with = "triggerwatch_common::deserialize_trigger_map")]
    labels: TriggerMap,
}

/// One reference movie with its precomputed context and full label mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkedExample {
    pub title: String,
    pub director: Option<String>,
    pub external_id: String,
    pub summary: Summary,
    pub script: String,
    pub labels: TriggerMap,
}

/// Vocabulary plus worked examples, validated against each other.
#[derive(Debug, Clone)]
pub struct ReferenceSet {
    version: u32,
    vocabulary: TriggerVocabulary,
    examples: Vec<WorkedExample>,
}

impl ReferenceSet {
    /// Load both assets from `data_dir`.
    pub fn load(data_dir: &Path) -> Result<Self, ReferenceError> {
        let vocabulary = TriggerVocabulary::load_from_dir(data_dir)?;

        let path = data_dir.join(WORKED_EXAMPLES_FILE);
        let raw = fs::read_to_string(&path).map_err(|source| ReferenceError::Io {
            path: path.clone(),
            source,
        })?;
        let file: ExamplesFile =
            serde_json::from_str(&raw).map_err(|source| ReferenceError::Parse {
                path: path.clone(),
                source,
            })?;

        let examples = file
            .examples
            .into_iter()
            .map(|record| {
                let script = load_script(data_dir, &record);
                WorkedExample {
                    title: record.title,
                    director: record.director,
                    external_id: record.external_id,
                    summary: record.summary,
                    script,
                    labels: record.labels,
                }
            })
            .collect();

        let set = Self::from_parts(file.version, vocabulary, examples)?;
        info!(
            version = set.version,
            labels = set.vocabulary.len(),
            examples = set.examples.len(),
            "Reference data loaded"
        );
        Ok(set)
    }

    /// Exactly [`EXPECTED_EXAMPLES`] examples, each labeled over the full vocabulary.
    pub fn from_parts(
        version: u32,
        vocabulary: TriggerVocabulary,
        examples: Vec<WorkedExample>,
    ) -> Result<Self, ReferenceError> {
        if examples.len() != EXPECTED_EXAMPLES {
            return Err(ReferenceError::Count {
                expected: EXPECTED_EXAMPLES,
                found: examples.len(),
            });
        }
        for example in &examples {
            vocabulary
                .validate(&example.labels)
                .map_err(|violation| ReferenceError::Labels {
                    title: example.title.clone(),
                    violation,
                })?;
        }

        Ok(Self {
            version,
            vocabulary,
            examples,
        })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn vocabulary(&self) -> &TriggerVocabulary {
        &self.vocabulary
    }

    pub fn examples(&self) -> &[WorkedExample] {
        &self.examples
    }
}

/// Text of the example's screenplay PDF, or its inline excerpt when the PDF
/// is absent or unreadable.
fn load_script(data_dir: &Path, record: &ExampleRecord) -> String {
    let Some(relative) = &record.script_pdf else {
        return record.script_excerpt.clone();
    };
    let path = data_dir.join(relative);

    match fs::read(&path) {
        Ok(bytes) => {
            let text = extract_pdf_text(&bytes);
            if text.trim().is_empty() {
                warn!(title = record.title.as_str(), path = %path.display(), "No text in example script PDF, using excerpt");
                record.script_excerpt.clone()
            } else {
                text.trim().to_string()
            }
        }
        Err(e) => {
            warn!(title = record.title.as_str(), path = %path.display(), error = %e, "Example script PDF unreadable, using excerpt");
            record.script_excerpt.clone()
        }
    }
}
