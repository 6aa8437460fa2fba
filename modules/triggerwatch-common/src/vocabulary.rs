use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::{VocabularyError, VocabularyViolation};
use crate::types::TriggerMap;

/// File name of the vocabulary asset inside the data directory.
pub const VOCABULARY_FILE: &str = "trigger_vocabulary.json";

#[derive(Debug, Deserialize)]
struct VocabularyFile {
    version: u32,
    labels: Vec<String>,
}

/// The closed set of trigger labels, in canonical order.
///
/// Loaded once at startup and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerVocabulary {
    version: u32,
    labels: Vec<String>,
}

impl TriggerVocabulary {
    /// Build from labels, rejecting blanks and duplicates.
    pub fn from_labels(
        version: u32,
        labels: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<Self, VocabularyError> {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.is_empty() {
            return Err(VocabularyError::Empty);
        }

        let mut seen = HashSet::new();
        for (position, label) in labels.iter().enumerate() {
            if label.trim().is_empty() {
                return Err(VocabularyError::BlankLabel(position));
            }
            if !seen.insert(label.as_str()) {
                return Err(VocabularyError::Duplicate(label.clone()));
            }
        }

        Ok(Self { version, labels })
    }

    pub fn load(path: &Path) -> Result<Self, VocabularyError> {
        let raw = std::fs::read_to_string(path).map_err(|source| VocabularyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: VocabularyFile =
            serde_json::from_str(&raw).map_err(|source| VocabularyError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let vocabulary = Self::from_labels(file.version, file.labels)?;
        info!(
            path = %path.display(),
            version = vocabulary.version,
            labels = vocabulary.len(),
            "Loaded trigger vocabulary"
        );
        Ok(vocabulary)
    }

    pub fn load_from_dir(data_dir: &Path) -> Result<Self, VocabularyError> {
        Self::load(&data_dir.join(VOCABULARY_FILE))
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// Check that `map` uses exactly this key set. Missing labels are
    /// reported before unknown ones.
    pub fn validate(&self, map: &TriggerMap) -> Result<(), VocabularyViolation> {
        let missing: Vec<String> = self
            .labels
            .iter()
            .filter(|label| !map.contains_key(label.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(VocabularyViolation::Missing(missing));
        }

        let unknown: Vec<String> = map
            .keys()
            .filter(|key| !self.contains(key))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(VocabularyViolation::Unknown(unknown));
        }

        Ok(())
    }

    /// JSON object of `map` in vocabulary order. Labels absent from `map`
    /// are skipped; callers validate first when completeness matters.
    pub fn ordered_json(&self, map: &TriggerMap) -> serde_json::Value {
        let ordered: serde_json::Map<String, serde_json::Value> = self
            .labels
            .iter()
            .filter_map(|label| {
                map.get(label)
                    .map(|p| (label.clone(), serde_json::Value::from(p.as_u8())))
            })
            .collect();
        serde_json::Value::Object(ordered)
    }
}
