use std::path::PathBuf;

use thiserror::Error;

/// Why the summary locator produced no text. The display strings double as
/// the `{"error": ...}` sentinel record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SummaryError {
    #[error("no page found")]
    NoPageFound,

    #[error("no sections found")]
    NoSections,

    #[error("no relevant content found")]
    NoRelevantContent,

    #[error("no detailed content retrieved")]
    NoDetailedContent,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{key} must be {expected}, got {value:?}")]
    Invalid {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Error, Debug)]
pub enum VocabularyError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("trigger vocabulary is empty")]
    Empty,

    #[error("blank trigger label at position {0}")]
    BlankLabel(usize),

    #[error("duplicate trigger label: {0}")]
    Duplicate(String),
}

/// A trigger mapping that does not use exactly the vocabulary's key set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VocabularyViolation {
    #[error("missing {} trigger label(s): {}", .0.len(), .0.join(", "))]
    Missing(Vec<String>),

    #[error("unknown trigger label(s): {}", .0.join(", "))]
    Unknown(Vec<String>),
}
