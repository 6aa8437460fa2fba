use std::path::PathBuf;

use thiserror::Error;

use triggerwatch_common::{VocabularyError, VocabularyViolation};

#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("generative backend failed: {0:#}")]
    Backend(anyhow::Error),

    /// The response held no parseable trigger object. `raw` is the backend text.
    #[error("malformed classifier response: {reason}")]
    Malformed { raw: String, reason: String },
}

/// Failures loading the worked examples. All of them are fatal at startup.
#[derive(Error, Debug)]
pub enum ReferenceError {
    #[error(transparent)]
    Vocabulary(#[from] VocabularyError),

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

    #[error("expected {expected} worked examples, found {found}")]
    Count { expected: usize, found: usize },

    #[error("worked example {title:?} has invalid labels: {violation}")]
    Labels {
        title: String,
        violation: VocabularyViolation,
    },
}
