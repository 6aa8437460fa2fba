use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Decode error: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

/// Why a script source produced no text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("no script found")]
    NotFound,

    #[error("candidate page does not reference {expected}")]
    IdentityMismatch { expected: String },

    #[error("script document missing at {url}")]
    DocumentMissing { url: String },

    #[error("no text could be extracted from {url}")]
    NoText { url: String },

    #[error(transparent)]
    Transport(#[from] FetchError),
}

impl ScriptError {
    /// True for every "no document" outcome; false for transport failures.
    pub fn is_not_found(&self) -> bool {
        !matches!(self, ScriptError::Transport(_))
    }
}
