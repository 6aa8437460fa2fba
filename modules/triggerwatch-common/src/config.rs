use std::env;
use std::path::PathBuf;

use tracing::info;

use crate::error::ConfigError;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-pro-preview-03-25";
pub const DEFAULT_WIKIPEDIA_API_URL: &str = "https://en.wikipedia.org/w/api.php";
pub const DEFAULT_WIKIDATA_API_URL: &str = "https://www.wikidata.org/w/api.php";
pub const DEFAULT_MAX_SCRIPT_CHARS: usize = 120_000;
pub const DEFAULT_MAX_SUMMARY_CHARS: usize = 20_000;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Generative backend
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: Option<String>,

    // Reference data
    pub data_dir: PathBuf,

    // Sources
    pub wikipedia_api_url: String,
    pub wikidata_api_url: String,
    pub user_agent: String,

    // Prompt caps
    pub max_script_chars: usize,
    pub max_summary_chars: usize,
}

impl Config {
    /// Load configuration from the process environment. The backend key is
    /// optional here; [`Config::require_gemini_key`] enforces it where needed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            gemini_api_key: non_empty("GEMINI_API_KEY"),
            gemini_model: non_empty("GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_base_url: non_empty("GEMINI_BASE_URL"),
            data_dir: non_empty("TRIGGERWATCH_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data")),
            wikipedia_api_url: non_empty("WIKIPEDIA_API_URL")
                .unwrap_or_else(|| DEFAULT_WIKIPEDIA_API_URL.to_string()),
            wikidata_api_url: non_empty("WIKIDATA_API_URL")
                .unwrap_or_else(|| DEFAULT_WIKIDATA_API_URL.to_string()),
            user_agent: non_empty("HTTP_USER_AGENT")
                .unwrap_or_else(|| format!("triggerwatch/{}", env!("CARGO_PKG_VERSION"))),
            max_script_chars: parse_usize(
                "MAX_SCRIPT_CHARS",
                non_empty("MAX_SCRIPT_CHARS"),
                DEFAULT_MAX_SCRIPT_CHARS,
            )?,
            max_summary_chars: parse_usize(
                "MAX_SUMMARY_CHARS",
                non_empty("MAX_SUMMARY_CHARS"),
                DEFAULT_MAX_SUMMARY_CHARS,
            )?,
        })
    }

    /// The backend credential. Its absence is fatal for classification only.
    pub fn require_gemini_key(&self) -> Result<&str, ConfigError> {
        self.gemini_api_key
            .as_deref()
            .ok_or(ConfigError::Missing("GEMINI_API_KEY"))
    }

    pub fn log_redacted(&self) {
        info!(
            gemini_key_set = self.gemini_api_key.is_some(),
            gemini_model = %self.gemini_model,
            gemini_base_url = self.gemini_base_url.as_deref().unwrap_or("default"),
            data_dir = %self.data_dir.display(),
            wikipedia_api_url = %self.wikipedia_api_url,
            wikidata_api_url = %self.wikidata_api_url,
            max_script_chars = self.max_script_chars,
            max_summary_chars = self.max_summary_chars,
            "Configuration loaded"
        );
    }
}

fn parse_usize(
    key: &'static str,
    value: Option<String>,
    default: usize,
) -> Result<usize, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(ConfigError::Invalid {
                key,
                expected: "a positive integer",
                value: raw,
            }),
        },
    }
}
