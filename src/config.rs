//! Explorer configuration
//!
//! Loaded from a YAML file (path in `RAG_EXPLORER_CONFIG`), then patched
//! from the environment. Every section has defaults so an empty file or no
//! file at all yields a working configuration.

use crate::genai::LLMProvider;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Environment variable naming the YAML config file
pub const CONFIG_PATH_ENV: &str = "RAG_EXPLORER_CONFIG";

/// Passage handed to the language model at the generation step
pub const DEFAULT_ANSWER_CONTEXT: &str = "Company Vacation Policy: Employees are entitled to 20 days of paid annual leave. Sick leave is 10 days per year.";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Generative model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenAiConfig {
    /// Provider serving both text and image calls
    pub provider: LLMProvider,
    /// Text model name
    pub model: String,
    /// Image model name
    pub image_model: String,
    /// API key (falls back to `GEMINI_API_KEY` / `API_KEY`)
    pub api_key: Option<String>,
    /// API base URL override
    pub api_base_url: Option<String>,
    pub temperature: f32,
    /// Per-request timeout
    pub timeout_secs: u64,
}

impl Default for GenAiConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::Gemini,
            model: "gemini-3-flash-preview".to_string(),
            image_model: "gemini-3-pro-image-preview".to_string(),
            api_key: None,
            api_base_url: None,
            temperature: 0.2,
            timeout_secs: 60,
        }
    }
}

/// Playback controller settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Drop answers that resolve after the session was restarted or reset
    pub discard_stale_answers: bool,
    /// Retrieved passage sent with the user's query
    pub answer_context: String,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            discard_stale_answers: true,
            answer_context: DEFAULT_ANSWER_CONTEXT.to_string(),
        }
    }
}

/// HTTP API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    pub genai: GenAiConfig,
    pub playback: PlaybackConfig,
    pub http: HttpConfig,
}

impl ExplorerConfig {
    /// Parse a YAML document
    pub fn from_yaml(text: &str) -> ConfigResult<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Read a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        info!("Loaded configuration from {}", path.display());
        Self::from_yaml(&text)
    }

    /// Load from `RAG_EXPLORER_CONFIG` if set, then apply environment overrides
    pub fn load() -> ConfigResult<Self> {
        let config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };
        config.with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `GEMINI_API_KEY`/`API_KEY` and `RAG_EXPLORER_PORT` from a variable lookup
    pub fn with_env_overrides<F>(mut self, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.genai.api_key.is_none() {
            self.genai.api_key = lookup("GEMINI_API_KEY").or_else(|| lookup("API_KEY"));
        }

        if let Some(port) = lookup("RAG_EXPLORER_PORT") {
            self.http.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                key: "RAG_EXPLORER_PORT".to_string(),
                value: port.clone(),
            })?;
        }

        if self.genai.api_key.is_none() && self.genai.provider != LLMProvider::Mock {
            warn!("No API key configured; generation calls to {:?} will fail", self.genai.provider);
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = ExplorerConfig::from_yaml("").unwrap();
        assert_eq!(config.genai.provider, LLMProvider::Gemini);
        assert!(config.playback.discard_stale_answers);
        assert_eq!(config.http.port, 8080);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = ExplorerConfig::from_yaml(
            "genai:\n  provider: Mock\nplayback:\n  discard_stale_answers: false\n",
        )
        .unwrap();
        assert_eq!(config.genai.provider, LLMProvider::Mock);
        assert_eq!(config.genai.model, "gemini-3-flash-preview");
        assert!(!config.playback.discard_stale_answers);
        assert_eq!(config.playback.answer_context, DEFAULT_ANSWER_CONTEXT);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "http:\n  port: 9090").unwrap();
        let config = ExplorerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.http.port, 9090);
        assert_eq!(config.http.bind, "127.0.0.1");
    }

    #[test]
    fn test_missing_file() {
        let err = ExplorerConfig::from_file("/nonexistent/rag-explorer.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let config = ExplorerConfig::default()
            .with_env_overrides(env(&[("API_KEY", "k1"), ("RAG_EXPLORER_PORT", "3000")]))
            .unwrap();
        assert_eq!(config.genai.api_key.as_deref(), Some("k1"));
        assert_eq!(config.http.port, 3000);

        let config = ExplorerConfig::default()
            .with_env_overrides(env(&[("API_KEY", "k1"), ("GEMINI_API_KEY", "k2")]))
            .unwrap();
        assert_eq!(config.genai.api_key.as_deref(), Some("k2"));
    }

    #[test]
    fn test_explicit_key_wins_over_env() {
        let mut config = ExplorerConfig::default();
        config.genai.api_key = Some("file".to_string());
        let config = config.with_env_overrides(env(&[("GEMINI_API_KEY", "env")])).unwrap();
        assert_eq!(config.genai.api_key.as_deref(), Some("file"));
    }

    #[test]
    fn test_bad_port() {
        let err = ExplorerConfig::default()
            .with_env_overrides(env(&[("RAG_EXPLORER_PORT", "eighty")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
