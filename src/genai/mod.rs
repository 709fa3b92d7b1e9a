//! Generative model boundary
//!
//! The playback controller only needs two things from a model provider: a
//! short text answer and, for the image studio, a rendered image. Both go
//! through the [`GenerativeModel`] trait so the provider can be swapped for
//! a fake in tests.

pub mod client;

pub use client::GenAiClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, error};

/// Generation errors
#[derive(Error, Debug)]
pub enum GenAiError {
    /// API error from the provider
    #[error("LLM API error: {0}")]
    ApiError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Network error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Serialization/Deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type GenAiResult<T> = Result<T, GenAiError>;

/// Logged instead of an answer when the provider call fails
pub const ANSWER_ERROR_TEXT: &str = "Error generating response from the language model. Check logs.";

/// Returned when the provider answers with no text
pub const EMPTY_ANSWER_TEXT: &str = "No response generated.";

/// Supported model providers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LLMProvider {
    Gemini,
    OpenAI,
    Ollama,
    /// Offline canned responses
    Mock,
}

/// Image resolution tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ImageSize {
    #[default]
    #[serde(rename = "1K")]
    OneK,
    #[serde(rename = "2K")]
    TwoK,
    #[serde(rename = "4K")]
    FourK,
}

impl ImageSize {
    pub const ALL: [ImageSize; 3] = [ImageSize::OneK, ImageSize::TwoK, ImageSize::FourK];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::OneK => "1K",
            ImageSize::TwoK => "2K",
            ImageSize::FourK => "4K",
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageSize {
    type Err = GenAiError;

    fn from_str(s: &str) -> GenAiResult<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "1K" => Ok(ImageSize::OneK),
            "2K" => Ok(ImageSize::TwoK),
            "4K" => Ok(ImageSize::FourK),
            other => Err(GenAiError::ConfigError(format!("Unsupported image size: {}", other))),
        }
    }
}

/// A text and image generating model
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Complete a prompt
    async fn generate_text(&self, prompt: &str) -> GenAiResult<String>;

    /// Render an image as a `data:` URI; `Ok(None)` when the provider returned no image
    async fn generate_image(&self, prompt: &str, size: ImageSize) -> GenAiResult<Option<String>>;
}

/// Build the retrieval-augmented prompt for a query
pub fn answer_prompt(query: &str, context: &str) -> String {
    format!(
        "You are an AI assistant in a RAG pipeline simulation.\n\n\
         Context retrieved from Vector DB:\n{}\n\n\
         User Query: {}\n\n\
         Please provide a concise answer (max 2 sentences) based strictly on the context.",
        context, query
    )
}

/// Answer a query from a context passage
///
/// Never fails: provider errors become [`ANSWER_ERROR_TEXT`].
pub async fn generate_answer(model: &dyn GenerativeModel, query: &str, context: &str) -> String {
    let prompt = answer_prompt(query, context);
    debug!("Requesting answer for query: {}", query);
    match model.generate_text(&prompt).await {
        Ok(text) if text.trim().is_empty() => EMPTY_ANSWER_TEXT.to_string(),
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            error!("Answer generation failed: {}", e);
            ANSWER_ERROR_TEXT.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(GenAiResult<String>);

    #[async_trait]
    impl GenerativeModel for Fixed {
        async fn generate_text(&self, _prompt: &str) -> GenAiResult<String> {
            match &self.0 {
                Ok(s) => Ok(s.clone()),
                Err(e) => Err(GenAiError::ApiError(e.to_string())),
            }
        }

        async fn generate_image(&self, _prompt: &str, _size: ImageSize) -> GenAiResult<Option<String>> {
            Ok(None)
        }
    }

    #[test]
    fn test_prompt_contains_query_and_context() {
        let prompt = answer_prompt("what is the vacation policy?", "20 days of leave");
        assert!(prompt.contains("User Query: what is the vacation policy?"));
        assert!(prompt.contains("20 days of leave"));
        assert!(prompt.contains("max 2 sentences"));
    }

    #[tokio::test]
    async fn test_answer_is_trimmed() {
        let model = Fixed(Ok("  You get 20 days.\n".to_string()));
        assert_eq!(generate_answer(&model, "q", "c").await, "You get 20 days.");
    }

    #[tokio::test]
    async fn test_empty_answer_placeholder() {
        let model = Fixed(Ok("   ".to_string()));
        assert_eq!(generate_answer(&model, "q", "c").await, EMPTY_ANSWER_TEXT);
    }

    #[tokio::test]
    async fn test_failure_becomes_error_text() {
        let model = Fixed(Err(GenAiError::NetworkError("connection refused".to_string())));
        assert_eq!(generate_answer(&model, "q", "c").await, ANSWER_ERROR_TEXT);
    }

    #[test]
    fn test_image_size_parsing() {
        assert_eq!("2k".parse::<ImageSize>().unwrap(), ImageSize::TwoK);
        assert_eq!(ImageSize::FourK.to_string(), "4K");
        assert!("8K".parse::<ImageSize>().is_err());
        assert_eq!(serde_json::to_string(&ImageSize::OneK).unwrap(), "\"1K\"");
    }
}
