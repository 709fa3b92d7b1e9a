//! HTTP client for generative model providers

use crate::config::GenAiConfig;
use crate::genai::{GenAiError, GenAiResult, GenerativeModel, ImageSize, LLMProvider};
use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// 1x1 PNG returned by the mock provider
const MOCK_IMAGE_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

const MOCK_ANSWER: &str = "Employees are entitled to 20 days of paid annual leave per year.";

/// Client for text and image generation
pub struct GenAiClient {
    client: Client,
    config: GenAiConfig,
    api_base_url: String,
}

impl GenAiClient {
    pub fn new(config: &GenAiConfig) -> GenAiResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenAiError::ConfigError(e.to_string()))?;

        let api_base_url = config.api_base_url.clone().unwrap_or_else(|| {
            match config.provider {
                LLMProvider::Gemini => "https://generativelanguage.googleapis.com/v1beta".to_string(),
                LLMProvider::OpenAI => "https://api.openai.com/v1".to_string(),
                LLMProvider::Ollama => "http://localhost:11434".to_string(),
                LLMProvider::Mock => String::new(),
            }
        });

        info!("Generation client using {:?} ({})", config.provider, config.model);

        Ok(Self {
            client,
            config: config.clone(),
            api_base_url,
        })
    }

    pub fn provider(&self) -> &LLMProvider {
        &self.config.provider
    }

    fn api_key(&self) -> GenAiResult<&str> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| GenAiError::ConfigError(format!("{:?} requires API key", self.config.provider)))
    }

    async fn gemini_text(&self, prompt: &str) -> GenAiResult<String> {
        #[derive(Serialize)]
        struct Request {
            contents: Vec<Content>,
            #[serde(rename = "generationConfig")]
            generation_config: GenerationConfig,
        }

        #[derive(Serialize, Deserialize)]
        struct Content {
            role: Option<String>,
            parts: Vec<Part>,
        }

        #[derive(Serialize, Deserialize)]
        struct Part {
            #[serde(default)]
            text: String,
        }

        #[derive(Serialize)]
        struct GenerationConfig {
            temperature: f32,
        }

        #[derive(Deserialize)]
        struct Response {
            candidates: Option<Vec<Candidate>>,
        }

        #[derive(Deserialize)]
        struct Candidate {
            content: Content,
        }

        let api_key = self.api_key()?;
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.api_base_url, self.config.model, api_key
        );

        let resp = self
            .client
            .post(&url)
            .json(&Request {
                contents: vec![Content {
                    role: Some("user".to_string()),
                    parts: vec![Part { text: prompt.to_string() }],
                }],
                generation_config: GenerationConfig {
                    temperature: self.config.temperature,
                },
            })
            .send()
            .await
            .map_err(|e| GenAiError::NetworkError(e.to_string()))?;

        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(GenAiError::ApiError(format!("Gemini error: {}", text)));
        }

        let result: Response = resp
            .json()
            .await
            .map_err(|e| GenAiError::SerializationError(e.to_string()))?;

        let text = result
            .candidates
            .unwrap_or_default()
            .into_iter()
            .next()
            .map(|c| c.content.parts.into_iter().map(|p| p.text).collect::<String>())
            .unwrap_or_default();

        Ok(text)
    }

    async fn gemini_image(&self, prompt: &str, size: ImageSize) -> GenAiResult<Option<String>> {
        #[derive(Serialize)]
        struct Request<'a> {
            contents: Vec<RequestContent<'a>>,
            #[serde(rename = "generationConfig")]
            generation_config: GenerationConfig<'a>,
        }

        #[derive(Serialize)]
        struct RequestContent<'a> {
            role: &'a str,
            parts: Vec<RequestPart<'a>>,
        }

        #[derive(Serialize)]
        struct RequestPart<'a> {
            text: &'a str,
        }

        #[derive(Serialize)]
        struct GenerationConfig<'a> {
            #[serde(rename = "responseModalities")]
            response_modalities: [&'a str; 2],
            #[serde(rename = "imageConfig")]
            image_config: ImageConfig<'a>,
        }

        #[derive(Serialize)]
        struct ImageConfig<'a> {
            #[serde(rename = "aspectRatio")]
            aspect_ratio: &'a str,
            #[serde(rename = "imageSize")]
            image_size: &'a str,
        }

        #[derive(Deserialize)]
        struct Response {
            candidates: Option<Vec<Candidate>>,
        }

        #[derive(Deserialize)]
        struct Candidate {
            content: Option<ResponseContent>,
        }

        #[derive(Deserialize)]
        struct ResponseContent {
            #[serde(default)]
            parts: Vec<ResponsePart>,
        }

        #[derive(Deserialize)]
        struct ResponsePart {
            #[serde(rename = "inlineData")]
            inline_data: Option<InlineData>,
        }

        #[derive(Deserialize)]
        struct InlineData {
            #[serde(rename = "mimeType")]
            mime_type: String,
            data: String,
        }

        let api_key = self.api_key()?;
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.api_base_url, self.config.image_model, api_key
        );

        let resp = self
            .client
            .post(&url)
            .json(&Request {
                contents: vec![RequestContent {
                    role: "user",
                    parts: vec![RequestPart { text: prompt }],
                }],
                generation_config: GenerationConfig {
                    response_modalities: ["TEXT", "IMAGE"],
                    image_config: ImageConfig {
                        aspect_ratio: "1:1",
                        image_size: size.as_str(),
                    },
                },
            })
            .send()
            .await
            .map_err(|e| GenAiError::NetworkError(e.to_string()))?;

        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(GenAiError::ApiError(format!("Gemini error: {}", text)));
        }

        let result: Response = resp
            .json()
            .await
            .map_err(|e| GenAiError::SerializationError(e.to_string()))?;

        let image = result
            .candidates
            .unwrap_or_default()
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .find_map(|p| p.inline_data)
            .map(|d| data_uri(&d.mime_type, &d.data));

        if image.is_none() {
            debug!("Gemini returned no inline image data");
        }

        Ok(image)
    }

    async fn openai_text(&self, prompt: &str) -> GenAiResult<String> {
        #[derive(Serialize)]
        struct Message<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Serialize)]
        struct Request<'a> {
            model: &'a str,
            messages: Vec<Message<'a>>,
            temperature: f32,
        }

        #[derive(Deserialize)]
        struct Response {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: MessageContent,
        }

        #[derive(Deserialize)]
        struct MessageContent {
            content: Option<String>,
        }

        let api_key = self.api_key()?;
        let url = format!("{}/chat/completions", self.api_base_url);
        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&Request {
                model: &self.config.model,
                messages: vec![Message { role: "user", content: prompt }],
                temperature: self.config.temperature,
            })
            .send()
            .await
            .map_err(|e| GenAiError::NetworkError(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(GenAiError::ApiError(format!("OpenAI error: {}", resp.status())));
        }

        let result: Response = resp
            .json()
            .await
            .map_err(|e| GenAiError::SerializationError(e.to_string()))?;
        Ok(result
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }

    async fn ollama_text(&self, prompt: &str) -> GenAiResult<String> {
        #[derive(Serialize)]
        struct Request<'a> {
            model: &'a str,
            prompt: &'a str,
            stream: bool,
        }

        #[derive(Deserialize)]
        struct Response {
            response: String,
        }

        let url = format!("{}/api/generate", self.api_base_url);
        let resp = self
            .client
            .post(&url)
            .json(&Request {
                model: &self.config.model,
                prompt,
                stream: false,
            })
            .send()
            .await
            .map_err(|e| GenAiError::NetworkError(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(GenAiError::ApiError(format!("Ollama error: {}", resp.status())));
        }

        let result: Response = resp
            .json()
            .await
            .map_err(|e| GenAiError::SerializationError(e.to_string()))?;
        Ok(result.response)
    }
}

#[async_trait]
impl GenerativeModel for GenAiClient {
    async fn generate_text(&self, prompt: &str) -> GenAiResult<String> {
        match self.config.provider {
            LLMProvider::Gemini => self.gemini_text(prompt).await,
            LLMProvider::OpenAI => self.openai_text(prompt).await,
            LLMProvider::Ollama => self.ollama_text(prompt).await,
            LLMProvider::Mock => Ok(MOCK_ANSWER.to_string()),
        }
    }

    async fn generate_image(&self, prompt: &str, size: ImageSize) -> GenAiResult<Option<String>> {
        match self.config.provider {
            LLMProvider::Gemini => self.gemini_image(prompt, size).await,
            LLMProvider::Mock => Ok(Some(data_uri("image/png", MOCK_IMAGE_BASE64))),
            _ => Err(GenAiError::ConfigError(format!(
                "Provider {:?} does not support image generation",
                self.config.provider
            ))),
        }
    }
}

/// Self-contained `data:` URI for base64 image bytes
pub fn data_uri(mime_type: &str, base64_data: &str) -> String {
    format!("data:{};base64,{}", mime_type, base64_data)
}

/// Decode the bytes carried by a `data:<mime>;base64,<payload>` URI
pub fn decode_data_uri(uri: &str) -> GenAiResult<Vec<u8>> {
    let (header, payload) = uri
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(','))
        .ok_or_else(|| GenAiError::SerializationError("Not a data URI".to_string()))?;
    if !header.ends_with(";base64") {
        return Err(GenAiError::SerializationError(format!(
            "Unsupported data URI encoding: {}",
            header
        )));
    }
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| GenAiError::SerializationError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(provider: LLMProvider) -> GenAiConfig {
        GenAiConfig {
            provider,
            api_key: None,
            ..GenAiConfig::default()
        }
    }

    #[tokio::test]
    async fn test_mock_provider_answers_offline() {
        let client = GenAiClient::new(&config(LLMProvider::Mock)).unwrap();
        let text = client.generate_text("anything").await.unwrap();
        assert!(text.contains("20 days"));

        let image = client.generate_image("a cat", ImageSize::TwoK).await.unwrap().unwrap();
        assert!(image.starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn test_gemini_without_key_is_config_error() {
        let client = GenAiClient::new(&config(LLMProvider::Gemini)).unwrap();
        let err = client.generate_text("hello").await.unwrap_err();
        assert!(matches!(err, GenAiError::ConfigError(_)));

        let err = client.generate_image("a cat", ImageSize::OneK).await.unwrap_err();
        assert!(matches!(err, GenAiError::ConfigError(_)));
    }

    #[tokio::test]
    async fn test_text_only_provider_rejects_images() {
        let client = GenAiClient::new(&config(LLMProvider::Ollama)).unwrap();
        let err = client.generate_image("a cat", ImageSize::OneK).await.unwrap_err();
        assert!(err.to_string().contains("does not support image generation"));
    }

    #[test]
    fn test_data_uri() {
        assert_eq!(data_uri("image/jpeg", "AAAA"), "data:image/jpeg;base64,AAAA");
    }

    #[test]
    fn test_decode_data_uri() {
        let bytes = decode_data_uri(&data_uri("image/png", MOCK_IMAGE_BASE64)).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

        assert!(decode_data_uri("iVBORw0KGgo=").is_err());
        assert!(decode_data_uri("data:text/plain,hello").is_err());
        assert!(decode_data_uri("data:image/png;base64,!!!").is_err());
    }
}
