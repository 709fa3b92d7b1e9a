//! Fake generation providers shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use rag_explorer::genai::{GenAiError, GenAiResult, GenerativeModel, ImageSize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// What a fake returns from `generate_image`
#[derive(Clone)]
pub enum ImageReply {
    Data(String),
    Empty,
    Fail,
}

/// Replies immediately with fixed results
pub struct ScriptedModel {
    pub answer: Option<String>,
    pub image: ImageReply,
    pub prompts: std::sync::Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: Some(answer.to_string()),
            image: ImageReply::Data("data:image/png;base64,AAAA".to_string()),
            prompts: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Every call fails
    pub fn failing() -> Self {
        Self {
            answer: None,
            image: ImageReply::Fail,
            prompts: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn with_image(mut self, image: ImageReply) -> Self {
        self.image = image;
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    async fn generate_text(&self, prompt: &str) -> GenAiResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.answer
            .clone()
            .ok_or_else(|| GenAiError::NetworkError("provider unreachable".to_string()))
    }

    async fn generate_image(&self, _prompt: &str, _size: ImageSize) -> GenAiResult<Option<String>> {
        match &self.image {
            ImageReply::Data(d) => Ok(Some(d.clone())),
            ImageReply::Empty => Ok(None),
            ImageReply::Fail => Err(GenAiError::ApiError("quota exceeded".to_string())),
        }
    }
}

/// Holds every answer until the test releases it
pub struct GatedModel {
    pub gate: Arc<Notify>,
    calls: AtomicUsize,
}

impl GatedModel {
    pub fn new() -> Self {
        Self {
            gate: Arc::new(Notify::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerativeModel for GatedModel {
    async fn generate_text(&self, _prompt: &str) -> GenAiResult<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.gate.notified().await;
        Ok(format!("answer #{}", n))
    }

    async fn generate_image(&self, _prompt: &str, _size: ImageSize) -> GenAiResult<Option<String>> {
        self.gate.notified().await;
        Ok(Some("data:image/png;base64,AAAA".to_string()))
    }
}
