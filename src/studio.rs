//! Image studio
//!
//! Independent of scenario playback. A request is split into `begin`
//! (validates, marks the studio busy, logs the request) and `finish`
//! (records the outcome, clears busy) so the provider call can run without
//! holding the session.

use crate::genai::client::decode_data_uri;
use crate::genai::{GenAiError, GenAiResult, ImageSize};
use crate::playback::ConsoleLog;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};

pub const IMAGE_SUCCESS_LINE: &str = "Image generation successful.";
pub const IMAGE_EMPTY_LINE: &str = "Image generation failed or no data returned.";
pub const IMAGE_ERROR_LINE: &str = "Error generating image.";

/// Studio errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StudioError {
    #[error("Image prompt is empty")]
    EmptyPrompt,

    #[error("An image request is already in progress")]
    Busy,
}

pub type StudioResult<T> = Result<T, StudioError>;

/// Errors writing a generated image to disk
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Invalid image data: {0}")]
    Decode(#[from] GenAiError),

    #[error("Failed to write image: {0}")]
    Io(#[from] std::io::Error),
}

/// An accepted image request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub prompt: String,
    pub size: ImageSize,
}

/// Busy flag and last generated artifact
#[derive(Debug, Default)]
pub struct ImageStudio {
    busy: bool,
    image: Option<String>,
}

/// Render-ready studio state
#[derive(Debug, Clone, Serialize)]
pub struct StudioView {
    pub busy: bool,
    pub has_image: bool,
}

impl ImageStudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Last generated image as a `data:` URI
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// Whether the trigger is enabled for this prompt
    pub fn can_generate(&self, prompt: &str) -> bool {
        !self.busy && !prompt.trim().is_empty()
    }

    pub fn begin(&mut self, prompt: &str, size: ImageSize, console: &ConsoleLog) -> StudioResult<ImageRequest> {
        if prompt.trim().is_empty() {
            return Err(StudioError::EmptyPrompt);
        }
        if self.busy {
            return Err(StudioError::Busy);
        }

        self.busy = true;
        self.image = None;
        console.push(format!("Generating {} image for prompt: \"{}\"...", size, prompt));
        info!("Image request accepted ({})", size);

        Ok(ImageRequest {
            prompt: prompt.to_string(),
            size,
        })
    }

    /// Record the provider outcome; logs exactly one line
    pub fn finish(&mut self, outcome: GenAiResult<Option<String>>, console: &ConsoleLog) {
        self.busy = false;
        match outcome {
            Ok(Some(image)) => {
                self.image = Some(image);
                console.push(IMAGE_SUCCESS_LINE);
            }
            Ok(None) => console.push(IMAGE_EMPTY_LINE),
            Err(e) => {
                error!("Image generation failed: {}", e);
                console.push(IMAGE_ERROR_LINE);
            }
        }
    }

    pub fn view(&self) -> StudioView {
        StudioView {
            busy: self.busy,
            has_image: self.image.is_some(),
        }
    }
}

/// Write the decoded bytes of a `data:` URI image to `path`, returning the byte count
pub fn save_image(image: &str, path: &Path) -> Result<usize, ExportError> {
    let bytes = decode_data_uri(image)?;
    std::fs::write(path, &bytes)?;
    info!("Saved {} byte image to {}", bytes.len(), path.display());
    Ok(bytes.len())
}
