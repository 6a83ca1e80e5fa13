use crate::config::PersistMode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Text,
    Audio,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Text => "text",
            Self::Audio => "audio",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "image" => Some(Self::Image),
            "text" => Some(Self::Text),
            "audio" => Some(Self::Audio),
            _ => None,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A prompt that passed validation, scoped to a single HTTP call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub media_type: MediaType,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field `prompt`")]
    MissingPrompt,

    #[error("Invalid field `type`")]
    InvalidType,
}

impl GenerationRequest {
    /// Validates a raw JSON body. `prompt` must be a non-empty string and
    /// `type` one of the `enabled` media types. The prompt is checked first.
    pub fn from_json(
        body: &Value,
        enabled: &[MediaType],
    ) -> std::result::Result<Self, ValidationError> {
        let prompt = body
            .get("prompt")
            .and_then(Value::as_str)
            .filter(|prompt| !prompt.is_empty())
            .ok_or(ValidationError::MissingPrompt)?;

        let media_type = body
            .get("type")
            .and_then(Value::as_str)
            .and_then(MediaType::parse)
            .filter(|media_type| enabled.contains(media_type))
            .ok_or(ValidationError::InvalidType)?;

        Ok(Self {
            prompt: prompt.to_string(),
            media_type,
        })
    }
}

/// A finished generation, ready to be sent back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Generated {
    pub media_type: MediaType,
    pub response: Value,
}

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to run model")]
    Inference(#[source] crate::Error),

    #[error("{message}")]
    Persistence {
        message: &'static str,
        #[source]
        source: crate::Error,
    },
}

impl GenerationError {
    pub fn persistence(mode: PersistMode, source: crate::Error) -> Self {
        Self::Persistence {
            message: mode.failure_message(),
            source,
        }
    }
}
