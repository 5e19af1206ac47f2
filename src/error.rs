use thiserror::Error;

use crate::models::BatchResult;

#[derive(Debug, Error)]
pub enum NanoError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Invocation error: {0}")]
    InvocationError(String),

    #[error("Content blocked ({reason}){}", fmt_model_text(.text))]
    ContentBlocked { reason: String, text: Option<String> },

    #[error("no image in response{}", fmt_model_text(.text))]
    NoImage { text: Option<String> },

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("No model generated an image: {detail}")]
    NoModelSucceeded {
        tried: Vec<String>,
        detail: String,
        last_attempt: Option<Box<BatchResult>>,
    },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

fn fmt_model_text(text: &Option<String>) -> String {
    match text {
        Some(text) => format!(" - model said: {}", text),
        None => String::new(),
    }
}

impl NanoError {
    /// Plan-level failures the unit executor absorbs by moving to the next plan.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            NanoError::InvocationError(_)
                | NanoError::ContentBlocked { .. }
                | NanoError::NoImage { .. }
                | NanoError::SerializationError(_)
        )
    }

    /// Text the model sent back alongside a failed attempt, if any.
    pub fn model_text(&self) -> Option<&str> {
        match self {
            NanoError::ContentBlocked { text, .. } | NanoError::NoImage { text } => text.as_deref(),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            NanoError::ConfigError(_) => "CONFIG_ERROR",
            NanoError::ValidationError(_) => "VALIDATION_ERROR",
            NanoError::EncodingError(_) => "ENCODING_ERROR",
            NanoError::InvocationError(_) => "INVOCATION_ERROR",
            NanoError::ContentBlocked { .. } => "CONTENT_BLOCKED",
            NanoError::NoImage { .. } => "NO_IMAGE",
            NanoError::ModelUnavailable(_) => "MODEL_UNAVAILABLE",
            NanoError::NoModelSucceeded { .. } => "NO_MODEL_SUCCEEDED",
            NanoError::SerializationError(_) => "SERIALIZATION_ERROR",
            NanoError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<serde_json::Error> for NanoError {
    fn from(e: serde_json::Error) -> Self {
        NanoError::SerializationError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NanoError>;
