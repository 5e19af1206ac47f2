use serde::Serialize;

use super::{InlineImage, Modality};
use crate::error::{NanoError, Result};

/// One parameter combination to try against a model.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GenerationPlan {
    pub temperature: f64,
    pub seed: Option<u32>,
    pub modalities: Vec<Modality>,
}

/// What a single model call produced once the response was normalized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvocationOutcome {
    pub image: Option<InlineImage>,
    pub text: Option<String>,
}

impl InvocationOutcome {
    pub fn with_image(image: InlineImage) -> Self {
        Self {
            image: Some(image),
            text: None,
        }
    }

    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            image: None,
            text: Some(text.into()),
        }
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    /// The image, or a `NoImage` error carrying whatever text came back instead.
    pub fn into_image(self) -> Result<InlineImage> {
        match self.image {
            Some(image) => Ok(image),
            None => Err(NanoError::NoImage { text: self.text }),
        }
    }
}
