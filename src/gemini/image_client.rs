use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;

use super::response;
use crate::{
    error::{NanoError, Result},
    generation::ModelInvoker,
    models::{GenerationPlan, InlineImage, InvocationOutcome},
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: &'a InlineImage,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u32>,
    response_modalities: Vec<&'static str>,
}

/// Calls `models/{model}:generateContent` with reference images attached.
#[derive(Clone)]
pub struct ImageClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ImageClient {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }

    fn build_request<'a>(
        prompt: &'a str,
        images: &'a [InlineImage],
        plan: &GenerationPlan,
    ) -> GenerateContentRequest<'a> {
        let mut parts = Vec::with_capacity(images.len() + 1);
        parts.push(Part::Text { text: prompt });
        parts.extend(images.iter().map(|inline_data| Part::InlineData { inline_data }));

        GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts,
            }],
            generation_config: GenerationConfig {
                temperature: plan.temperature,
                seed: plan.seed,
                response_modalities: plan.modalities.iter().map(|m| m.as_str()).collect(),
            },
        }
    }
}

#[async_trait]
impl ModelInvoker for ImageClient {
    async fn invoke(
        &self,
        model: &str,
        prompt: &str,
        images: &[InlineImage],
        plan: &GenerationPlan,
    ) -> Result<InvocationOutcome> {
        let request = Self::build_request(prompt, images, plan);

        log::debug!(
            "Invoking image model: {} (seed: {:?}, modalities: {:?})",
            model,
            plan.seed,
            plan.modalities
        );

        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| NanoError::InvocationError(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::NOT_FOUND => {
                    NanoError::ModelUnavailable(format!("{}: {}", model, error_message(&body)))
                }
                StatusCode::TOO_MANY_REQUESTS => NanoError::InvocationError(format!(
                    "quota exceeded: {}",
                    error_message(&body)
                )),
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => NanoError::InvocationError(
                    format!("API key rejected ({}): {}", status, error_message(&body)),
                ),
                _ => NanoError::InvocationError(format!(
                    "Gemini API error {}: {}",
                    status,
                    error_message(&body)
                )),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| NanoError::SerializationError(format!("Failed to parse Gemini response: {}", e)))?;

        response::normalize(&body)
    }
}

/// Pull `error.message` out of an error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(Value::as_str)
                .map(String::from)
        })
        .unwrap_or_else(|| body.trim().to_string())
}
