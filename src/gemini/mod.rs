pub mod image_client;
pub mod response;

use crate::{
    config::GeminiConfig,
    error::{NanoError, Result},
    generation::ModelInvoker,
};
use reqwest::Client;
use std::sync::Arc;

pub use image_client::ImageClient;
pub use response::{normalize, ResponseFamily, ResponseNormalizer};

#[derive(Clone)]
pub struct GeminiClient {
    image_client: ImageClient,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| NanoError::ConfigError("Missing GEMINI_API_KEY".into()))?;

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| NanoError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            image_client: ImageClient::new(client, config.base_url.clone(), api_key),
        })
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }

    /// The image client as a shareable invoker for the orchestrator.
    pub fn invoker(&self) -> Arc<dyn ModelInvoker> {
        Arc::new(self.image_client.clone())
    }

    pub fn supported_models() -> Vec<(&'static str, &'static str)> {
        vec![
            ("gemini-3-pro-image-preview", "Nano Banana Pro (preview)"),
            ("gemini-2.5-flash-image", "Nano Banana"),
            ("gemini-2.5-flash-image-preview", "Nano Banana (preview)"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_a_configuration_error() {
        let err = GeminiClient::new(&GeminiConfig::new()).err().unwrap();
        assert!(matches!(err, NanoError::ConfigError(_)));
    }

    #[test]
    fn key_builds_a_client() {
        let client = GeminiClient::new(&GeminiConfig::new().with_api_key("k")).unwrap();
        assert!(client.image().endpoint("x").ends_with("/v1beta/models/x:generateContent"));
    }

    #[test]
    fn base_url_override_reaches_the_endpoint() {
        let config = GeminiConfig::new()
            .with_api_key("k")
            .with_base_url("http://127.0.0.1:8089/");
        let client = GeminiClient::new(&config).unwrap();
        assert_eq!(
            client.image().endpoint("gemini-2.5-flash-image"),
            "http://127.0.0.1:8089/v1beta/models/gemini-2.5-flash-image:generateContent"
        );
    }

    #[test]
    fn default_candidates_are_known_models() {
        let known: Vec<&str> = GeminiClient::supported_models()
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        for candidate in crate::config::DEFAULT_MODEL_CANDIDATES {
            assert!(known.contains(&candidate), "{} missing", candidate);
        }
    }
}
