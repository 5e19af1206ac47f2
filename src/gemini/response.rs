//! Normalization of `generateContent` responses.
//!
//! Two envelope generations are seen in the wild: the current REST shape with camelCase keys at
//! the top level, and an older SDK shape that nests everything under `response` and uses
//! snake_case keys (sometimes with image bytes as a JSON byte array). Each gets its own
//! [`ResponseNormalizer`]; [`ResponseFamily::detect`] picks one from the envelope.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value;

use crate::{
    error::{NanoError, Result},
    models::{InlineImage, InvocationOutcome},
};

const DEFAULT_IMAGE_MIME: &str = "image/png";

/// Finish reasons that mean the model refused rather than merely returned no image.
const BLOCKING_FINISH_REASONS: [&str; 5] = [
    "SAFETY",
    "PROHIBITED_CONTENT",
    "IMAGE_SAFETY",
    "BLOCKLIST",
    "RECITATION",
];

pub trait ResponseNormalizer: Send + Sync {
    /// Extract the first inline image and any text fragments from a raw response body.
    fn normalize(&self, body: &Value) -> Result<InvocationOutcome>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFamily {
    Direct,
    Wrapped,
}

impl ResponseFamily {
    pub fn detect(body: &Value) -> Self {
        match body.get("response") {
            Some(inner) if inner.is_object() => ResponseFamily::Wrapped,
            _ => ResponseFamily::Direct,
        }
    }

    pub fn normalizer(&self) -> &'static dyn ResponseNormalizer {
        match self {
            ResponseFamily::Direct => &DirectEnvelope,
            ResponseFamily::Wrapped => &WrappedEnvelope,
        }
    }
}

/// Detect the envelope family and normalize with it.
pub fn normalize(body: &Value) -> Result<InvocationOutcome> {
    ResponseFamily::detect(body).normalizer().normalize(body)
}

/// Key names a family uses for the fields we care about.
struct Keys {
    inline: &'static [&'static str],
    mime: &'static [&'static str],
    prompt_feedback: &'static [&'static str],
    block_reason: &'static [&'static str],
    finish_reason: &'static [&'static str],
}

pub struct DirectEnvelope;

impl DirectEnvelope {
    const KEYS: Keys = Keys {
        inline: &["inlineData"],
        mime: &["mimeType"],
        prompt_feedback: &["promptFeedback"],
        block_reason: &["blockReason"],
        finish_reason: &["finishReason"],
    };
}

impl ResponseNormalizer for DirectEnvelope {
    fn normalize(&self, body: &Value) -> Result<InvocationOutcome> {
        extract(body, &Self::KEYS)
    }
}

pub struct WrappedEnvelope;

impl WrappedEnvelope {
    const KEYS: Keys = Keys {
        inline: &["inline_data", "inlineData"],
        mime: &["mime_type", "mimeType"],
        prompt_feedback: &["prompt_feedback", "promptFeedback"],
        block_reason: &["block_reason", "blockReason"],
        finish_reason: &["finish_reason", "finishReason"],
    };
}

impl ResponseNormalizer for WrappedEnvelope {
    fn normalize(&self, body: &Value) -> Result<InvocationOutcome> {
        check_api_error(body)?;
        let inner = body.get("response").unwrap_or(body);
        extract(inner, &Self::KEYS)
    }
}

fn field<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| value.get(*k))
}

fn check_api_error(body: &Value) -> Result<()> {
    match body.get("error") {
        Some(error) if !error.is_null() => {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .map(String::from)
                .unwrap_or_else(|| error.to_string());
            Err(NanoError::InvocationError(message))
        }
        _ => Ok(()),
    }
}

fn extract(envelope: &Value, keys: &Keys) -> Result<InvocationOutcome> {
    check_api_error(envelope)?;

    let first_candidate = envelope
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|c| c.first());
    let parts: &[Value] = first_candidate
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    let text = collect_text(parts);

    let inline = parts.iter().find_map(|p| {
        field(p, keys.inline).filter(|inline| inline.get("data").map_or(false, has_payload))
    });

    if let Some(inline) = inline {
        let data = inline.get("data").and_then(to_base64).ok_or_else(|| {
            NanoError::InvocationError("inline image data in unsupported format".into())
        })?;
        let mime_type = field(inline, keys.mime)
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_IMAGE_MIME);
        return Ok(InvocationOutcome {
            image: Some(InlineImage::new(mime_type, data)),
            text,
        });
    }

    if let Some(reason) = block_reason(envelope, first_candidate, keys) {
        return Err(NanoError::ContentBlocked { reason, text });
    }

    Ok(InvocationOutcome { image: None, text })
}

/// Empty strings and empty arrays carry no image; keep looking at later parts.
fn has_payload(data: &Value) -> bool {
    match data {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

/// Image bytes arrive either as a base64 string or as a JSON array of bytes.
fn to_base64(data: &Value) -> Option<String> {
    match data {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Array(items) if !items.is_empty() => {
            let bytes: Option<Vec<u8>> = items
                .iter()
                .map(|v| v.as_u64().and_then(|b| u8::try_from(b).ok()))
                .collect();
            bytes.map(|b| STANDARD.encode(b))
        }
        _ => None,
    }
}

fn collect_text(parts: &[Value]) -> Option<String> {
    let chunks: Vec<&str> = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();
    if chunks.is_empty() {
        None
    } else {
        Some(chunks.join(" | "))
    }
}

fn block_reason(envelope: &Value, candidate: Option<&Value>, keys: &Keys) -> Option<String> {
    let prompt_block = field(envelope, keys.prompt_feedback)
        .and_then(|f| field(f, keys.block_reason))
        .and_then(Value::as_str)
        .filter(|r| !r.is_empty() && *r != "BLOCK_REASON_UNSPECIFIED");
    if let Some(reason) = prompt_block {
        return Some(reason.to_string());
    }

    candidate
        .and_then(|c| field(c, keys.finish_reason))
        .and_then(Value::as_str)
        .filter(|r| BLOCKING_FINISH_REASONS.contains(r))
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn direct_envelope_with_image_and_text() {
        let body = json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "Here is your render." },
                    { "inlineData": { "mimeType": "image/webp", "data": "QUJD" } },
                    { "text": "  " }
                ]},
                "finishReason": "STOP"
            }]
        });

        assert_eq!(ResponseFamily::detect(&body), ResponseFamily::Direct);
        let outcome = normalize(&body).unwrap();
        assert_eq!(outcome.image, Some(InlineImage::new("image/webp", "QUJD")));
        assert_eq!(outcome.text.as_deref(), Some("Here is your render."));
    }

    #[test]
    fn direct_envelope_text_only_is_not_an_error() {
        let body = json!({
            "candidates": [{ "content": { "parts": [
                { "text": "I can't" }, { "text": "do that" }
            ]}}]
        });
        let outcome = normalize(&body).unwrap();
        assert!(!outcome.has_image());
        assert_eq!(outcome.text.as_deref(), Some("I can't | do that"));
    }

    #[test]
    fn missing_mime_defaults_to_png() {
        let body = json!({
            "candidates": [{ "content": { "parts": [{ "inlineData": { "data": "QUJD" } }] } }]
        });
        let image = normalize(&body).unwrap().image.unwrap();
        assert_eq!(image.mime_type, "image/png");
    }

    #[test]
    fn wrapped_envelope_with_byte_array() {
        let body = json!({
            "response": {
                "candidates": [{ "content": { "parts": [
                    { "inline_data": { "mime_type": "image/png", "data": [65, 66, 67] } }
                ]}}]
            }
        });

        assert_eq!(ResponseFamily::detect(&body), ResponseFamily::Wrapped);
        let image = normalize(&body).unwrap().image.unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.data, "QUJD");
    }

    #[test]
    fn unsupported_inline_payload_is_an_invocation_error() {
        let body = json!({
            "candidates": [{ "content": { "parts": [{ "inlineData": { "data": { "x": 1 } } }] } }]
        });
        assert!(matches!(normalize(&body), Err(NanoError::InvocationError(_))));
    }

    #[test]
    fn empty_inline_parts_are_skipped() {
        let body = json!({
            "candidates": [{ "content": { "parts": [
                { "inlineData": { "data": "" } },
                { "inlineData": { "data": [] } },
                { "inlineData": { "mimeType": "image/png", "data": "QUJD" } }
            ]}}]
        });
        let image = normalize(&body).unwrap().image.unwrap();
        assert_eq!(image, InlineImage::new("image/png", "QUJD"));

        let body = json!({
            "candidates": [{ "content": { "parts": [
                { "inlineData": { "data": "" } },
                { "text": "nothing to show" }
            ]}}]
        });
        let outcome = normalize(&body).unwrap();
        assert!(outcome.image.is_none());
        assert_eq!(outcome.text.as_deref(), Some("nothing to show"));
    }

    #[test]
    fn prompt_feedback_block_is_distinguishable() {
        let body = json!({
            "promptFeedback": { "blockReason": "SAFETY" },
            "candidates": []
        });
        match normalize(&body) {
            Err(NanoError::ContentBlocked { reason, text }) => {
                assert_eq!(reason, "SAFETY");
                assert!(text.is_none());
            }
            other => panic!("expected content block, got {:?}", other),
        }
    }

    #[test]
    fn finish_reason_block_keeps_model_text() {
        let body = json!({
            "response": {
                "candidates": [{
                    "content": { "parts": [{ "text": "policy" }] },
                    "finish_reason": "IMAGE_SAFETY"
                }]
            }
        });
        match normalize(&body) {
            Err(NanoError::ContentBlocked { reason, text }) => {
                assert_eq!(reason, "IMAGE_SAFETY");
                assert_eq!(text.as_deref(), Some("policy"));
            }
            other => panic!("expected content block, got {:?}", other),
        }
    }

    #[test]
    fn api_error_object_surfaces_its_message() {
        let body = json!({ "error": { "code": 400, "message": "seed not supported" } });
        match normalize(&body) {
            Err(NanoError::InvocationError(msg)) => assert_eq!(msg, "seed not supported"),
            other => panic!("expected invocation error, got {:?}", other),
        }
    }
}
