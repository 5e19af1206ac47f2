use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::{json, Map, Value};

use crate::error::NanoError;

impl ResponseError for NanoError {
    fn status_code(&self) -> StatusCode {
        match self {
            NanoError::ValidationError(_) | NanoError::EncodingError(_) => StatusCode::BAD_REQUEST,
            NanoError::NoModelSucceeded {
                last_attempt: Some(_),
                ..
            } => StatusCode::BAD_GATEWAY,
            NanoError::InvocationError(_)
            | NanoError::ContentBlocked { .. }
            | NanoError::NoImage { .. }
            | NanoError::ModelUnavailable(_) => StatusCode::BAD_GATEWAY,
            NanoError::ConfigError(_)
            | NanoError::NoModelSucceeded { .. }
            | NanoError::SerializationError(_)
            | NanoError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("❌ {} -> {}", self, status);
        } else {
            log::warn!("⚠️  {} -> {}", self, status);
        }
        HttpResponse::build(status).json(error_body(self))
    }
}

/// `{ok: false, error, code, ...}`; a clean zero-image batch also carries its last attempt.
pub fn error_body(err: &NanoError) -> Value {
    let mut body = Map::new();

    match err {
        NanoError::NoModelSucceeded {
            tried,
            detail,
            last_attempt,
        } => {
            if let Some(attempt) = last_attempt {
                if let Ok(Value::Object(fields)) = serde_json::to_value(attempt.as_ref()) {
                    body.extend(fields);
                }
                body.insert("error".into(), json!(detail));
            } else {
                body.insert("error".into(), json!("No model generated an image"));
                body.insert("detail".into(), json!(detail));
            }
            body.insert("tried".into(), json!(tried));
        }
        NanoError::ContentBlocked { reason, text } => {
            body.insert("error".into(), json!(err.to_string()));
            body.insert("reason".into(), json!(reason));
            body.insert("modelText".into(), json!(text));
        }
        NanoError::SerializationError(detail) | NanoError::InternalError(detail) => {
            body.insert("error".into(), json!("Internal error"));
            body.insert("detail".into(), json!(detail));
        }
        other => {
            body.insert("error".into(), json!(other.to_string()));
        }
    }

    body.insert("ok".into(), json!(false));
    body.insert("code".into(), json!(err.code()));
    Value::Object(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BatchResult, SeedMode};

    #[test]
    fn status_mapping() {
        assert_eq!(
            NanoError::ValidationError("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            NanoError::ConfigError("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        let aborted = NanoError::NoModelSucceeded {
            tried: vec!["a".into()],
            detail: "boom".into(),
            last_attempt: None,
        };
        assert_eq!(aborted.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn clean_failure_is_a_bad_gateway_with_diagnostics() {
        let attempt = BatchResult {
            ok: false,
            model_used: "b".into(),
            temperature: 0.4,
            seed_mode: SeedMode::Single,
            base_seed: 3,
            units: vec![],
        };
        let err = NanoError::NoModelSucceeded {
            tried: vec!["a".into(), "b".into()],
            detail: "Model returned no images [b] - x: no image".into(),
            last_attempt: Some(Box::new(attempt)),
        };
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);

        let body = error_body(&err);
        assert_eq!(body["ok"], false);
        assert_eq!(body["modelUsed"], "b");
        assert_eq!(body["baseSeed"], 3);
        assert_eq!(body["temperature"], json!(0.4));
        assert_eq!(body["tried"], json!(["a", "b"]));
        assert_eq!(body["code"], "NO_MODEL_SUCCEEDED");
    }
}
