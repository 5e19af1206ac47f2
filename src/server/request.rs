use actix_multipart::Multipart;
use futures::TryStreamExt;
use serde::Deserialize;

use crate::{
    catalog::{first_duplicate, PromptCatalog},
    error::{NanoError, Result},
    generation::{clamp_temperature, codec::clamp_quality, SEED_LIMIT},
    models::{PromptUnit, SeedMode},
};

/// Raw query string of `POST /api/nano`. Everything is optional and parsed leniently.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchQuery {
    pub temp: Option<String>,
    pub seed: Option<String>,
    pub seed_mode: Option<String>,
    pub jpeg: Option<String>,
    pub model: Option<String>,
    pub include_prompt: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchOptions {
    pub temperature: f64,
    pub seed: Option<u32>,
    pub seed_mode: SeedMode,
    pub jpeg_quality: u8,
    pub candidates: Vec<String>,
    pub include_prompt: bool,
}

impl BatchQuery {
    pub fn resolve(&self, default_candidates: &[String], default_jpeg: u8) -> BatchOptions {
        let temperature = self
            .temp
            .as_deref()
            .and_then(|t| t.trim().parse::<f64>().ok())
            .map(clamp_temperature)
            .unwrap_or(1.0);

        let seed = self
            .seed
            .as_deref()
            .and_then(|s| s.trim().parse::<i64>().ok())
            .filter(|s| (0..SEED_LIMIT as i64).contains(s))
            .map(|s| s as u32);

        let seed_mode = self
            .seed_mode
            .as_deref()
            .map(SeedMode::parse)
            .unwrap_or_default();

        let jpeg_quality = self
            .jpeg
            .as_deref()
            .and_then(|q| q.trim().parse::<f64>().ok())
            .filter(|q| q.is_finite())
            .map(|q| clamp_quality(q.trunc() as i64))
            .unwrap_or(default_jpeg);

        let candidates = match self.model.as_deref().map(str::trim) {
            Some(model) if !model.is_empty() => vec![model.to_string()],
            _ => default_candidates.to_vec(),
        };

        let include_prompt = self
            .include_prompt
            .as_deref()
            .map_or(false, |v| v.trim().eq_ignore_ascii_case("true"));

        BatchOptions {
            temperature,
            seed,
            seed_mode,
            jpeg_quality,
            candidates,
            include_prompt,
        }
    }
}

/// The multipart body of a batch submission.
#[derive(Debug, Default)]
pub struct BatchForm {
    pub images: Vec<(String, Vec<u8>)>,
    pub prompts: Option<String>,
    pub names: Option<String>,
}

impl BatchForm {
    pub async fn read(mut payload: Multipart, max_bytes: usize) -> Result<Self> {
        let mut form = BatchForm::default();
        let mut total = 0usize;

        while let Some(mut field) = payload
            .try_next()
            .await
            .map_err(|e| NanoError::ValidationError(format!("Malformed multipart body: {}", e)))?
        {
            let name = field.name().unwrap_or_default().to_string();
            let filename = field
                .content_disposition()
                .and_then(|cd| cd.get_filename())
                .map(String::from);

            let mut data = Vec::new();
            while let Some(chunk) = field
                .try_next()
                .await
                .map_err(|e| NanoError::ValidationError(format!("Malformed multipart body: {}", e)))?
            {
                total += chunk.len();
                if total > max_bytes {
                    return Err(NanoError::ValidationError(format!(
                        "Upload exceeds {} bytes",
                        max_bytes
                    )));
                }
                data.extend_from_slice(&chunk);
            }

            match name.as_str() {
                "images" if !data.is_empty() => {
                    let filename =
                        filename.unwrap_or_else(|| format!("image-{}", form.images.len() + 1));
                    form.images.push((filename, data));
                }
                "prompts" => form.prompts = Some(text_field("prompts", data)?),
                "names" => form.names = Some(text_field("names", data)?),
                _ => {}
            }
        }

        Ok(form)
    }

    /// Explicit `prompts` win; otherwise `names` select from the catalog; otherwise all of it.
    pub fn resolve_prompts(&self, catalog: &PromptCatalog) -> Result<Vec<PromptUnit>> {
        let prompts = match non_blank(&self.prompts) {
            Some(raw) => serde_json::from_str::<Vec<PromptUnit>>(raw).map_err(|_| {
                NanoError::ValidationError(
                    "Invalid 'prompts' field (expected JSON array of {name: string, prompt: string})"
                        .into(),
                )
            })?,
            None => {
                let names = match non_blank(&self.names) {
                    Some(raw) => serde_json::from_str::<Vec<String>>(raw).map_err(|_| {
                        NanoError::ValidationError(
                            "Invalid 'names' field (expected JSON array of strings)".into(),
                        )
                    })?,
                    None => Vec::new(),
                };
                catalog.select(&names)
            }
        };

        if prompts.is_empty() {
            return Err(NanoError::ValidationError(
                "No prompts selected or found".into(),
            ));
        }
        if let Some(dup) = first_duplicate(&prompts) {
            return Err(NanoError::ValidationError(format!(
                "Duplicate prompt name '{}'",
                dup
            )));
        }
        Ok(prompts)
    }
}

fn non_blank(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn text_field(name: &str, data: Vec<u8>) -> Result<String> {
    String::from_utf8(data)
        .map_err(|_| NanoError::ValidationError(format!("Field '{}' is not valid UTF-8", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> BatchQuery {
        let raw = pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        actix_web::web::Query::<BatchQuery>::from_query(&raw)
            .unwrap()
            .into_inner()
    }

    fn defaults() -> Vec<String> {
        vec!["a".to_string(), "b".to_string()]
    }

    #[test]
    fn clamps_and_defaults() {
        let opts = query(&[("jpeg", "500"), ("temp", "9")]).resolve(&defaults(), 85);
        assert_eq!(opts.jpeg_quality, 100);
        assert_eq!(opts.temperature, 2.0);

        let opts = query(&[("jpeg", "-5")]).resolve(&defaults(), 85);
        assert_eq!(opts.jpeg_quality, 1);

        let opts = BatchQuery::default().resolve(&defaults(), 85);
        assert_eq!(opts.jpeg_quality, 85);
        assert_eq!(opts.temperature, 1.0);
        assert_eq!(opts.seed, None);
        assert_eq!(opts.seed_mode, SeedMode::PerUnit);
        assert_eq!(opts.candidates, defaults());
        assert!(!opts.include_prompt);
    }

    #[test]
    fn invalid_values_fall_back() {
        let opts = query(&[("jpeg", "abc"), ("temp", "warm"), ("seed", "x")]).resolve(&defaults(), 70);
        assert_eq!(opts.jpeg_quality, 70);
        assert_eq!(opts.temperature, 1.0);
        assert_eq!(opts.seed, None);

        let opts = query(&[("seed", "-3")]).resolve(&defaults(), 85);
        assert_eq!(opts.seed, None);
    }

    #[test]
    fn seed_accepts_the_full_31_bit_range() {
        let opts = query(&[("seed", "2147483647")]).resolve(&defaults(), 85);
        assert_eq!(opts.seed, Some(2_147_483_647));

        let opts = query(&[("seed", "0")]).resolve(&defaults(), 85);
        assert_eq!(opts.seed, Some(0));

        let opts = query(&[("seed", "2147483648")]).resolve(&defaults(), 85);
        assert_eq!(opts.seed, None);
    }

    #[test]
    fn model_override_replaces_candidates() {
        let opts = query(&[
            ("model", "gemini-2.5-flash-image"),
            ("seedMode", "single"),
            ("seed", "1234"),
            ("includePrompt", "TRUE"),
        ])
        .resolve(&defaults(), 85);
        assert_eq!(opts.candidates, vec!["gemini-2.5-flash-image".to_string()]);
        assert_eq!(opts.seed_mode, SeedMode::Single);
        assert_eq!(opts.seed, Some(1234));
        assert!(opts.include_prompt);
    }

    #[test]
    fn explicit_prompts_take_precedence() {
        let form = BatchForm {
            prompts: Some(r#"[{"name":"x","prompt":"custom"}]"#.to_string()),
            names: Some(r#"["night_view"]"#.to_string()),
            ..Default::default()
        };
        let prompts = form.resolve_prompts(&PromptCatalog::builtin()).unwrap();
        assert_eq!(prompts, vec![PromptUnit::new("x", "custom")]);
    }

    #[test]
    fn malformed_selection_names_the_field() {
        let form = BatchForm {
            prompts: Some("{not json".to_string()),
            ..Default::default()
        };
        match form.resolve_prompts(&PromptCatalog::builtin()) {
            Err(NanoError::ValidationError(msg)) => assert!(msg.contains("'prompts'")),
            other => panic!("expected validation error, got {:?}", other),
        }

        let form = BatchForm {
            names: Some("[1, 2]".to_string()),
            ..Default::default()
        };
        match form.resolve_prompts(&PromptCatalog::builtin()) {
            Err(NanoError::ValidationError(msg)) => assert!(msg.contains("'names'")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn empty_and_duplicate_selections_are_rejected() {
        let form = BatchForm {
            names: Some(r#"["unknown"]"#.to_string()),
            ..Default::default()
        };
        assert!(matches!(
            form.resolve_prompts(&PromptCatalog::builtin()),
            Err(NanoError::ValidationError(_))
        ));

        let form = BatchForm {
            prompts: Some(r#"[{"name":"a","prompt":"1"},{"name":"a","prompt":"2"}]"#.to_string()),
            ..Default::default()
        };
        assert!(matches!(
            form.resolve_prompts(&PromptCatalog::builtin()),
            Err(NanoError::ValidationError(_))
        ));
    }

    #[test]
    fn no_selection_uses_whole_catalog() {
        let form = BatchForm::default();
        assert_eq!(form.resolve_prompts(&PromptCatalog::builtin()).unwrap().len(), 12);
    }
}
