use crate::models::{BatchResult, PromptUnit, SeedMode, UnitResult};

/// Batch-level parameters echoed back next to the units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchParams {
    pub temperature: f64,
    pub seed_mode: SeedMode,
    pub base_seed: u32,
    pub include_prompt: bool,
}

/// Package one candidate's units into the externally visible result.
pub fn assemble(
    model: &str,
    mut units: Vec<UnitResult>,
    prompts: &[PromptUnit],
    params: &BatchParams,
) -> BatchResult {
    for (unit, prompt) in units.iter_mut().zip(prompts) {
        unit.prompt_text = if params.include_prompt {
            Some(prompt.text.clone())
        } else {
            None
        };
    }

    BatchResult {
        ok: units.iter().any(UnitResult::has_image),
        model_used: model.to_string(),
        temperature: params.temperature,
        seed_mode: params.seed_mode,
        base_seed: params.base_seed,
        units,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(name: &str, image: Option<&str>) -> UnitResult {
        UnitResult {
            name: name.to_string(),
            image_base64: image.map(String::from),
            mime_type: "image/png".to_string(),
            seed_used: Some(1),
            requested_seed: 1,
            suggested_filename: format!("{}_seed_1.png", name),
            attempts: 1,
            prompt_text: None,
            error: image.is_none().then(|| "no image".to_string()),
        }
    }

    fn params(include_prompt: bool) -> BatchParams {
        BatchParams {
            temperature: 1.0,
            seed_mode: SeedMode::Single,
            base_seed: 1,
            include_prompt,
        }
    }

    #[test]
    fn prompt_text_only_when_requested() {
        let prompts = vec![PromptUnit::new("a", "text a")];

        let with = assemble("m", vec![unit("a", Some("x"))], &prompts, &params(true));
        assert_eq!(with.units[0].prompt_text.as_deref(), Some("text a"));

        let without = assemble("m", vec![unit("a", Some("x"))], &prompts, &params(false));
        assert!(without.units[0].prompt_text.is_none());
        let json = serde_json::to_value(&without).unwrap();
        assert!(json["units"][0].get("promptText").is_none());
    }

    #[test]
    fn ok_tracks_presence_of_any_image() {
        let prompts = vec![PromptUnit::new("a", "1"), PromptUnit::new("b", "2")];

        let none = assemble("m", vec![unit("a", None), unit("b", None)], &prompts, &params(false));
        assert!(!none.ok);
        assert_eq!(none.failure_summary(), "a: no image || b: no image");

        let one = assemble("m", vec![unit("a", None), unit("b", Some("x"))], &prompts, &params(false));
        assert!(one.ok);
        assert_eq!(one.image_count(), 1);
        assert_eq!(one.model_used, "m");
    }
}
