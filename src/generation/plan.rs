use crate::models::{GenerationPlan, Modality};

pub const PLAN_COUNT: usize = 3;

/// The fixed fallback ladder tried for every unit, richest request first:
/// text+image with seed, image-only with seed, text+image without seed.
pub fn plans_for(temperature: f64, seed: u32) -> [GenerationPlan; PLAN_COUNT] {
    [
        GenerationPlan {
            temperature,
            seed: Some(seed),
            modalities: vec![Modality::Text, Modality::Image],
        },
        GenerationPlan {
            temperature,
            seed: Some(seed),
            modalities: vec![Modality::Image],
        },
        GenerationPlan {
            temperature,
            seed: None,
            modalities: vec![Modality::Text, Modality::Image],
        },
    ]
}

/// Clamp a temperature into `[0, 2]`; non-finite input falls back to 1.
pub fn clamp_temperature(temperature: f64) -> f64 {
    if temperature.is_finite() {
        temperature.clamp(0.0, 2.0)
    } else {
        1.0
    }
}
