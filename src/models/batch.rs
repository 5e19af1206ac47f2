use serde::{Deserialize, Serialize};

use super::SeedMode;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UnitResult {
    pub name: String,
    pub image_base64: Option<String>,
    pub mime_type: String,
    /// Seed the winning (or last) plan actually sent. Absent when that plan carried none.
    pub seed_used: Option<u32>,
    pub requested_seed: u32,
    pub suggested_filename: String,
    pub attempts: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UnitResult {
    pub fn has_image(&self) -> bool {
        self.image_base64.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub ok: bool,
    pub model_used: String,
    pub temperature: f64,
    pub seed_mode: SeedMode,
    pub base_seed: u32,
    pub units: Vec<UnitResult>,
}

impl BatchResult {
    pub fn image_count(&self) -> usize {
        self.units.iter().filter(|u| u.has_image()).count()
    }

    /// `name: error || name: error` over every unit without an image.
    pub fn failure_summary(&self) -> String {
        failure_summary(&self.units)
    }
}

pub fn failure_summary(units: &[UnitResult]) -> String {
    units
        .iter()
        .filter(|u| !u.has_image())
        .map(|u| format!("{}: {}", u.name, u.error.as_deref().unwrap_or("no image")))
        .collect::<Vec<_>>()
        .join(" || ")
}
