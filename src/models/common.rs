use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Modality {
    Text,
    Image,
}

impl Modality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Text => "TEXT",
            Modality::Image => "IMAGE",
        }
    }
}

/// Whether all units of a batch share one seed or each draws its own.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum SeedMode {
    #[serde(rename = "single")]
    Single,
    #[default]
    #[serde(rename = "per-unit")]
    PerUnit,
}

impl SeedMode {
    /// Lenient parse for query strings. Anything unrecognised falls back to per-unit.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "single" | "one" | "shared" => SeedMode::Single,
            _ => SeedMode::PerUnit,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SeedMode::Single => "single",
            SeedMode::PerUnit => "per-unit",
        }
    }
}

impl fmt::Display for SeedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An image ready to travel inline in a JSON body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String, // Base64 encoded
}

impl InlineImage {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }
}

pub fn extension_for(mime_type: &str) -> String {
    match mime_type.split('/').nth(1).map(str::trim) {
        Some("jpeg") => "jpg".to_string(),
        Some(sub) if !sub.is_empty() => sub.to_ascii_lowercase(),
        _ => "png".to_string(),
    }
}
