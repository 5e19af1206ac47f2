use serde::{Deserialize, Serialize};

/// One named prompt. On the wire the text travels as `prompt`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PromptUnit {
    pub name: String,
    #[serde(rename = "prompt")]
    pub text: String,
}

impl PromptUnit {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}
