use serde::{Deserialize, Serialize};

/// Format the remote capability is asked to respond in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    #[default]
    Text,
}

/// Outbound prompt, derived from a complete `FormRecord` at submit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    pub prompt_text: String,
    pub response_format: ResponseFormat,
}

/// Generated CV text exactly as returned by the remote capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationResult(String);

impl GenerationResult {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
