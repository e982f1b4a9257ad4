use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Language of the form labels and of the generation prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    Arabic,
    English,
}

impl Language {
    /// Whether text in this language runs right to left.
    pub fn is_rtl(self) -> bool {
        matches!(self, Language::Arabic)
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ar" | "arabic" => Ok(Language::Arabic),
            "en" | "english" => Ok(Language::English),
            other => Err(format!("unsupported language '{other}' (expected 'ar' or 'en')")),
        }
    }
}
