use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};

use crate::export::ExportLayout;
use crate::models::language::Language;

/// Which generation provider to talk to, with its credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderConfig {
    Capability {
        endpoint: String,
        api_key: Option<String>,
    },
    Anthropic {
        api_key: String,
    },
}

/// Application configuration loaded from environment variables.
/// Fails at startup if a required variable is missing or a value is invalid.
#[derive(Debug, Clone)]
pub struct Config {
    pub provider: ProviderConfig,
    pub generation_timeout_secs: u64,
    pub language: Language,
    pub export_dir: PathBuf,
    pub export_layout: ExportLayout,
    /// Identity signed in at startup, if any.
    pub user_email: Option<String>,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| anyhow!("Required environment variable '{key}' is not set"))
        };

        let provider = match get("GENERATION_PROVIDER").as_deref().unwrap_or("event") {
            "event" | "capability" => ProviderConfig::Capability {
                endpoint: require("GENERATION_ENDPOINT")?,
                api_key: get("GENERATION_API_KEY"),
            },
            "anthropic" => ProviderConfig::Anthropic {
                api_key: require("ANTHROPIC_API_KEY")?,
            },
            other => bail!("GENERATION_PROVIDER must be 'event' or 'anthropic', got '{other}'"),
        };

        let generation_timeout_secs = get("GENERATION_TIMEOUT_SECS")
            .unwrap_or_else(|| "120".to_string())
            .parse::<u64>()
            .context("GENERATION_TIMEOUT_SECS must be a whole number of seconds")?;
        if generation_timeout_secs == 0 {
            bail!("GENERATION_TIMEOUT_SECS must be at least 1");
        }

        Ok(Config {
            provider,
            generation_timeout_secs,
            language: get("CV_LANGUAGE")
                .unwrap_or_else(|| "ar".to_string())
                .parse::<Language>()
                .map_err(|e| anyhow!("CV_LANGUAGE: {e}"))?,
            export_dir: get("EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            export_layout: get("EXPORT_LAYOUT")
                .unwrap_or_else(|| "paragraphs".to_string())
                .parse::<ExportLayout>()
                .map_err(|e| anyhow!("EXPORT_LAYOUT: {e}"))?,
            user_email: get("SIRA_USER_EMAIL"),
            rust_log: get("RUST_LOG").unwrap_or_else(|| "warn".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_with_capability_endpoint() {
        let config =
            Config::from_lookup(lookup(&[("GENERATION_ENDPOINT", "http://localhost/gen")]))
                .unwrap();

        assert_eq!(
            config.provider,
            ProviderConfig::Capability {
                endpoint: "http://localhost/gen".to_string(),
                api_key: None,
            }
        );
        assert_eq!(config.generation_timeout_secs, 120);
        assert_eq!(config.language, Language::Arabic);
        assert_eq!(config.export_dir, PathBuf::from("."));
        assert_eq!(config.export_layout, ExportLayout::Paragraphs);
        assert_eq!(config.user_email, None);
        assert_eq!(config.rust_log, "warn");
    }

    #[test]
    fn test_anthropic_provider_requires_key() {
        let err = Config::from_lookup(lookup(&[("GENERATION_PROVIDER", "anthropic")]))
            .unwrap_err();
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));

        let config = Config::from_lookup(lookup(&[
            ("GENERATION_PROVIDER", "anthropic"),
            ("ANTHROPIC_API_KEY", "sk-1"),
            ("CV_LANGUAGE", "en"),
            ("EXPORT_LAYOUT", "single_run"),
            ("SIRA_USER_EMAIL", "sara@example.com"),
        ]))
        .unwrap();
        assert_eq!(
            config.provider,
            ProviderConfig::Anthropic {
                api_key: "sk-1".to_string()
            }
        );
        assert_eq!(config.language, Language::English);
        assert_eq!(config.export_layout, ExportLayout::SingleRun);
        assert_eq!(config.user_email.as_deref(), Some("sara@example.com"));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("GENERATION_ENDPOINT", "http://localhost/gen"),
            ("GENERATION_TIMEOUT_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("GENERATION_TIMEOUT_SECS"));
    }

    #[test]
    fn test_missing_endpoint_is_rejected() {
        let err = Config::from_lookup(lookup(&[("GENERATION_ENDPOINT", "  ")])).unwrap_err();
        assert!(err.to_string().contains("GENERATION_ENDPOINT"));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let base = [("GENERATION_ENDPOINT", "http://localhost/gen")];
        for (key, value) in [
            ("GENERATION_PROVIDER", "openai"),
            ("GENERATION_TIMEOUT_SECS", "soon"),
            ("GENERATION_TIMEOUT_SECS", "0"),
            ("CV_LANGUAGE", "fr"),
            ("EXPORT_LAYOUT", "pdf"),
        ] {
            let mut pairs = base.to_vec();
            pairs.push((key, value));
            assert!(
                Config::from_lookup(lookup(&pairs)).is_err(),
                "{key}={value} should be rejected"
            );
        }
    }
}
