/// Generation client — the single boundary between Sira and the remote
/// text-generation capability.
///
/// ARCHITECTURAL RULE: no other module talks to a generation provider directly.
/// Callers hold an `Arc<dyn GenerationClient>` and never know which provider
/// is behind it.
///
/// Every call is exactly one outbound request: no retries, no caching.
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use crate::config::{Config, ProviderConfig};
use crate::models::generation::{GenerationRequest, GenerationResult};

pub mod anthropic;
pub mod capability;
pub mod prompts;

pub use anthropic::AnthropicClient;
pub use capability::CapabilityClient;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("malformed response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("remote capability returned empty content")]
    EmptyContent,
}

/// A remote capability that turns a prompt into generated text.
///
/// All-or-nothing: either the full text comes back or a `GenerationError`
/// does. Identical requests may produce different text.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Short provider name used in logs.
    fn provider(&self) -> &'static str;

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, GenerationError>;
}

/// Builds the provider selected in config.
pub fn build_client(config: &Config) -> Result<Arc<dyn GenerationClient>> {
    let timeout = Duration::from_secs(config.generation_timeout_secs);
    let client: Arc<dyn GenerationClient> = match &config.provider {
        ProviderConfig::Capability { endpoint, api_key } => Arc::new(
            CapabilityClient::new(endpoint.clone(), api_key.clone(), timeout)
                .context("Failed to build capability HTTP client")?,
        ),
        ProviderConfig::Anthropic { api_key } => Arc::new(
            AnthropicClient::new(api_key.clone(), timeout)
                .context("Failed to build Anthropic HTTP client")?,
        ),
    };
    Ok(client)
}

pub(crate) fn http_client(timeout: Duration) -> Result<Client, GenerationError> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// Rejects blank text; otherwise wraps it untouched.
pub(crate) fn non_empty(text: String) -> Result<GenerationResult, GenerationError> {
    if text.trim().is_empty() {
        return Err(GenerationError::EmptyContent);
    }
    Ok(GenerationResult::new(text))
}

/// Pulls a human-readable message out of an error body.
/// Understands `{"error": {"message": ..}}`, `{"error": ".."}` and
/// `{"message": ..}`; anything else is returned as-is.
pub(crate) fn error_message(body: String) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(&body) else {
        return body;
    };
    let message = value
        .pointer("/error/message")
        .or_else(|| value.get("error").filter(|e| e.is_string()))
        .or_else(|| value.get("message"))
        .and_then(|m| m.as_str());
    match message {
        Some(m) => m.to_string(),
        None => body,
    }
}

#[cfg(test)]
pub(crate) mod stub_server {
    //! In-process HTTP stub standing in for a generation provider.

    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::HeaderMap, http::StatusCode, Router};
    use serde_json::Value;

    #[derive(Clone)]
    pub(crate) struct StubReply {
        pub status: u16,
        pub body: String,
    }

    impl StubReply {
        pub(crate) fn ok(body: impl Into<String>) -> Self {
            Self {
                status: 200,
                body: body.into(),
            }
        }
    }

    #[derive(Debug, Clone)]
    pub(crate) struct RecordedCall {
        pub headers: HeaderMap,
        pub body: Value,
    }

    #[derive(Clone, Default)]
    pub(crate) struct Recorder(Arc<Mutex<Vec<RecordedCall>>>);

    impl Recorder {
        pub(crate) fn calls(&self) -> Vec<RecordedCall> {
            self.0.lock().unwrap().clone()
        }
    }

    async fn handle(
        State((reply, recorder)): State<(StubReply, Recorder)>,
        headers: HeaderMap,
        body: String,
    ) -> (StatusCode, String) {
        let body = serde_json::from_str(&body).unwrap_or(Value::Null);
        recorder.0.lock().unwrap().push(RecordedCall { headers, body });
        (StatusCode::from_u16(reply.status).unwrap(), reply.body)
    }

    /// Starts a stub answering every request with `reply`; returns its base URL.
    pub(crate) async fn spawn(reply: StubReply) -> (String, Recorder) {
        let recorder = Recorder::default();
        let app = Router::new()
            .fallback(handle)
            .with_state((reply, recorder.clone()));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{addr}"), recorder)
    }

    /// A URL on which nothing is listening.
    pub(crate) async fn dead_url() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_keeps_text_verbatim() {
        let text = "  **Sara** — summary\n".to_string();
        assert_eq!(non_empty(text.clone()).unwrap().as_str(), text);
    }

    #[test]
    fn test_non_empty_rejects_whitespace() {
        assert!(matches!(
            non_empty(" \n\t".to_string()),
            Err(GenerationError::EmptyContent)
        ));
    }

    #[test]
    fn test_error_message_shapes() {
        assert_eq!(
            error_message(r#"{"error":{"type":"x","message":"bad key"}}"#.to_string()),
            "bad key"
        );
        assert_eq!(error_message(r#"{"error":"quota"}"#.to_string()), "quota");
        assert_eq!(error_message(r#"{"message":"down"}"#.to_string()), "down");
        assert_eq!(error_message("gateway timeout".to_string()), "gateway timeout");
    }
}
