//! Generic capability endpoint: one JSON call naming the `text_generation`
//! capability, answered with the generated text.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{error_message, http_client, non_empty, GenerationClient, GenerationError};
use crate::models::generation::{GenerationRequest, GenerationResult, ResponseFormat};

pub const CAPABILITY: &str = "text_generation";

#[derive(Debug, Serialize)]
struct CapabilityCall<'a> {
    capability: &'a str,
    input: CapabilityInput<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CapabilityInput<'a> {
    prompt: &'a str,
    response_format: ResponseFormat,
}

/// Accepted reply bodies: a bare JSON string, or an object carrying the text.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CapabilityReply {
    Bare(String),
    Wrapped {
        #[serde(alias = "text")]
        result: String,
    },
}

impl CapabilityReply {
    fn into_text(self) -> String {
        match self {
            CapabilityReply::Bare(text) | CapabilityReply::Wrapped { result: text } => text,
        }
    }
}

#[derive(Clone)]
pub struct CapabilityClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl CapabilityClient {
    pub fn new(
        endpoint: String,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        Ok(Self {
            client: http_client(timeout)?,
            endpoint,
            api_key,
        })
    }
}

#[async_trait]
impl GenerationClient for CapabilityClient {
    fn provider(&self) -> &'static str {
        "capability"
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, GenerationError> {
        let body = CapabilityCall {
            capability: CAPABILITY,
            input: CapabilityInput {
                prompt: &request.prompt_text,
                response_format: request.response_format,
            },
        };

        debug!(
            "Capability call: {} prompt chars to {}",
            request.prompt_text.chars().count(),
            self.endpoint
        );
        let started = Instant::now();

        let mut call = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            call = call.bearer_auth(key);
        }
        let response = call.send().await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message: error_message(text),
            });
        }

        let reply: CapabilityReply = serde_json::from_str(&text)?;
        let result = non_empty(reply.into_text())?;

        info!(
            "Capability generation succeeded in {}ms ({} chars)",
            started.elapsed().as_millis(),
            result.as_str().chars().count()
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::stub_server::{self, StubReply};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn request() -> GenerationRequest {
        GenerationRequest {
            prompt_text: "Write a CV for Sara".to_string(),
            response_format: ResponseFormat::Text,
        }
    }

    fn client(endpoint: String, key: Option<&str>) -> CapabilityClient {
        CapabilityClient::new(endpoint, key.map(str::to_string), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_sends_one_request_with_capability_shape() {
        let (url, recorder) = stub_server::spawn(StubReply::ok(r#""**Sara** — CV""#)).await;

        let result = client(url, Some("k-123")).generate(&request()).await.unwrap();

        assert_eq!(result.as_str(), "**Sara** — CV");
        let calls = recorder.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].body,
            json!({
                "capability": "text_generation",
                "input": { "prompt": "Write a CV for Sara", "responseFormat": "text" }
            })
        );
        assert_eq!(
            calls[0].headers.get("authorization").unwrap(),
            "Bearer k-123"
        );
    }

    #[tokio::test]
    async fn test_accepts_wrapped_result_object() {
        let (url, _) = stub_server::spawn(StubReply::ok(r##"{"result":"# CV"}"##)).await;
        let result = client(url, None).generate(&request()).await.unwrap();
        assert_eq!(result.as_str(), "# CV");

        let (url, recorder) = stub_server::spawn(StubReply::ok(r##"{"text":"# CV"}"##)).await;
        let result = client(url, None).generate(&request()).await.unwrap();
        assert_eq!(result.as_str(), "# CV");
        assert!(recorder.calls()[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn test_error_status_is_api_error_and_not_retried() {
        let (url, recorder) = stub_server::spawn(StubReply {
            status: 503,
            body: r#"{"error":"overloaded"}"#.to_string(),
        })
        .await;

        let err = client(url, None).generate(&request()).await.unwrap_err();

        match err {
            GenerationError::Api { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "overloaded");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
        assert_eq!(recorder.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_and_malformed_bodies_fail() {
        let (url, _) = stub_server::spawn(StubReply::ok(r#""   ""#)).await;
        assert!(matches!(
            client(url, None).generate(&request()).await,
            Err(GenerationError::EmptyContent)
        ));

        let (url, _) = stub_server::spawn(StubReply::ok("<html>oops</html>")).await;
        assert!(matches!(
            client(url, None).generate(&request()).await,
            Err(GenerationError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_network_failure_is_http_error() {
        let url = stub_server::dead_url().await;
        assert!(matches!(
            client(url, None).generate(&request()).await,
            Err(GenerationError::Http(_))
        ));
    }
}
