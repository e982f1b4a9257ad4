//! Anthropic Messages API provider.
//!
//! Model: claude-sonnet-4-5 (hardcoded — do not make configurable to prevent drift)

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::prompts::CV_WRITER_SYSTEM;
use super::{error_message, http_client, non_empty, GenerationClient, GenerationError};
use crate::models::generation::{GenerationRequest, GenerationResult};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 4096;

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

impl AnthropicResponse {
    /// Text of the first text block.
    fn into_text(self) -> Option<String> {
        self.content
            .into_iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text)
    }
}

#[derive(Clone)]
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    url: String,
}

impl AnthropicClient {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, GenerationError> {
        Ok(Self {
            client: http_client(timeout)?,
            api_key,
            url: ANTHROPIC_API_URL.to_string(),
        })
    }

    /// Points the client at a different messages endpoint.
    #[cfg(test)]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

#[async_trait]
impl GenerationClient for AnthropicClient {
    fn provider(&self) -> &'static str {
        "anthropic"
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, GenerationError> {
        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system: CV_WRITER_SYSTEM,
            messages: vec![AnthropicMessage {
                role: "user",
                content: &request.prompt_text,
            }],
        };

        let started = Instant::now();
        let response = self
            .client
            .post(&self.url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message: error_message(body),
            });
        }

        let parsed: AnthropicResponse = serde_json::from_str(&body)?;
        debug!(
            "Anthropic call succeeded: input_tokens={}, output_tokens={}",
            parsed.usage.input_tokens, parsed.usage.output_tokens
        );

        let result = non_empty(parsed.into_text().unwrap_or_default())?;
        info!(
            "Anthropic generation succeeded in {}ms (model: {MODEL})",
            started.elapsed().as_millis()
        );
        Ok(result)
    }
}
