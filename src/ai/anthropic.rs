//! Anthropic Messages API client.

use std::future::Future;
use std::pin::Pin;

use anyhow::Result;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{ClientMetadata, CompletionClient, Prompt, REQUEST_TIMEOUT};
use crate::error::ScribeError;

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "claude-3-7-sonnet-20250219";

/// Default cap on generated tokens.
pub const DEFAULT_MAX_TOKENS: u32 = 16384;

const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com";

/// API request message.
#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

/// API request body.
#[derive(Serialize)]
struct CompletionRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<Message>,
}

/// API response content block.
#[derive(Deserialize)]
struct Content {
    #[serde(rename = "type")]
    content_type: String,
    text: String,
}

/// API response body.
#[derive(Deserialize)]
struct CompletionResponse {
    content: Vec<Content>,
}

/// Completion client for the Anthropic Messages API.
pub struct AnthropicClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicClient {
    /// Creates a new client with a per-attempt request timeout.
    pub fn new(api_key: String, model: String, max_tokens: u32) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ScribeError::ServiceUnavailable(format!("http client: {e}")))?;

        Ok(Self {
            client,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key,
            model,
            max_tokens,
        })
    }

    /// Points the client at a different endpoint. Used by tests to target
    /// a local mock server.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Maps an HTTP error status to the error taxonomy.
    ///
    /// Timeouts, rate limits, and server errors are transient and retried
    /// upstream; authentication and validation failures are not.
    fn classify_status(status: StatusCode, body: &str) -> ScribeError {
        let detail = format!("HTTP {status}: {}", body.trim());
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ScribeError::AuthFailure(detail),
            StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => {
                ScribeError::ServiceUnavailable(detail)
            }
            s if s.is_server_error() => ScribeError::ServiceUnavailable(detail),
            _ => ScribeError::RequestRejected(detail),
        }
    }
}

impl CompletionClient for AnthropicClient {
    fn complete<'a>(
        &'a self,
        prompt: &'a Prompt,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            let request = CompletionRequest {
                model: self.model.clone(),
                max_tokens: self.max_tokens,
                system: prompt.instructions.clone(),
                messages: vec![Message {
                    role: "user".to_string(),
                    content: prompt.payload.clone(),
                }],
            };

            info!(
                model = %self.model,
                payload_len = prompt.payload.len(),
                "Sending completion request"
            );

            let response = self
                .client
                .post(format!("{}/v1/messages", self.endpoint))
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", "2023-06-01")
                .header("content-type", "application/json")
                .json(&request)
                .send()
                .await
                .map_err(|e| ScribeError::ServiceUnavailable(format!("network: {e}")))?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_else(|e| {
                    debug!("Failed to read error response body: {e}");
                    String::new()
                });
                return Err(Self::classify_status(status, &body).into());
            }

            let completion: CompletionResponse = response
                .json()
                .await
                .map_err(|e| ScribeError::UnparseableResponse(format!("bad response body: {e}")))?;

            let text = completion
                .content
                .iter()
                .filter(|c| c.content_type == "text")
                .map(|c| c.text.as_str())
                .collect::<String>();

            if text.is_empty() {
                return Err(ScribeError::UnparseableResponse(
                    "no text content in response".to_string(),
                )
                .into());
            }

            debug!(response_len = text.len(), "Received completion response");
            Ok(text)
        })
    }

    fn metadata(&self) -> ClientMetadata {
        ClientMetadata {
            provider: "Anthropic".to_string(),
            model: self.model.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_statuses_are_permanent() {
        let err = AnthropicClient::classify_status(StatusCode::UNAUTHORIZED, "bad key");
        assert!(matches!(err, ScribeError::AuthFailure(_)));
        assert!(!err.is_transient());
    }

    #[test]
    fn rate_limit_and_server_errors_are_transient() {
        for status in [
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::SERVICE_UNAVAILABLE,
        ] {
            let err = AnthropicClient::classify_status(status, "");
            assert!(err.is_transient(), "{status} should be transient");
        }
    }

    #[test]
    fn validation_errors_are_rejected_outright() {
        let err = AnthropicClient::classify_status(StatusCode::BAD_REQUEST, "invalid model");
        assert!(matches!(err, ScribeError::RequestRejected(_)));
        assert!(!err.is_transient());
    }
}
