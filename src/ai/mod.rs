//! Remote completion service integration.

pub mod anthropic;
pub mod credentials;
pub mod parse;
pub mod prompt;
pub mod retry;
#[cfg(test)]
pub(crate) mod test_utils;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};

pub use anthropic::AnthropicClient;
pub use prompt::{build_prompt, Prompt};

/// Per-attempt timeout for completion requests.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Metadata about a completion client implementation.
#[derive(Clone, Debug)]
pub struct ClientMetadata {
    /// Service provider name.
    pub provider: String,
    /// Model identifier.
    pub model: String,
}

/// Raw model output, immutable once received.
#[derive(Clone, Debug)]
pub struct ModelResponse {
    /// The response text exactly as the service returned it.
    pub raw_text: String,
    /// When the response was received.
    pub received_at: DateTime<Utc>,
}

impl ModelResponse {
    /// Wraps raw response text with a receipt timestamp.
    pub fn new(raw_text: String) -> Self {
        Self {
            raw_text,
            received_at: Utc::now(),
        }
    }
}

/// Trait for completion service clients.
///
/// One request in, one whole response out; no streaming. Implementations
/// classify their failures so the retry layer knows what is worth
/// re-attempting.
pub trait CompletionClient: Send + Sync {
    /// Sends a prompt to the completion service and returns the raw
    /// response text.
    fn complete<'a>(
        &'a self,
        prompt: &'a Prompt,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;

    /// Returns metadata about the client implementation.
    fn metadata(&self) -> ClientMetadata;
}
