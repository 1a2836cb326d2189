//! Shared test doubles for the `ai` module.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use anyhow::Result;

use super::{ClientMetadata, CompletionClient, Prompt};

/// Mock completion client with a pre-programmed queue of responses.
///
/// Responses are returned in FIFO order; when the queue runs dry,
/// subsequent calls fail. Every call records the prompt it was given so
/// tests can assert on what was dispatched after the client has been moved
/// into the pipeline.
pub(crate) struct MockCompletionClient {
    responses: Arc<Mutex<VecDeque<Result<String>>>>,
    recorded: Arc<Mutex<Vec<Prompt>>>,
}

impl MockCompletionClient {
    /// Creates a mock that returns the given responses in order.
    pub(crate) fn new(responses: Vec<Result<String>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            recorded: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Handle for inspecting recorded prompts after the client moves.
    pub(crate) fn prompt_handle(&self) -> PromptRecordHandle {
        PromptRecordHandle {
            recorded: self.recorded.clone(),
        }
    }
}

/// Shared handle to a mock client's recorded prompts.
pub(crate) struct PromptRecordHandle {
    recorded: Arc<Mutex<Vec<Prompt>>>,
}

impl PromptRecordHandle {
    /// All prompts sent so far.
    pub(crate) fn prompts(&self) -> Vec<Prompt> {
        self.recorded.lock().unwrap().clone()
    }

    /// Number of completion requests made.
    pub(crate) fn request_count(&self) -> usize {
        self.recorded.lock().unwrap().len()
    }
}

impl CompletionClient for MockCompletionClient {
    fn complete<'a>(
        &'a self,
        prompt: &'a Prompt,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        let responses = self.responses.clone();
        let recorded = self.recorded.clone();
        let prompt = prompt.clone();
        Box::pin(async move {
            recorded.lock().unwrap().push(prompt);
            responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(anyhow::anyhow!("no more mock responses")))
        })
    }

    fn metadata(&self) -> ClientMetadata {
        ClientMetadata {
            provider: "Mock".to_string(),
            model: "mock-model".to_string(),
        }
    }
}
