//! Pipeline orchestration.
//!
//! One invocation runs a single sequential pass: extract the repository
//! context, build the prompt, call the completion service (the only
//! suspension point), and parse the response. Mutation and printing stay
//! with the subcommands; nothing here touches the repository.

use anyhow::Result;
use tracing::debug;

use crate::ai::{build_prompt, parse::parse_response, retry::retry_transient, CompletionClient, ModelResponse};
use crate::data::{Mode, OperationResult, RepositoryContext};
use crate::git::extract::ExtractOptions;
use crate::git::{extract_context, GitRepository};

/// Runs the read-only half of the pipeline for one invocation.
pub async fn generate(
    repo: &GitRepository,
    mode: Mode,
    opts: &ExtractOptions,
    client: &dyn CompletionClient,
) -> Result<OperationResult> {
    let context = extract_context(repo, mode, opts)?;
    generate_from_context(&context, client).await
}

/// Prompt, completion, and parse for an already extracted context.
pub async fn generate_from_context(
    context: &RepositoryContext,
    client: &dyn CompletionClient,
) -> Result<OperationResult> {
    let prompt = build_prompt(context);
    debug!(
        mode = %context.mode,
        payload_len = prompt.payload.len(),
        "Dispatching completion request"
    );

    let raw = retry_transient(|| client.complete(&prompt)).await?;
    let response = ModelResponse::new(raw);

    parse_response(context.mode, &response.raw_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::test_utils::MockCompletionClient;
    use crate::data::CommitMessage;
    use crate::error::ScribeError;

    fn context(mode: Mode) -> RepositoryContext {
        RepositoryContext {
            mode,
            diff_text: "+hello\n-world\n".to_string(),
            base_ref: None,
            head_ref: "HEAD".to_string(),
            staged_only: false,
            prior_commit_message: match mode {
                Mode::Check | Mode::Fixup => Some("old message\n".to_string()),
                _ => None,
            },
            commit_log: Vec::new(),
        }
    }

    #[tokio::test]
    async fn write_scenario_produces_title_and_body() {
        let client = MockCompletionClient::new(vec![Ok(
            "Fix greeting\n\nReplace world with hello".to_string()
        )]);
        let result = generate_from_context(&context(Mode::Write), &client)
            .await
            .unwrap();
        assert_eq!(
            result,
            OperationResult::Message(CommitMessage {
                title: "Fix greeting".to_string(),
                body: Some("Replace world with hello".to_string()),
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn two_transient_failures_yield_one_logical_result() {
        let client = MockCompletionClient::new(vec![
            Err(ScribeError::ServiceUnavailable("503".to_string()).into()),
            Err(ScribeError::ServiceUnavailable("timeout".to_string()).into()),
            Ok("Fix greeting\n".to_string()),
        ]);
        let handle = client.prompt_handle();

        let result = generate_from_context(&context(Mode::Write), &client)
            .await
            .unwrap();

        assert!(matches!(result, OperationResult::Message(_)));
        assert_eq!(handle.request_count(), 3);
        // Identical prompt on every attempt: one logical request.
        let prompts = handle.prompts();
        assert!(prompts.windows(2).all(|w| w[0] == w[1]));
    }

    #[tokio::test]
    async fn auth_failure_surfaces_without_retry() {
        let client = MockCompletionClient::new(vec![
            Err(ScribeError::AuthFailure("bad key".to_string()).into()),
            Ok("never reached\n".to_string()),
        ]);
        let handle = client.prompt_handle();

        let err = generate_from_context(&context(Mode::Write), &client)
            .await
            .unwrap_err();

        assert_eq!(crate::error::exit_code_for(&err), 4);
        assert_eq!(handle.request_count(), 1);
    }

    #[tokio::test]
    async fn check_mode_passes_prior_message_through_prompt() {
        let client = MockCompletionClient::new(vec![Ok("Looks fine.".to_string())]);
        let handle = client.prompt_handle();

        let result = generate_from_context(&context(Mode::Check), &client)
            .await
            .unwrap();

        assert_eq!(
            result,
            OperationResult::Suggestion {
                text: "Looks fine.".to_string(),
                problem: false,
            }
        );
        assert!(handle.prompts()[0].payload.contains("old message"));
    }
}
