//! Context extraction: turns a command mode plus repository state into a
//! read-only [`RepositoryContext`].

use anyhow::Result;
use tracing::debug;

use crate::data::{Mode, RepositoryContext};
use crate::error::ScribeError;
use crate::git::GitRepository;

/// Options controlling what gets extracted.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Limit write mode to staged changes.
    pub staged_only: bool,
    /// Base ref of a summary range. Required for summary mode.
    pub base_ref: Option<String>,
    /// Head ref override; defaults to `HEAD`.
    pub head_ref: Option<String>,
}

/// Builds the repository context for one invocation.
///
/// Performs read-only git queries only. Fails with
/// [`ScribeError::NoChanges`] when the relevant diff is empty, with
/// [`ScribeError::InvalidRange`] when a summary base is not an ancestor of
/// the head, and with [`ScribeError::GitFailure`] for everything the
/// repository refuses to answer.
pub fn extract_context(
    repo: &GitRepository,
    mode: Mode,
    opts: &ExtractOptions,
) -> Result<RepositoryContext> {
    let head_ref = opts.head_ref.clone().unwrap_or_else(|| "HEAD".to_string());

    match mode {
        Mode::Write => {
            let diff_text = if opts.staged_only {
                repo.staged_diff()?
            } else {
                repo.working_tree_diff()?
            };
            if diff_text.is_empty() {
                let what = if opts.staged_only {
                    "no staged changes"
                } else {
                    "working tree matches HEAD"
                };
                return Err(ScribeError::NoChanges(what.to_string()).into());
            }
            debug!(bytes = diff_text.len(), staged_only = opts.staged_only, "Extracted write diff");
            Ok(RepositoryContext {
                mode,
                diff_text,
                base_ref: None,
                head_ref,
                staged_only: opts.staged_only,
                prior_commit_message: None,
                commit_log: Vec::new(),
            })
        }
        Mode::Check | Mode::Fixup => {
            let head = repo.head_commit()?;
            let diff_text = repo.commit_diff(&head)?;
            if diff_text.is_empty() {
                return Err(ScribeError::NoChanges("HEAD commit is empty".to_string()).into());
            }
            let prior = repo.head_message()?;
            Ok(RepositoryContext {
                mode,
                diff_text,
                base_ref: None,
                head_ref,
                staged_only: false,
                prior_commit_message: Some(prior),
                commit_log: Vec::new(),
            })
        }
        Mode::Summary => {
            let base_spec = opts
                .base_ref
                .as_deref()
                .ok_or_else(|| ScribeError::InvalidRange("no base ref given".to_string()))?;

            let base = repo.resolve_ref(base_spec)?;
            let head = repo.resolve_ref(&head_ref)?;

            if !repo.is_ancestor(base, head)? {
                return Err(ScribeError::InvalidRange(format!(
                    "'{base_spec}' is not an ancestor of '{head_ref}'"
                ))
                .into());
            }

            let commit_log = repo.commits_in_range(base, head)?;
            if commit_log.is_empty() {
                return Err(
                    ScribeError::NoChanges(format!("no commits in {base_spec}..{head_ref}")).into(),
                );
            }

            let diff_text = repo.range_diff(base, head)?;
            debug!(
                commits = commit_log.len(),
                bytes = diff_text.len(),
                "Extracted summary range"
            );
            Ok(RepositoryContext {
                mode,
                diff_text,
                base_ref: Some(base_spec.to_string()),
                head_ref,
                staged_only: false,
                prior_commit_message: None,
                commit_log,
            })
        }
    }
}
