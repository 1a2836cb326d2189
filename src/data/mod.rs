//! Value types flowing through the pipeline.
//!
//! A [`RepositoryContext`] is built once per invocation from live git state
//! and never mutated afterwards; everything downstream produces new values.

use std::fmt;

/// Command mode.
///
/// A closed set: every component switches on this explicitly so the whole
/// state machine stays auditable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Generate a commit message for uncommitted changes and commit them.
    Write,
    /// Review the most recent commit's message and print a suggestion.
    Check,
    /// Rewrite the most recent commit's message in place.
    Fixup,
    /// Summarize a commit range as a pull-request title and description.
    Summary,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Write => write!(f, "write"),
            Self::Check => write!(f, "check"),
            Self::Fixup => write!(f, "fixup"),
            Self::Summary => write!(f, "summary"),
        }
    }
}

/// One commit inside a summary range, oldest first.
#[derive(Debug, Clone)]
pub struct CommitEntry {
    /// Full SHA-1 hash.
    pub hash: String,
    /// The commit message as written.
    pub message: String,
    /// Patch introduced by this commit.
    pub diff: String,
}

/// Read-only snapshot of the repository state relevant to one invocation.
#[derive(Debug, Clone)]
pub struct RepositoryContext {
    /// The command mode this context was extracted for.
    pub mode: Mode,
    /// Diff text for the mode (combined diff in summary mode).
    pub diff_text: String,
    /// Base ref of a summary range.
    pub base_ref: Option<String>,
    /// Head ref; `HEAD` unless overridden.
    pub head_ref: String,
    /// Whether write mode is limited to staged changes.
    pub staged_only: bool,
    /// Existing message of the commit under review (check/fixup).
    pub prior_commit_message: Option<String>,
    /// Every commit in `(base, head]` for summary mode, oldest first.
    pub commit_log: Vec<CommitEntry>,
}

/// A parsed commit message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMessage {
    /// First line. Never empty on the success path.
    pub title: String,
    /// Remaining lines, if any.
    pub body: Option<String>,
}

impl CommitMessage {
    /// Renders the message as git expects it: title, blank line, body.
    pub fn render(&self) -> String {
        match &self.body {
            Some(body) => format!("{}\n\n{}", self.title, body),
            None => self.title.clone(),
        }
    }
}

/// A parsed pull-request summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryResult {
    /// Suggested pull-request title.
    pub title: String,
    /// Suggested pull-request description.
    pub description: String,
}

/// Outcome of parsing a model response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationResult {
    /// A usable commit message (write/fixup).
    Message(CommitMessage),
    /// A usable pull-request summary.
    Summary(SummaryResult),
    /// Free-form review feedback (check mode). `problem` is set when the
    /// model flagged the existing message as wrong.
    Suggestion {
        /// The suggestion text.
        text: String,
        /// Whether the model reported a genuine problem.
        problem: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_title_only() {
        let msg = CommitMessage {
            title: "Fix greeting".to_string(),
            body: None,
        };
        assert_eq!(msg.render(), "Fix greeting");
    }

    #[test]
    fn render_with_body() {
        let msg = CommitMessage {
            title: "Fix greeting".to_string(),
            body: Some("Replace world with hello".to_string()),
        };
        assert_eq!(msg.render(), "Fix greeting\n\nReplace world with hello");
    }

    #[test]
    fn mode_display_matches_cli_names() {
        assert_eq!(Mode::Write.to_string(), "write");
        assert_eq!(Mode::Summary.to_string(), "summary");
    }
}
