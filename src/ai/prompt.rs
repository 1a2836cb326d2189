//! Prompt assembly: mode-specific instructions plus a bounded payload.
//!
//! `build_prompt` is a pure function; identical contexts produce identical
//! prompts. Oversized payloads are truncated from the middle so both the
//! leading file headers and the trailing hunks survive, and the cut is
//! always marked explicitly.

use std::fmt::Write as _;

use crate::data::{Mode, RepositoryContext};

/// Maximum payload size in bytes before truncation kicks in.
pub const MAX_PAYLOAD_BYTES: usize = 96 * 1024;

/// Instructions for generating a fresh commit message from a diff.
const WRITE_INSTRUCTIONS: &str = "Write a git commit message for the following patch. \
     Use the imperative mood. Explain why the change is made, not what was changed. \
     Keep the first line below 52 columns and the following lines under 72 columns, \
     with a blank line between the first line and the body. \
     Return only the commit message without any other information nor any delimiter.";

/// Instructions for reviewing an existing commit message.
const CHECK_INSTRUCTIONS: &str = "Report any mistake you see in the commit message below, \
     comparing it against the patch it describes. \
     If the message contains a significant error or discrepancy, the first line of your \
     reply must contain only the string ERROR and nothing more. \
     Ignore the date and the author information, look only at the commit message. \
     Explain carefully what changes you suggest.";

/// Instructions for rewriting an existing commit message.
const FIXUP_INSTRUCTIONS: &str = "Improve the git commit message below and add any missing \
     information you get from the patch. \
     Explain why the change is done, not what was changed. \
     Keep the first line below 52 columns and the following lines under 72 columns. \
     Leave unchanged any signed-off line or any other trailer. \
     Return only the git commit message without any other information nor any delimiter.";

/// Instructions for summarizing a commit range as a pull request.
const SUMMARY_INSTRUCTIONS: &str = "Propose a pull-request title and description for the \
     following series of commits. Each commit is shown with its message and its patch. \
     The first line of your reply is the title; after a blank line, the rest is the \
     description. Return nothing else.";

/// A fully assembled prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// Mode-specific instruction header, sent as the system prompt.
    pub instructions: String,
    /// Diff/context payload, already bounded by [`MAX_PAYLOAD_BYTES`].
    pub payload: String,
}

/// Builds the prompt for a context.
///
/// An empty diff here is a contract violation by the extractor, not a
/// runtime condition; the builder does not re-validate it.
pub fn build_prompt(context: &RepositoryContext) -> Prompt {
    let instructions = match context.mode {
        Mode::Write => WRITE_INSTRUCTIONS,
        Mode::Check => CHECK_INSTRUCTIONS,
        Mode::Fixup => FIXUP_INSTRUCTIONS,
        Mode::Summary => SUMMARY_INSTRUCTIONS,
    };

    let payload = match context.mode {
        Mode::Write => context.diff_text.clone(),
        Mode::Check | Mode::Fixup => {
            let prior = context.prior_commit_message.as_deref().unwrap_or("");
            format!("Commit message:\n{prior}\nPatch:\n{}", context.diff_text)
        }
        Mode::Summary => {
            let mut payload = String::new();
            for entry in &context.commit_log {
                let _ = writeln!(payload, "commit {}", entry.hash);
                let _ = writeln!(payload, "{}", entry.message.trim_end());
                let _ = writeln!(payload, "\n{}", entry.diff);
            }
            payload
        }
    };

    Prompt {
        instructions: instructions.to_string(),
        payload: truncate_middle(&payload, MAX_PAYLOAD_BYTES),
    }
}

/// Truncates `text` to at most `max_bytes` payload bytes, cutting from the
/// middle and inserting a single marker naming the omitted byte count.
///
/// Head and tail are kept because leading file headers and trailing hunks
/// both carry signal. Cut points are snapped to char boundaries, which can
/// only shrink the kept text, so the bound still holds.
fn truncate_middle(text: &str, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text.to_string();
    }

    let head_end = floor_char_boundary(text, max_bytes / 2);
    let tail_len = max_bytes - head_end;
    let tail_start = ceil_char_boundary(text, text.len() - tail_len);
    let omitted = tail_start - head_end;

    format!(
        "{}\n[... truncated {omitted} bytes ...]\n{}",
        &text[..head_end],
        &text[tail_start..]
    )
}

/// Largest char boundary at or below `index`.
fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    while index > 0 && !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Smallest char boundary at or above `index`.
fn ceil_char_boundary(s: &str, mut index: usize) -> usize {
    while index < s.len() && !s.is_char_boundary(index) {
        index += 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::data::CommitEntry;

    fn write_context(diff: &str) -> RepositoryContext {
        RepositoryContext {
            mode: Mode::Write,
            diff_text: diff.to_string(),
            base_ref: None,
            head_ref: "HEAD".to_string(),
            staged_only: false,
            prior_commit_message: None,
            commit_log: Vec::new(),
        }
    }

    fn marker_count(s: &str) -> usize {
        s.matches("[... truncated ").count()
    }

    #[test]
    fn build_is_deterministic() {
        let ctx = write_context("+hello\n-world\n");
        assert_eq!(build_prompt(&ctx), build_prompt(&ctx));
    }

    #[test]
    fn small_payload_passes_through_unmarked() {
        let ctx = write_context("+hello\n-world\n");
        let prompt = build_prompt(&ctx);
        assert_eq!(prompt.payload, "+hello\n-world\n");
        assert_eq!(marker_count(&prompt.payload), 0);
    }

    #[test]
    fn check_payload_includes_prior_message() {
        let mut ctx = write_context("+x\n");
        ctx.mode = Mode::Check;
        ctx.prior_commit_message = Some("old title\n\nold body\n".to_string());
        let prompt = build_prompt(&ctx);
        assert!(prompt.payload.contains("old title"));
        assert!(prompt.payload.contains("Patch:\n+x\n"));
    }

    #[test]
    fn summary_payload_interleaves_messages_and_diffs() {
        let mut ctx = write_context("+combined\n");
        ctx.mode = Mode::Summary;
        ctx.commit_log = vec![
            CommitEntry {
                hash: "a".repeat(40),
                message: "first change".to_string(),
                diff: "+one\n".to_string(),
            },
            CommitEntry {
                hash: "b".repeat(40),
                message: "second change".to_string(),
                diff: "+two\n".to_string(),
            },
        ];
        let prompt = build_prompt(&ctx);
        let first_msg = prompt.payload.find("first change").unwrap();
        let first_diff = prompt.payload.find("+one").unwrap();
        let second_msg = prompt.payload.find("second change").unwrap();
        assert!(first_msg < first_diff && first_diff < second_msg);
    }

    #[test]
    fn oversized_payload_gets_exactly_one_marker() {
        let big = "x".repeat(MAX_PAYLOAD_BYTES + 10_000);
        let out = truncate_middle(&big, MAX_PAYLOAD_BYTES);
        assert_eq!(marker_count(&out), 1);
        assert!(out.contains("truncated 10000 bytes"));
    }

    #[test]
    fn truncation_respects_multibyte_boundaries() {
        let big = "é".repeat(MAX_PAYLOAD_BYTES);
        let out = truncate_middle(&big, 1001);
        assert_eq!(marker_count(&out), 1);
        // Would panic on a non-boundary slice; reaching here is the point.
        assert!(out.len() <= 1001 + 64);
    }

    proptest! {
        #[test]
        fn truncated_length_is_bounded(text in ".{0,4000}", cap in 16usize..2048) {
            let out = truncate_middle(&text, cap);
            // Marker length: fixed text plus the omitted-byte count digits.
            prop_assert!(out.len() <= cap + 64);
            if text.len() <= cap {
                prop_assert_eq!(&out, &text);
            } else {
                prop_assert_eq!(marker_count(&out), 1);
            }
        }
    }
}
