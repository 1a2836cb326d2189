//! Response parsing: raw model text into a structured result.
//!
//! Models decorate their output in predictable ways: code fences, a
//! leading `Title:` label, stray blank lines, CRLF endings. All of that is
//! stripped heuristically; only the genuine absence of a usable title is an
//! error.

use std::sync::OnceLock;

use anyhow::Result;
use regex::Regex;

use crate::data::{CommitMessage, Mode, OperationResult, SummaryResult};
use crate::error::ScribeError;

/// First line a check-mode response uses to flag a broken message.
const ERROR_VERDICT: &str = "ERROR";

/// Parses a raw model response according to the command mode.
pub fn parse_response(mode: Mode, raw: &str) -> Result<OperationResult> {
    let normalized = raw.replace("\r\n", "\n");

    match mode {
        Mode::Check => parse_suggestion(&normalized),
        Mode::Write | Mode::Fixup => {
            let message = split_message(&normalized).ok_or_else(|| {
                ScribeError::UnparseableResponse("no usable title line".to_string())
            })?;
            Ok(OperationResult::Message(message))
        }
        Mode::Summary => {
            let message = split_message(&normalized).ok_or_else(|| {
                ScribeError::UnparseableResponse("no usable title line".to_string())
            })?;
            Ok(OperationResult::Summary(SummaryResult {
                title: message.title,
                description: message.body.unwrap_or_default(),
            }))
        }
    }
}

/// Check mode: the whole response is free-form feedback.
fn parse_suggestion(text: &str) -> Result<OperationResult> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ScribeError::UnparseableResponse("empty suggestion".to_string()).into());
    }

    // A distinguished first line marks a message the model considers wrong.
    let mut lines = trimmed.lines();
    if lines.next().map(str::trim) == Some(ERROR_VERDICT) {
        let rest = lines.collect::<Vec<_>>().join("\n").trim().to_string();
        return Ok(OperationResult::Suggestion {
            text: if rest.is_empty() {
                trimmed.to_string()
            } else {
                rest
            },
            problem: true,
        });
    }

    Ok(OperationResult::Suggestion {
        text: trimmed.to_string(),
        problem: false,
    })
}

/// Splits decorated model output into title and body.
///
/// Returns `None` when no non-blank line survives the stripping.
fn split_message(text: &str) -> Option<CommitMessage> {
    let inner = strip_fences(text);

    let mut lines = inner.lines();
    let title = loop {
        let line = lines.next()?;
        let stripped = strip_label(line).trim_end();
        if !stripped.trim().is_empty() {
            break stripped.trim_start().to_string();
        }
    };

    let body_lines: Vec<&str> = lines.map(str::trim_end).collect();
    let body = body_lines.join("\n");
    let body = body.trim_matches('\n');

    Some(CommitMessage {
        title,
        body: if body.is_empty() {
            None
        } else {
            Some(body.to_string())
        },
    })
}

/// Unwraps a response wrapped in a markdown code fence.
fn strip_fences(text: &str) -> &str {
    let trimmed = text.trim();
    if let Some(rest) = trimmed.strip_prefix("```") {
        // Skip the fence info string, keep everything up to the closing fence.
        if let Some(nl) = rest.find('\n') {
            let inner = &rest[nl + 1..];
            if let Some(end) = inner.rfind("```") {
                return &inner[..end];
            }
        }
    }
    trimmed
}

/// Drops a leading `Title:`-style label from a line.
fn strip_label(line: &str) -> &str {
    static LABEL: OnceLock<Regex> = OnceLock::new();
    let re = LABEL.get_or_init(|| {
        #[allow(clippy::expect_used)]
        let re = Regex::new(r"(?i)^\s*(?:title|subject|commit message)\s*:\s*")
            .expect("label pattern is valid");
        re
    });
    match re.find(line) {
        Some(m) => &line[m.end()..],
        None => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_message(raw: &str) -> CommitMessage {
        match parse_response(Mode::Write, raw).unwrap() {
            OperationResult::Message(msg) => msg,
            other => panic!("expected message, got {other:?}"),
        }
    }

    #[test]
    fn plain_title_and_body() {
        let msg = parse_message("Fix greeting\n\nReplace world with hello");
        assert_eq!(msg.title, "Fix greeting");
        assert_eq!(msg.body.as_deref(), Some("Replace world with hello"));
    }

    #[test]
    fn title_only() {
        let msg = parse_message("Fix greeting\n");
        assert_eq!(msg.title, "Fix greeting");
        assert_eq!(msg.body, None);
    }

    #[test]
    fn crlf_and_extra_blank_lines_are_tolerated() {
        let msg = parse_message("\r\n\r\nFix greeting\r\n\r\n\r\nBody line\r\n\r\n");
        assert_eq!(msg.title, "Fix greeting");
        assert_eq!(msg.body.as_deref(), Some("Body line"));
    }

    #[test]
    fn code_fence_is_stripped() {
        let msg = parse_message("```\nFix greeting\n\nBody here\n```");
        assert_eq!(msg.title, "Fix greeting");
        assert_eq!(msg.body.as_deref(), Some("Body here"));
    }

    #[test]
    fn fence_with_info_string_is_stripped() {
        let msg = parse_message("```text\nFix greeting\n```");
        assert_eq!(msg.title, "Fix greeting");
        assert_eq!(msg.body, None);
    }

    #[test]
    fn leading_label_is_stripped() {
        let msg = parse_message("Title: Fix greeting\n\nBody");
        assert_eq!(msg.title, "Fix greeting");
    }

    #[test]
    fn label_on_its_own_line_falls_through_to_next() {
        let msg = parse_message("Title:\nFix greeting\n");
        assert_eq!(msg.title, "Fix greeting");
    }

    #[test]
    fn blank_response_is_unparseable() {
        let err = parse_response(Mode::Write, "\n\n  \n").unwrap_err();
        assert_eq!(crate::error::exit_code_for(&err), 7);
    }

    #[test]
    fn multi_paragraph_body_is_preserved() {
        let msg = parse_message("Add cache\n\nFirst paragraph.\n\nSecond paragraph.\n");
        assert_eq!(
            msg.body.as_deref(),
            Some("First paragraph.\n\nSecond paragraph.")
        );
    }

    #[test]
    fn check_suggestion_passes_through() {
        let result = parse_response(Mode::Check, "Looks accurate; consider a scope.\n").unwrap();
        assert_eq!(
            result,
            OperationResult::Suggestion {
                text: "Looks accurate; consider a scope.".to_string(),
                problem: false,
            }
        );
    }

    #[test]
    fn check_error_verdict_is_flagged() {
        let result =
            parse_response(Mode::Check, "ERROR\nThe message claims a revert.\n").unwrap();
        assert_eq!(
            result,
            OperationResult::Suggestion {
                text: "The message claims a revert.".to_string(),
                problem: true,
            }
        );
    }

    #[test]
    fn empty_check_response_is_unparseable() {
        let err = parse_response(Mode::Check, "   ").unwrap_err();
        assert_eq!(crate::error::exit_code_for(&err), 7);
    }

    #[test]
    fn summary_maps_to_title_and_description() {
        let result =
            parse_response(Mode::Summary, "Add retry layer\n\nRetries transient failures.\n")
                .unwrap();
        assert_eq!(
            result,
            OperationResult::Summary(SummaryResult {
                title: "Add retry layer".to_string(),
                description: "Retries transient failures.".to_string(),
            })
        );
    }
}
