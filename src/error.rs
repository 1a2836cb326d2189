//! Error taxonomy and exit-code mapping.

use thiserror::Error;

/// Errors surfaced by the scribe pipeline.
///
/// Every variant maps to its own process exit code so scripts can
/// distinguish "nothing to do" from a service outage from a genuine git
/// problem. The variants are carried through `anyhow` chains and recovered
/// by [`exit_code_for`] at the top level.
#[derive(Error, Debug)]
pub enum ScribeError {
    /// The requested diff is empty; there is nothing to describe.
    #[error("no changes found: {0}")]
    NoChanges(String),

    /// The summary base ref is not an ancestor of the head ref.
    #[error("invalid range: {0}")]
    InvalidRange(String),

    /// A git query or mutation failed.
    #[error("git operation failed: {0}")]
    GitFailure(String),

    /// Missing or rejected API credentials.
    #[error("authentication failed: {0}")]
    AuthFailure(String),

    /// The completion service rejected the request as malformed.
    #[error("request rejected by completion service: {0}")]
    RequestRejected(String),

    /// Transient failures persisted through every retry attempt.
    #[error("completion service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The model response carried no usable structure.
    #[error("could not parse model response: {0}")]
    UnparseableResponse(String),

    /// The user aborted an interactive step; nothing was mutated.
    #[error("cancelled")]
    UserCancelled,
}

impl ScribeError {
    /// Process exit code for this error kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::GitFailure(_) => 1,
            Self::NoChanges(_) => 2,
            Self::InvalidRange(_) => 3,
            Self::AuthFailure(_) => 4,
            Self::RequestRejected(_) => 5,
            Self::ServiceUnavailable(_) => 6,
            Self::UnparseableResponse(_) => 7,
            Self::UserCancelled => 10,
        }
    }

    /// Whether the error is expected to resolve on retry.
    ///
    /// Only the completion client consults this; repository-state errors
    /// are never retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ServiceUnavailable(_))
    }
}

/// Recovers the exit code from an `anyhow` chain.
///
/// Walks the chain looking for a [`ScribeError`]; anything else (I/O,
/// serde, git2 internals) exits 1.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<ScribeError>())
        .map_or(1, ScribeError::exit_code)
}

/// Whether the error should be reported with an `error:` prefix.
///
/// User cancellation short-circuits the pipeline but is not a failure.
pub fn is_failure(err: &anyhow::Error) -> bool {
    !err.chain()
        .any(|cause| matches!(cause.downcast_ref::<ScribeError>(), Some(ScribeError::UserCancelled)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let errors = [
            ScribeError::NoChanges(String::new()),
            ScribeError::InvalidRange(String::new()),
            ScribeError::GitFailure(String::new()),
            ScribeError::AuthFailure(String::new()),
            ScribeError::RequestRejected(String::new()),
            ScribeError::ServiceUnavailable(String::new()),
            ScribeError::UnparseableResponse(String::new()),
            ScribeError::UserCancelled,
        ];
        let mut codes: Vec<i32> = errors.iter().map(ScribeError::exit_code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
        assert!(codes.iter().all(|&c| c != 0));
    }

    #[test]
    fn exit_code_recovered_through_context() {
        let err = anyhow::Error::new(ScribeError::NoChanges("working tree".to_string()))
            .context("while extracting diff");
        assert_eq!(exit_code_for(&err), 2);
    }

    #[test]
    fn unknown_errors_exit_one() {
        let err = anyhow::anyhow!("disk on fire");
        assert_eq!(exit_code_for(&err), 1);
    }

    #[test]
    fn cancellation_is_not_a_failure() {
        let err = anyhow::Error::new(ScribeError::UserCancelled);
        assert!(!is_failure(&err));
        let err = anyhow::Error::new(ScribeError::GitFailure("boom".to_string()));
        assert!(is_failure(&err));
    }
}
