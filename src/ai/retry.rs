//! Exponential backoff retry for completion requests.
//!
//! Only transiently classified failures are re-attempted; repository-state
//! and authentication errors surface immediately.

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use tracing::debug;

use crate::error::ScribeError;

/// Total attempts, including the first.
pub const MAX_ATTEMPTS: u32 = 3;
const INITIAL_INTERVAL_SECS: u64 = 1;
const MAX_INTERVAL_SECS: u64 = 30;

/// Whether an error chain is worth retrying.
fn is_transient(err: &anyhow::Error) -> bool {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<ScribeError>())
        .is_some_and(ScribeError::is_transient)
}

/// Runs `attempt` up to [`MAX_ATTEMPTS`] times with exponential backoff.
///
/// A non-transient failure is returned on the spot. When every attempt
/// fails transiently, the last error is returned with a note about the
/// exhausted retries.
pub async fn retry_transient<T, Fut, F>(mut attempt: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut backoff = ExponentialBackoff {
        initial_interval: Duration::from_secs(INITIAL_INTERVAL_SECS),
        max_interval: Duration::from_secs(MAX_INTERVAL_SECS),
        max_elapsed_time: None,
        ..Default::default()
    };

    let mut attempts = 0;
    let mut last_error = None;

    while attempts < MAX_ATTEMPTS {
        attempts += 1;

        match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if !is_transient(&e) {
                    return Err(e);
                }
                debug!(attempt = attempts, error = %e, "Transient completion failure");
                last_error = Some(e);

                if attempts < MAX_ATTEMPTS {
                    if let Some(wait) = backoff.next_backoff() {
                        tokio::time::sleep(wait).await;
                    }
                }
            }
        }
    }

    match last_error {
        Some(e) => Err(e.context(format!("giving up after {MAX_ATTEMPTS} attempts"))),
        // MAX_ATTEMPTS is non-zero, so the loop ran at least once.
        None => Err(anyhow::anyhow!("retry loop made no attempts")),
    }
}
