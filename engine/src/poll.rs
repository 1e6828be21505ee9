//! Retry helpers for the engine's eventually consistent query side.
//!
//! Commands are acknowledged before their effects are visible through the
//! query endpoints, so scenarios wait for the expected state instead of
//! sleeping a fixed amount of time.

use crate::config::PollPolicy;
use crate::service::{EngineError, EngineResult};
use std::future::Future;
use tokio::time::sleep;
use tracing::debug;

/// Repeats `op` until it returns `Ok`, at most `policy.attempts` times.
///
/// The error of the final attempt is carried in [`EngineError::PollTimeout`].
pub async fn poll_until<T, F, Fut>(what: &str, policy: PollPolicy, mut op: F) -> EngineResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = EngineResult<T>>,
{
    let mut attempts = 0u32;
    loop {
        attempts = attempts.saturating_add(1);
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempts >= policy.attempts {
                    return Err(EngineError::PollTimeout {
                        what: what.to_string(),
                        attempts,
                        last_error: err.to_string(),
                    });
                }
                debug!("Waiting for {} (attempt {}): {}", what, attempts, err);
                sleep(policy.interval).await;
            }
        }
    }
}

/// Repeats `op` until the engine rejects it with `expected` status.
///
/// Used to wait until an archived or deleted resource is no longer served.
pub async fn poll_until_status<T, F, Fut>(
    what: &str,
    policy: PollPolicy,
    expected: u16,
    mut op: F,
) -> EngineResult<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = EngineResult<T>>,
{
    poll_until(what, policy, || {
        let attempt = op();
        async move {
            match attempt.await {
                Err(err) if err.status() == Some(expected) => Ok(()),
                Err(err) => Err(err),
                Ok(_) => Err(EngineError::Pending {
                    message: format!("request still succeeds, expected status {}", expected),
                }),
            }
        }
    })
    .await
}
