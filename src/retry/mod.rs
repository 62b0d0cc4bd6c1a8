//! Bounded retry for readiness probes.
//!
//! # Responsibilities
//! - Turn a single fallible probe (database ping, cache ping, any readiness
//!   check) into a bounded-retry loop for waiting out transient
//!   unavailability at process startup
//! - Provide a fixed-budget startup gate that aborts the process on failure
//!
//! # Design Decisions
//! - Fixed inter-attempt delay, no jitter: the budget is small and the caller
//!   is a startup path, not a request path
//! - Only the most recent failure is returned; it is the most diagnostically
//!   relevant one
//! - No cancellation hook: the loop cannot be interrupted mid-sleep. Callers
//!   needing a deadline must race the future against an external timer.

use std::fmt;
use std::time::Duration;

/// Retry budget used by [`ensure_ready`]: two retries after the first attempt.
pub const DEFAULT_MAX_TRIES: u32 = 2;
/// Delay between attempts used by [`ensure_ready`].
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(3);

/// Invoke `probe` until it succeeds or the retry budget is spent.
///
/// `max_tries` bounds the retries *after* the first attempt, so the probe runs
/// at most `max_tries + 1` times; `max_tries == 0` means a single attempt.
/// Sleeps `delay` between failing attempts (zero is allowed). On exhaustion
/// the error from the last attempt is returned.
pub async fn check_and_retry<F, Fut, E>(
    mut probe: F,
    max_tries: u32,
    delay: Duration,
) -> Result<(), E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<(), E>>,
    E: fmt::Display,
{
    let mut tries: u32 = 0;
    loop {
        match probe().await {
            Ok(()) => return Ok(()),
            Err(err) => {
                if tries >= max_tries {
                    return Err(err);
                }
                tries += 1;
                tracing::warn!(
                    error = %err,
                    attempt = tries,
                    wait = ?delay,
                    "probe failed, retrying after delay"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Startup gate: probe with the default budget (2 retries, 3s apart) and
/// panic if the resource never becomes ready.
///
/// Intended for the main initialization path before request serving begins.
/// Never call this from a request handler; it blocks its task for the full
/// retry budget and a failed probe takes the whole process down.
pub async fn ensure_ready<F, Fut, E>(probe: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<(), E>>,
    E: fmt::Display,
{
    if let Err(err) = check_and_retry(probe, DEFAULT_MAX_TRIES, DEFAULT_RETRY_DELAY).await {
        tracing::error!(error = %err, "resource did not become ready");
        panic!("resource did not become ready: {err}");
    }
}
