//! Retry Scheduler
//!
//! Re-runs a whole read-modify-conditional-write attempt after a fixed delay
//! whenever its conditional write loses a race. Nothing carries over between
//! attempts except the closure's captured arguments: every attempt starts by
//! re-reading the stored value, so re-entry is always safe.
//!
//! There is no attempt cap and no backoff growth. Under sustained contention
//! on a single key an operation can wait arbitrarily long.

use super::errors::MapError;

use std::future::Future;
use std::time::Duration;

/// Delay between attempts unless the map is configured otherwise.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(10);

/// Result of a single attempt.
#[derive(Debug, PartialEq, Eq)]
pub enum Attempt<T> {
    Done(T),
    /// The conditional write found a different value than the one read.
    Conflict,
}

/// Runs `attempt` until it finishes or fails.
///
/// The wait between attempts is a timer suspension on the runtime, so the
/// worker thread is free to run other tasks in the gap.
pub async fn retry_on_conflict<T, F, Fut>(
    key: &str,
    delay: Duration,
    mut attempt: F,
) -> Result<T, MapError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Attempt<T>, MapError>>,
{
    let mut conflicts: u64 = 0;
    loop {
        match attempt().await? {
            Attempt::Done(value) => {
                if conflicts > 0 {
                    tracing::debug!("Write to {} succeeded after {} conflicts", key, conflicts);
                }
                return Ok(value);
            }
            Attempt::Conflict => {
                conflicts += 1;
                tracing::debug!(
                    "Conflicting write on {} (attempt {}), retrying in {:?}",
                    key,
                    conflicts,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
