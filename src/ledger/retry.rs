//! Concurrency coordinator
//!
//! Bounded retry around a unit of work. Only transient storage conflicts
//! are retried; business errors pass through on the first attempt. Each
//! retry runs a fresh attempt, so nothing is held across attempts.

use std::future::Future;
use std::time::Duration;

use super::LedgerError;

/// Base delay between attempts; grows linearly with the attempt number.
const RETRY_BACKOFF: Duration = Duration::from_millis(25);

/// Run `op` up to `max_attempts` times.
///
/// Returns the first non-transient result. If every attempt fails with a
/// transient conflict, returns [`LedgerError::RetriesExhausted`].
pub async fn run_with_retry<T, F, Fut>(max_attempts: u32, mut op: F) -> Result<T, LedgerError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LedgerError>>,
{
    let max_attempts = max_attempts.max(1);

    for attempt in 1..=max_attempts {
        match op().await {
            Err(err) if err.is_transient() && attempt < max_attempts => {
                let delay = RETRY_BACKOFF * attempt;
                tracing::warn!(
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "transient conflict, retrying unit of work"
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) if err.is_transient() => {
                return Err(LedgerError::RetriesExhausted {
                    attempts: max_attempts,
                });
            }
            other => return other,
        }
    }

    unreachable!("loop returns on every path")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let calls = AtomicU32::new(0);
        let result = run_with_retry(3, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, LedgerError>(42) }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_transient_then_succeeds() {
        let calls = AtomicU32::new(0);
        let result = run_with_retry(5, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(LedgerError::TransientConflict)
                } else {
                    Ok(7)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_business_errors_pass_through_without_retry() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = run_with_retry(5, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(LedgerError::InsufficientFunds {
                    account_id: 1,
                    balance: 100,
                    requested: 500,
                })
            }
        })
        .await;

        assert!(matches!(
            result.unwrap_err(),
            LedgerError::InsufficientFunds { .. }
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_exhaustion_reports_attempt_count() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = run_with_retry(3, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(LedgerError::TransientConflict) }
        })
        .await;

        assert!(matches!(
            result.unwrap_err(),
            LedgerError::RetriesExhausted { attempts: 3 }
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_zero_attempts_still_runs_once() {
        let calls = AtomicU32::new(0);
        let result = run_with_retry(0, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, LedgerError>(()) }
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
