use std::time::Duration;

use futures::future::BoxFuture;

use crate::app::TransactionConfig;
use crate::constants::{DEFAULT_BACKOFF_MS, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_COMMIT_TIME_SECS};
use crate::errors::CourseError;
use crate::transaction::store::{Store, Transaction};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Backoff step, the wait after attempt `n` is `backoff * n`.
    pub backoff: Duration,
    /// Upper bound for one run of the unit of work.
    pub max_commit_time: Duration,
}

impl RetryPolicy {
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff * attempt
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: Duration::from_millis(DEFAULT_BACKOFF_MS),
            max_commit_time: Duration::from_secs(DEFAULT_MAX_COMMIT_TIME_SECS),
        }
    }
}

impl From<&TransactionConfig> for RetryPolicy {
    fn from(config: &TransactionConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            backoff: Duration::from_millis(config.backoff_ms),
            max_commit_time: Duration::from_secs(config.max_commit_time_secs),
        }
    }
}

/// Runs `unit_of_work` inside a fresh transaction and commits it.
///
/// A failed attempt is aborted. Transient failures, including a unit of work exceeding
/// `max_commit_time` and a commit losing a write conflict, start over with a new transaction
/// after a linear backoff until `max_attempts` is spent. Every other error is returned
/// immediately. After the last attempt the last error is returned unchanged.
///
/// The closure runs once per attempt, so it has to own or clone whatever the unit needs.
pub async fn run_in_transaction<S, T, F>(store: &S, policy: &RetryPolicy, mut unit_of_work: F) -> Result<T, CourseError>
where
    S: Store,
    T: Send,
    F: for<'tx> FnMut(&'tx S::Tx) -> BoxFuture<'tx, Result<T, CourseError>> + Send,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match run_attempt(store, policy, &mut unit_of_work).await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < max_attempts => {
                let delay = policy.delay_for(attempt);

                log::warn!(
                    "[run_in_transaction] attempt {}/{} failed: {}. Retrying in {:?}",
                    attempt,
                    max_attempts,
                    e,
                    delay
                );

                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                if e.is_transient() {
                    log::error!(
                        "[run_in_transaction] giving up after {} attempts. Last error: {}",
                        attempt,
                        e
                    );
                }

                return Err(e);
            }
        }
    }
}

async fn run_attempt<S, T, F>(store: &S, policy: &RetryPolicy, unit_of_work: &mut F) -> Result<T, CourseError>
where
    S: Store,
    F: for<'tx> FnMut(&'tx S::Tx) -> BoxFuture<'tx, Result<T, CourseError>>,
{
    let tx = store.begin().await?;

    let outcome = match tokio::time::timeout(policy.max_commit_time, unit_of_work(&tx)).await {
        Ok(outcome) => outcome,
        Err(_) => Err(CourseError::TransactionTimeout(format!(
            "unit of work exceeded {:?}",
            policy.max_commit_time
        ))),
    };

    match outcome {
        Ok(value) => {
            tx.commit().await?;

            Ok(value)
        }
        Err(e) => {
            tx.abort();

            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{run_in_transaction, RetryPolicy};
    use crate::errors::CourseError;
    use crate::transaction::memory::MemoryStore;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            backoff: Duration::from_millis(1),
            max_commit_time: Duration::from_secs(5),
        }
    }

    #[test]
    fn backoff_is_linear() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(3), Duration::from_millis(300));
    }

    #[tokio::test]
    async fn not_found_is_never_retried() {
        let store = MemoryStore::new();
        let calls = Arc::new(AtomicU32::new(0));

        let result: Result<(), CourseError> = run_in_transaction(&store, &policy(5), |_tx| {
            let calls = calls.clone();
            Box::pin(async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(CourseError::NotFound("lecture".to_string()))
            })
        })
        .await;

        assert!(matches!(result, Err(CourseError::NotFound(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.stats().aborts, 1);
    }

    #[tokio::test]
    async fn transient_unit_failures_are_retried() {
        let store = MemoryStore::new();
        let calls = Arc::new(AtomicU32::new(0));

        let result = run_in_transaction(&store, &policy(3), |_tx| {
            let calls = calls.clone();
            Box::pin(async move {
                match calls.fetch_add(1, Ordering::SeqCst) {
                    0 => Err(CourseError::Connection("socket closed".to_string())),
                    attempt => Ok(attempt),
                }
            })
        })
        .await;

        assert_eq!(result.unwrap(), 1);
        assert_eq!(store.stats().begins, 2);
        assert_eq!(store.stats().commits, 1);
    }

    #[tokio::test]
    async fn zero_attempts_still_runs_once() {
        let store = MemoryStore::new();

        let result = run_in_transaction(&store, &policy(0), |_tx| Box::pin(async { Ok(7) })).await;

        assert_eq!(result.unwrap(), 7);
    }
}
