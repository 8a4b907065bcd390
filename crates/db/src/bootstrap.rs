//! Startup sequencing against a store that may still be coming up.
//!
//! [`wait_for_store`] pings the store and ensures the schema, retrying at a
//! fixed interval until the attempt budget runs out. It never exits the
//! process; the caller decides what exhaustion means.

use std::time::Duration;

use crate::store::RecordStore;

/// Retry budget and pacing for [`wait_for_store`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapPolicy {
    /// Total attempts, including the first. Values below 1 are treated as 1.
    pub max_attempts: u32,
    /// Fixed sleep between a failed attempt and the next one.
    pub retry_delay: Duration,
    /// Upper bound on a single attempt (ping plus schema ensure).
    pub attempt_timeout: Duration,
}

impl Default for BootstrapPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            retry_delay: Duration::from_secs(5),
            attempt_timeout: Duration::from_secs(10),
        }
    }
}

/// Successful bootstrap outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapReport {
    /// Attempts used, including the one that succeeded.
    pub attempts: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("store not ready after {attempts} attempts: {last_error}")]
    Exhausted { attempts: u32, last_error: String },
}

impl BootstrapError {
    pub fn attempts(&self) -> u32 {
        match self {
            BootstrapError::Exhausted { attempts, .. } => *attempts,
        }
    }
}

/// Block until the store answers a liveness query and the schema exists.
pub async fn wait_for_store(
    store: &dyn RecordStore,
    policy: &BootstrapPolicy,
) -> Result<BootstrapReport, BootstrapError> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        tracing::info!(attempt, max_attempts, "Checking store readiness");

        let last_error = match tokio::time::timeout(policy.attempt_timeout, try_once(store)).await
        {
            Ok(Ok(())) => {
                tracing::info!(attempt, "Store reachable and schema ensured");
                return Ok(BootstrapReport { attempts: attempt });
            }
            Ok(Err(e)) => e,
            Err(_) => format!("attempt timed out after {:?}", policy.attempt_timeout),
        };

        if attempt >= max_attempts {
            tracing::error!(
                attempt,
                error = %last_error,
                "Store readiness retries exhausted",
            );
            return Err(BootstrapError::Exhausted {
                attempts: attempt,
                last_error,
            });
        }

        tracing::warn!(
            attempt,
            remaining = max_attempts - attempt,
            delay_ms = policy.retry_delay.as_millis() as u64,
            error = %last_error,
            "Store not ready, retrying",
        );
        tokio::time::sleep(policy.retry_delay).await;
    }
}

async fn try_once(store: &dyn RecordStore) -> Result<(), String> {
    store
        .ping()
        .await
        .map_err(|e| format!("liveness query failed: {e}"))?;
    store
        .ensure_schema()
        .await
        .map_err(|e| format!("schema ensure failed: {e}"))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::memory::MemoryRecordStore;

    fn fast_policy(max_attempts: u32) -> BootstrapPolicy {
        BootstrapPolicy {
            max_attempts,
            retry_delay: Duration::from_millis(1),
            attempt_timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn default_policy_matches_documented_budget() {
        let policy = BootstrapPolicy::default();
        assert_eq!(policy.max_attempts, 10);
        assert_eq!(policy.retry_delay, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn ready_store_succeeds_on_first_attempt() {
        let store = MemoryRecordStore::new();
        let report = wait_for_store(&store, &fast_policy(3)).await.unwrap();

        assert_eq!(report.attempts, 1);
        assert!(store.schema_ensured());
    }

    #[tokio::test]
    async fn recovering_store_succeeds_after_retries() {
        let store = MemoryRecordStore::failing_first(3);
        let report = wait_for_store(&store, &fast_policy(10)).await.unwrap();

        assert_eq!(report.attempts, 4);
        assert_eq!(store.ping_count(), 4);
    }

    #[tokio::test]
    async fn unreachable_store_exhausts_budget() {
        let store = MemoryRecordStore::unavailable();
        let err = wait_for_store(&store, &fast_policy(5)).await.unwrap_err();

        assert_matches!(err, BootstrapError::Exhausted { attempts: 5, .. });
        assert_eq!(store.ping_count(), 5);
        assert!(!store.schema_ensured());
    }

    #[tokio::test]
    async fn zero_budget_still_tries_once() {
        let store = MemoryRecordStore::unavailable();
        let err = wait_for_store(&store, &fast_policy(0)).await.unwrap_err();

        assert_eq!(err.attempts(), 1);
        assert!(err.to_string().contains("liveness query failed"));
    }
}
