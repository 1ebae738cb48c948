//! Confirmation monitoring.
//!
//! # Responsibilities
//! - Poll a submitted transaction's status until it is sealed or expired
//! - Surface execution errors as soon as they are reported
//! - Bound the wait by attempts and wall-clock time
//! - Stop promptly on cancellation

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep_until, timeout_at, Instant};

use crate::access::{AccessApi, Identifier, TransactionResult, TransactionStatus};
use crate::config::schema::{ConfirmationConfig, RetryConfig};
use crate::error::{LifecycleError, LifecycleResult};
use crate::lifecycle::cancel::CancellationToken;
use crate::observability::metrics;
use crate::resilience::Backoff;

/// Stand-in deadline for waits too long to represent as an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// `from + after`, clamped instead of overflowing.
fn instant_after(from: Instant, after: Duration) -> Instant {
    from.checked_add(after)
        .or_else(|| from.checked_add(FAR_FUTURE))
        .unwrap_or(from)
}

/// Bounds on a confirmation wait.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Wait between status queries.
    pub interval: Duration,
    /// Maximum number of status queries.
    pub max_attempts: u32,
    /// Overall deadline for the wait.
    pub timeout: Duration,
    /// Schedule applied after transient query failures.
    pub backoff: Backoff,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: 180,
            timeout: Duration::from_secs(300),
            backoff: Backoff::default(),
        }
    }
}

impl PollPolicy {
    pub fn from_config(confirmation: &ConfirmationConfig, retries: &RetryConfig) -> Self {
        Self {
            interval: Duration::from_millis(confirmation.poll_interval_ms),
            max_attempts: confirmation.max_attempts,
            timeout: Duration::from_secs(confirmation.timeout_secs),
            backoff: Backoff::from(retries),
        }
    }
}

/// Waits for submitted transactions to reach a terminal status.
#[derive(Clone)]
pub struct ConfirmationPoller {
    api: Arc<dyn AccessApi>,
    policy: PollPolicy,
}

impl ConfirmationPoller {
    pub fn new(api: Arc<dyn AccessApi>, policy: PollPolicy) -> Self {
        Self { api, policy }
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Poll until `tx_id` is sealed.
    ///
    /// Safe to call repeatedly for the same ID; a sealed transaction yields
    /// the same result every time.
    ///
    /// # Errors
    ///
    /// - `ExecutionFailed` as soon as a result carries an error message
    /// - `Expired` when the network expires the transaction
    /// - `ConfirmationTimeout` when attempts or the deadline run out
    /// - `Cancelled` when `cancel` fires
    /// - any non-transient access error
    pub async fn await_seal(
        &self,
        tx_id: &Identifier,
        cancel: &CancellationToken,
    ) -> LifecycleResult<TransactionResult> {
        let started = Instant::now();
        let outcome = self
            .poll(tx_id, cancel, instant_after(started, self.policy.timeout))
            .await;

        let label = match &outcome {
            Ok(_) => "sealed",
            Err(LifecycleError::ExecutionFailed { .. }) => "failed",
            Err(LifecycleError::Expired(_)) => "expired",
            Err(LifecycleError::ConfirmationTimeout { .. }) => "timeout",
            Err(LifecycleError::Cancelled(_)) => "cancelled",
            Err(_) => "error",
        };
        metrics::record_confirmation(label, started.elapsed());

        outcome
    }

    async fn poll(
        &self,
        tx_id: &Identifier,
        cancel: &CancellationToken,
        deadline: Instant,
    ) -> LifecycleResult<TransactionResult> {
        let mut attempts: u32 = 0;
        let mut failures: u32 = 0;
        let mut last_status = TransactionStatus::Unknown;

        loop {
            if cancel.is_cancelled() {
                tracing::info!(tx_id = %tx_id, attempts = attempts, "Confirmation wait cancelled");
                return Err(LifecycleError::Cancelled(*tx_id));
            }
            if attempts >= self.policy.max_attempts || Instant::now() >= deadline {
                return Err(self.timed_out(tx_id, attempts));
            }

            attempts += 1;
            metrics::record_poll_attempt();

            let query = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                res = timeout_at(deadline, self.api.get_transaction_result(tx_id)) => Some(res),
            };

            let wait = match query {
                None => return Err(LifecycleError::Cancelled(*tx_id)),
                Some(Err(_elapsed)) => return Err(self.timed_out(tx_id, attempts)),
                Some(Ok(Ok(result))) => {
                    failures = 0;

                    if result.has_error() {
                        tracing::warn!(
                            tx_id = %tx_id,
                            status = %result.status,
                            status_code = result.status_code,
                            error = %result.error_message,
                            "Transaction execution failed"
                        );
                        return Err(LifecycleError::ExecutionFailed {
                            tx_id: *tx_id,
                            message: result.error_message,
                        });
                    }

                    match result.status {
                        TransactionStatus::Sealed => {
                            tracing::info!(
                                tx_id = %tx_id,
                                attempts = attempts,
                                events = result.events.len(),
                                "Transaction sealed"
                            );
                            return Ok(result);
                        }
                        TransactionStatus::Expired => {
                            tracing::warn!(tx_id = %tx_id, attempts = attempts, "Transaction expired");
                            return Err(LifecycleError::Expired(*tx_id));
                        }
                        status => {
                            if status != last_status {
                                tracing::debug!(tx_id = %tx_id, status = %status, attempt = attempts, "Transaction status changed");
                                last_status = status;
                            }
                            self.policy.interval
                        }
                    }
                }
                Some(Ok(Err(LifecycleError::NotFound(_)))) => {
                    tracing::debug!(tx_id = %tx_id, attempt = attempts, "Transaction not yet known");
                    self.policy.interval
                }
                Some(Ok(Err(e))) if e.is_transient() => {
                    failures += 1;
                    let delay = self.policy.backoff.delay(failures).max(self.policy.interval);
                    tracing::warn!(
                        tx_id = %tx_id,
                        attempt = attempts,
                        retry_in_ms = delay.as_millis() as u64,
                        error = %e,
                        "Status query failed, retrying"
                    );
                    delay
                }
                Some(Ok(Err(e))) => return Err(e),
            };

            if attempts >= self.policy.max_attempts {
                return Err(self.timed_out(tx_id, attempts));
            }

            let wake = instant_after(Instant::now(), wait).min(deadline);
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!(tx_id = %tx_id, attempts = attempts, "Confirmation wait cancelled");
                    return Err(LifecycleError::Cancelled(*tx_id));
                }
                _ = sleep_until(wake) => {}
            }
        }
    }

    fn timed_out(&self, tx_id: &Identifier, attempts: u32) -> LifecycleError {
        tracing::warn!(
            tx_id = %tx_id,
            attempts = attempts,
            timeout_secs = self.policy.timeout.as_secs(),
            "Confirmation wait exhausted"
        );
        LifecycleError::ConfirmationTimeout {
            tx_id: *tx_id,
            attempts,
        }
    }
}

impl std::fmt::Debug for ConfirmationPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfirmationPoller")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = PollPolicy::default();
        assert_eq!(policy.interval, Duration::from_secs(1));
        assert_eq!(policy.max_attempts, 180);
        assert_eq!(policy.timeout, Duration::from_secs(300));
    }

    #[test]
    fn test_instant_after_clamps_overflow() {
        let now = Instant::now();
        assert_eq!(instant_after(now, Duration::from_secs(5)), now + Duration::from_secs(5));

        let clamped = instant_after(now, Duration::MAX);
        assert!(clamped > now);
        assert!(clamped <= now + FAR_FUTURE);
    }

    #[test]
    fn test_policy_from_config() {
        let confirmation = ConfirmationConfig {
            poll_interval_ms: 250,
            max_attempts: 12,
            timeout_secs: 30,
        };
        let policy = PollPolicy::from_config(&confirmation, &RetryConfig::default());
        assert_eq!(policy.interval, Duration::from_millis(250));
        assert_eq!(policy.max_attempts, 12);
        assert_eq!(policy.timeout, Duration::from_secs(30));
    }
}
