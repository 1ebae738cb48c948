//! Error taxonomy for the transaction lifecycle.

use thiserror::Error;

use crate::access::Identifier;

/// Errors that can occur while moving a transaction from intent to outcome.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Caller-fixable input problem (bad amount scale, missing authorizers).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unknown account, key index or script.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Key material invalid or incompatible with the declared algorithm.
    #[error("Signing error: {0}")]
    Signing(String),

    /// The network refused the transaction synchronously.
    #[error("Transaction rejected: {reason}")]
    Rejected {
        reason: String,
        /// The proposal key's sequence number was already consumed.
        stale_sequence: bool,
    },

    /// The transaction executed with an error.
    #[error("Transaction {tx_id} failed: {message}")]
    ExecutionFailed { tx_id: Identifier, message: String },

    /// The reference block fell out of the validity window.
    #[error("Transaction {0} expired before it was sealed")]
    Expired(Identifier),

    /// The poll budget ran out before a terminal status was observed.
    #[error("Transaction {tx_id} not sealed after {attempts} status queries")]
    ConfirmationTimeout { tx_id: Identifier, attempts: u32 },

    /// The caller cancelled the wait.
    #[error("Waiting for transaction {0} was cancelled")]
    Cancelled(Identifier),

    /// Event schema did not match what the extractor expects.
    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    /// Transport or decoding failure talking to the access API.
    #[error("Access API error: {0}")]
    Access(String),

    /// An access API request timed out.
    #[error("Access API timeout after {0} seconds")]
    Timeout(u64),
}

impl LifecycleError {
    /// Build a rejection from the network's reason, flagging sequence-number
    /// mismatches.
    pub fn rejected(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        let stale_sequence = reason.to_ascii_lowercase().contains("sequence number");
        LifecycleError::Rejected {
            reason,
            stale_sequence,
        }
    }

    /// True for the one rejection a caller may fix by re-resolving the key
    /// and rebuilding.
    pub fn is_stale_sequence(&self) -> bool {
        matches!(
            self,
            LifecycleError::Rejected {
                stale_sequence: true,
                ..
            }
        )
    }

    /// Transport-level failures that the poller may retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, LifecycleError::Access(_) | LifecycleError::Timeout(_))
    }
}

/// Result type for lifecycle operations.
pub type LifecycleResult<T> = Result<T, LifecycleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LifecycleError::Timeout(10);
        assert_eq!(err.to_string(), "Access API timeout after 10 seconds");

        let err = LifecycleError::ConfirmationTimeout {
            tx_id: Identifier::from([0xab; 32]),
            attempts: 5,
        };
        assert!(err.to_string().contains("5 status queries"));
    }

    #[test]
    fn test_stale_sequence_classification() {
        let stale = LifecycleError::Rejected {
            reason: "sequence number mismatch".into(),
            stale_sequence: true,
        };
        assert!(stale.is_stale_sequence());

        let other = LifecycleError::Rejected {
            reason: "insufficient balance".into(),
            stale_sequence: false,
        };
        assert!(!other.is_stale_sequence());
        assert!(!LifecycleError::Validation("x".into()).is_stale_sequence());
    }

    #[test]
    fn test_rejection_reason_classification() {
        let err = LifecycleError::rejected(
            "[Error Code: 1007] invalid proposal key: public key 0 on account f8d6e0586b0a20c7 \
             has sequence number 7, but given 6",
        );
        assert!(err.is_stale_sequence());

        let err = LifecycleError::rejected("insufficient balance to pay for transaction fees");
        assert!(!err.is_stale_sequence());
        assert!(err.to_string().contains("insufficient balance"));
    }

    #[test]
    fn test_transient_errors() {
        assert!(LifecycleError::Access("connection refused".into()).is_transient());
        assert!(LifecycleError::Timeout(3).is_transient());
        assert!(!LifecycleError::NotFound("account".into()).is_transient());
    }
}
