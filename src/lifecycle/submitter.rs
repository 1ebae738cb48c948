//! Transaction submission.

use std::sync::Arc;

use crate::access::{AccessApi, Identifier};
use crate::error::{LifecycleError, LifecycleResult};
use crate::observability::metrics;
use crate::transaction::SignedTransaction;

/// Sends signed transactions. Each call is exactly one send attempt.
#[derive(Clone)]
pub struct Submitter {
    api: Arc<dyn AccessApi>,
}

impl Submitter {
    pub fn new(api: Arc<dyn AccessApi>) -> Self {
        Self { api }
    }

    /// Send `transaction` and return its network identifier.
    ///
    /// # Errors
    ///
    /// `Validation` without a payer envelope signature (nothing is sent),
    /// `Rejected` when the network refuses it, or the access error.
    pub async fn submit(&self, transaction: &SignedTransaction) -> LifecycleResult<Identifier> {
        let payer = transaction.transaction().payer();
        if !transaction.has_signature_from(&payer) {
            return Err(LifecycleError::Validation(format!(
                "Transaction has no envelope signature from payer {}",
                payer
            )));
        }

        let proposal = transaction.transaction().proposal_key();
        match self.api.send_transaction(transaction).await {
            Ok(tx_id) => {
                metrics::record_submitted();
                tracing::info!(
                    tx_id = %tx_id,
                    proposer = %proposal.address,
                    key_index = proposal.key_index,
                    sequence_number = proposal.sequence_number,
                    payer = %payer,
                    "Transaction submitted"
                );
                Ok(tx_id)
            }
            Err(e @ LifecycleError::Rejected { .. }) => {
                metrics::record_rejected(e.is_stale_sequence());
                tracing::warn!(
                    proposer = %proposal.address,
                    key_index = proposal.key_index,
                    sequence_number = proposal.sequence_number,
                    stale_sequence = e.is_stale_sequence(),
                    error = %e,
                    "Transaction rejected"
                );
                Err(e)
            }
            Err(e) => {
                tracing::error!(error = %e, "Transaction submission failed");
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for Submitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Submitter").finish_non_exhaustive()
    }
}
