//! The narrow interface the lifecycle uses to reach the network.

use async_trait::async_trait;

use crate::access::types::{Account, Address, BlockHeader, Identifier, TransactionResult};
use crate::error::LifecycleResult;
use crate::transaction::SignedTransaction;

/// Access API operations consumed by the lifecycle.
///
/// Implementations must not cache account state: every `get_account` call
/// reflects the latest sealed block.
#[async_trait]
pub trait AccessApi: Send + Sync {
    /// Fetch an account with its keys. Unknown accounts yield `NotFound`.
    async fn get_account(&self, address: &Address) -> LifecycleResult<Account>;

    /// Header of the latest sealed block.
    async fn get_latest_block_header(&self) -> LifecycleResult<BlockHeader>;

    /// Send a signed transaction. Synchronous refusals yield `Rejected`.
    async fn send_transaction(&self, transaction: &SignedTransaction) -> LifecycleResult<Identifier>;

    /// Current result for a previously submitted transaction.
    async fn get_transaction_result(&self, id: &Identifier) -> LifecycleResult<TransactionResult>;
}
