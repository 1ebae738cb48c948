//! Account key resolution.

use std::sync::Arc;

use crate::access::{AccessApi, AccountKey, Address};
use crate::error::{LifecycleError, LifecycleResult};

/// An account key together with its owning address, as just read from the
/// latest sealed block.
///
/// Only [`KeyResolver`] produces these, so a transaction's proposal sequence
/// number always comes from the network rather than from a caller's guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedKey {
    address: Address,
    key: AccountKey,
}

impl ResolvedKey {
    pub(crate) fn new(address: Address, key: AccountKey) -> Self {
        Self { address, key }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn key(&self) -> &AccountKey {
        &self.key
    }

    pub fn sequence_number(&self) -> u64 {
        self.key.sequence_number
    }
}

/// Reads the current state of an account key.
///
/// Holds no cache. Sequence numbers advance on every included transaction
/// and concurrent proposers are arbitrated by the network, so every call is
/// one fresh read.
#[derive(Clone)]
pub struct KeyResolver {
    api: Arc<dyn AccessApi>,
}

impl KeyResolver {
    pub fn new(api: Arc<dyn AccessApi>) -> Self {
        Self { api }
    }

    /// Fetch the key at `key_index` on `address`.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown account or key index, `Validation` for a
    /// revoked key, and any access error unchanged.
    pub async fn resolve(&self, address: Address, key_index: u32) -> LifecycleResult<ResolvedKey> {
        let account = self.api.get_account(&address).await?;

        let key = account.key(key_index).cloned().ok_or_else(|| {
            LifecycleError::NotFound(format!(
                "Account {} has no key with index {} ({} keys)",
                address,
                key_index,
                account.keys.len()
            ))
        })?;

        if key.revoked {
            return Err(LifecycleError::Validation(format!(
                "Key {} on account {} is revoked",
                key_index, address
            )));
        }

        tracing::debug!(
            address = %address,
            key_index = key_index,
            sequence_number = key.sequence_number,
            "Resolved proposal key"
        );

        Ok(ResolvedKey::new(address, key))
    }
}

impl std::fmt::Debug for KeyResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyResolver").finish_non_exhaustive()
    }
}
