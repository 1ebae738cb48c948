//! Transaction assembly.
//!
//! Pure: no I/O happens here. The proposal key must come from
//! [`KeyResolver`](crate::lifecycle::KeyResolver), which is why the builder
//! only accepts a [`ResolvedKey`].

use crate::access::{Address, Identifier};
use crate::cadence::CadenceValue;
use crate::error::{LifecycleError, LifecycleResult};
use crate::lifecycle::ResolvedKey;
use crate::transaction::types::{ProposalKey, UnsignedTransaction};

/// Builder for [`UnsignedTransaction`].
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    script: Vec<u8>,
    arguments: Vec<CadenceValue>,
    reference_block_id: Option<Identifier>,
    gas_limit: u64,
    proposal_key: Option<ProposalKey>,
    payer: Option<Address>,
    authorizers: Vec<Address>,
}

impl TransactionBuilder {
    pub fn new(script: impl Into<Vec<u8>>) -> Self {
        Self {
            script: script.into(),
            arguments: Vec::new(),
            reference_block_id: None,
            gas_limit: 0,
            proposal_key: None,
            payer: None,
            authorizers: Vec::new(),
        }
    }

    #[must_use]
    pub fn argument(mut self, value: CadenceValue) -> Self {
        self.arguments.push(value);
        self
    }

    #[must_use]
    pub fn arguments<I>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = CadenceValue>,
    {
        self.arguments.extend(values);
        self
    }

    #[must_use]
    pub fn reference_block(mut self, id: Identifier) -> Self {
        self.reference_block_id = Some(id);
        self
    }

    #[must_use]
    pub fn gas_limit(mut self, limit: u64) -> Self {
        self.gas_limit = limit;
        self
    }

    /// Propose with a key freshly read from the network.
    #[must_use]
    pub fn proposal_key(mut self, key: &ResolvedKey) -> Self {
        self.proposal_key = Some(ProposalKey::from(key));
        self
    }

    #[must_use]
    pub fn payer(mut self, payer: Address) -> Self {
        self.payer = Some(payer);
        self
    }

    #[must_use]
    pub fn authorizer(mut self, address: Address) -> Self {
        self.authorizers.push(address);
        self
    }

    #[must_use]
    pub fn authorizers<I>(mut self, addresses: I) -> Self
    where
        I: IntoIterator<Item = Address>,
    {
        self.authorizers.extend(addresses);
        self
    }

    /// Validate and assemble.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Validation`] for a wrong fixed-point scale,
    /// a zero gas limit, no authorizers, or a missing reference block,
    /// proposal key or payer.
    pub fn build(self) -> LifecycleResult<UnsignedTransaction> {
        for argument in &self.arguments {
            argument.validate_fixed_point()?;
        }
        if self.gas_limit == 0 {
            return Err(LifecycleError::Validation(
                "Gas limit must be greater than zero".to_string(),
            ));
        }
        if self.authorizers.is_empty() {
            return Err(LifecycleError::Validation(
                "Transaction needs at least one authorizer".to_string(),
            ));
        }
        let reference_block_id = self.reference_block_id.ok_or_else(|| {
            LifecycleError::Validation("Transaction needs a reference block".to_string())
        })?;
        let proposal_key = self.proposal_key.ok_or_else(|| {
            LifecycleError::Validation("Transaction needs a proposal key".to_string())
        })?;
        let payer = self
            .payer
            .ok_or_else(|| LifecycleError::Validation("Transaction needs a payer".to_string()))?;

        let arguments = self
            .arguments
            .iter()
            .map(CadenceValue::encode)
            .collect::<LifecycleResult<Vec<_>>>()?;

        Ok(UnsignedTransaction {
            script: self.script,
            arguments,
            reference_block_id,
            gas_limit: self.gas_limit,
            proposal_key,
            payer,
            authorizers: self.authorizers,
        })
    }
}

/// One-call form of [`TransactionBuilder`].
pub fn build(
    script: impl Into<Vec<u8>>,
    arguments: Vec<CadenceValue>,
    reference_block_id: Identifier,
    gas_limit: u64,
    proposal_key: &ResolvedKey,
    payer: Address,
    authorizers: Vec<Address>,
) -> LifecycleResult<UnsignedTransaction> {
    TransactionBuilder::new(script)
        .arguments(arguments)
        .reference_block(reference_block_id)
        .gas_limit(gas_limit)
        .proposal_key(proposal_key)
        .payer(payer)
        .authorizers(authorizers)
        .build()
}
