//! Unsigned and signed transaction values.

use crate::access::{Address, Identifier};
use crate::crypto::HashAlgorithm;
use crate::lifecycle::ResolvedKey;
use crate::transaction::encoding;

/// The key that proposes a transaction and whose sequence number it consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProposalKey {
    pub address: Address,
    pub key_index: u32,
    pub sequence_number: u64,
}

impl From<&ResolvedKey> for ProposalKey {
    fn from(resolved: &ResolvedKey) -> Self {
        Self {
            address: resolved.address(),
            key_index: resolved.key().index,
            sequence_number: resolved.key().sequence_number,
        }
    }
}

/// A fully assembled transaction with no signatures attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    pub(crate) script: Vec<u8>,
    /// JSON-Cadence encoded arguments, in order.
    pub(crate) arguments: Vec<Vec<u8>>,
    pub(crate) reference_block_id: Identifier,
    pub(crate) gas_limit: u64,
    pub(crate) proposal_key: ProposalKey,
    pub(crate) payer: Address,
    pub(crate) authorizers: Vec<Address>,
}

impl UnsignedTransaction {
    pub fn script(&self) -> &[u8] {
        &self.script
    }

    pub fn arguments(&self) -> &[Vec<u8>] {
        &self.arguments
    }

    pub fn reference_block_id(&self) -> &Identifier {
        &self.reference_block_id
    }

    pub fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    pub fn proposal_key(&self) -> &ProposalKey {
        &self.proposal_key
    }

    pub fn payer(&self) -> Address {
        self.payer
    }

    pub fn authorizers(&self) -> &[Address] {
        &self.authorizers
    }

    /// Distinct signing accounts in canonical order: proposer, payer, then
    /// authorizers.
    pub fn signers(&self) -> Vec<Address> {
        let mut signers = Vec::with_capacity(2 + self.authorizers.len());
        let candidates = [self.proposal_key.address, self.payer]
            .into_iter()
            .chain(self.authorizers.iter().copied());
        for address in candidates {
            if !signers.contains(&address) {
                signers.push(address);
            }
        }
        signers
    }

    pub fn signer_index(&self, address: &Address) -> Option<usize> {
        self.signers().iter().position(|a| a == address)
    }

    /// Bytes every envelope signature covers. Independent of any signature
    /// already attached.
    pub fn envelope_message(&self) -> Vec<u8> {
        encoding::envelope_message(self)
    }
}

/// An envelope signature tagged with the signing account and key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeSignature {
    pub address: Address,
    pub key_index: u32,
    pub signature: Vec<u8>,
}

/// A transaction with one or more envelope signatures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    transaction: UnsignedTransaction,
    envelope_signatures: Vec<EnvelopeSignature>,
}

impl From<UnsignedTransaction> for SignedTransaction {
    fn from(transaction: UnsignedTransaction) -> Self {
        Self {
            transaction,
            envelope_signatures: Vec::new(),
        }
    }
}

impl SignedTransaction {
    pub fn transaction(&self) -> &UnsignedTransaction {
        &self.transaction
    }

    /// Signatures in canonical order (signer index, then key index).
    pub fn envelope_signatures(&self) -> &[EnvelopeSignature] {
        &self.envelope_signatures
    }

    pub fn has_signature_from(&self, address: &Address) -> bool {
        self.envelope_signatures.iter().any(|s| &s.address == address)
    }

    /// Attach a signature, replacing an earlier one from the same key.
    pub(crate) fn add_envelope_signature(&mut self, signature: EnvelopeSignature) {
        self.envelope_signatures
            .retain(|s| !(s.address == signature.address && s.key_index == signature.key_index));
        self.envelope_signatures.push(signature);

        let signers = self.transaction.signers();
        let position = |address: &Address| signers.iter().position(|a| a == address);
        self.envelope_signatures
            .sort_by_key(|s| (position(&s.address), s.key_index));
    }

    /// Network identifier of this transaction: SHA3-256 over the payload and
    /// all signatures.
    pub fn id(&self) -> Identifier {
        Identifier::from(HashAlgorithm::Sha3_256.digest(&encoding::fingerprint(self)))
    }
}
