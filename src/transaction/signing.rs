//! Envelope signing.

use crate::access::Address;
use crate::crypto::{PrivateKey, Signer};
use crate::error::{LifecycleError, LifecycleResult};
use crate::lifecycle::ResolvedKey;
use crate::transaction::types::{EnvelopeSignature, SignedTransaction};

/// Sign the transaction envelope as `signer_address` / `key_index` and attach
/// the signature.
///
/// Accepts an unsigned or an already signed transaction; earlier signatures
/// from other keys stay valid because the signed bytes never include them.
pub fn sign_envelope(
    transaction: impl Into<SignedTransaction>,
    signer_address: Address,
    key_index: u32,
    signer: &Signer,
) -> LifecycleResult<SignedTransaction> {
    let mut signed = transaction.into();

    if signed.transaction().signer_index(&signer_address).is_none() {
        return Err(LifecycleError::Signing(format!(
            "Account {} is not a proposer, payer or authorizer of this transaction",
            signer_address
        )));
    }

    let message = signed.transaction().envelope_message();
    let signature = signer.sign(&message)?;

    signed.add_envelope_signature(EnvelopeSignature {
        address: signer_address,
        key_index,
        signature,
    });

    tracing::debug!(
        address = %signer_address,
        key_index = key_index,
        hash = %signer.hash_algorithm(),
        signatures = signed.envelope_signatures().len(),
        "Envelope signed"
    );

    Ok(signed)
}

/// Sign with `private_key` as the resolved on-chain key, using the key's
/// declared hash algorithm.
///
/// # Errors
///
/// [`LifecycleError::Signing`] when the private key's curve differs from the
/// key's declared algorithm or it does not correspond to the registered
/// public key.
pub fn sign_with_resolved_key(
    transaction: impl Into<SignedTransaction>,
    key: &ResolvedKey,
    private_key: &PrivateKey,
) -> LifecycleResult<SignedTransaction> {
    let account_key = key.key();

    if private_key.algorithm() != account_key.sign_algo {
        return Err(LifecycleError::Signing(format!(
            "Private key is {} but key {} on account {} is declared {}",
            private_key.algorithm(),
            account_key.index,
            key.address(),
            account_key.sign_algo
        )));
    }
    if private_key.public_key().as_bytes() != account_key.public_key.as_slice() {
        return Err(LifecycleError::Signing(format!(
            "Private key does not match key {} on account {}",
            account_key.index,
            key.address()
        )));
    }

    let signer = Signer::new(private_key.clone(), account_key.hash_algo);
    sign_envelope(transaction, key.address(), account_key.index, &signer)
}
