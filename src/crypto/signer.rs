//! Signer bound to a hash algorithm.

use alloy::primitives::B256;
use alloy::signers::SignerSync;
use p256::ecdsa::signature::hazmat::PrehashSigner;

use crate::crypto::algorithms::{HashAlgorithm, SignatureAlgorithm};
use crate::crypto::keys::{PrivateKey, PublicKey};
use crate::error::{LifecycleError, LifecycleResult};

/// Produces raw 64-byte r ‖ s signatures over `hash(message)`.
#[derive(Debug, Clone)]
pub struct Signer {
    key: PrivateKey,
    hash: HashAlgorithm,
}

impl Signer {
    pub fn new(key: PrivateKey, hash: HashAlgorithm) -> Self {
        Self { key, hash }
    }

    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.hash
    }

    pub fn signature_algorithm(&self) -> SignatureAlgorithm {
        self.key.algorithm()
    }

    pub fn public_key(&self) -> PublicKey {
        self.key.public_key()
    }

    pub fn sign(&self, message: &[u8]) -> LifecycleResult<Vec<u8>> {
        let digest = self.hash.digest(message);

        match &self.key {
            PrivateKey::P256(key) => {
                let signature: p256::ecdsa::Signature = key
                    .sign_prehash(&digest)
                    .map_err(|e| LifecycleError::Signing(format!("Signing failed: {}", e)))?;
                Ok(signature.to_bytes().to_vec())
            }
            PrivateKey::Secp256k1(signer) => {
                let signature = signer
                    .sign_hash_sync(&B256::from(digest))
                    .map_err(|e| LifecycleError::Signing(format!("Signing failed: {}", e)))?;
                // Drop the recovery byte.
                Ok(signature.as_bytes()[..64].to_vec())
            }
        }
    }
}
