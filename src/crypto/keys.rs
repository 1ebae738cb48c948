//! Private and public key handling.
//!
//! # Security
//! - Private keys are loaded from hex strings or environment variables only
//! - Keys are never logged or serialized; `Debug` prints the public key

use alloy::primitives::hex;
use alloy::signers::local::PrivateKeySigner;
use p256::ecdsa::signature::hazmat::PrehashVerifier;
use p256::elliptic_curve::sec1::ToEncodedPoint;

use crate::crypto::algorithms::{HashAlgorithm, SignatureAlgorithm};
use crate::error::{LifecycleError, LifecycleResult};

/// Uncompressed public key length without the SEC1 tag byte.
pub const PUBLIC_KEY_LENGTH: usize = 64;

/// Default environment variable holding the signer's private key.
pub const PRIVATE_KEY_ENV_VAR: &str = "FLOW_PRIVATE_KEY";

/// A decoded private key for one of the supported curves.
#[derive(Clone)]
pub enum PrivateKey {
    P256(p256::ecdsa::SigningKey),
    Secp256k1(PrivateKeySigner),
}

impl PrivateKey {
    /// Decode a hex-encoded scalar (with or without `0x`) for `algorithm`.
    pub fn from_hex(private_key_hex: &str, algorithm: SignatureAlgorithm) -> LifecycleResult<Self> {
        let key_hex = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);
        let bytes = hex::decode(key_hex)
            .map_err(|e| LifecycleError::Signing(format!("Invalid private key format: {}", e)))?;

        let key = match algorithm {
            SignatureAlgorithm::EcdsaP256 => p256::ecdsa::SigningKey::from_slice(&bytes)
                .map(PrivateKey::P256)
                .map_err(|e| LifecycleError::Signing(format!("Invalid P-256 private key: {}", e)))?,
            SignatureAlgorithm::EcdsaSecp256k1 => PrivateKeySigner::from_slice(&bytes)
                .map(PrivateKey::Secp256k1)
                .map_err(|e| {
                    LifecycleError::Signing(format!("Invalid secp256k1 private key: {}", e))
                })?,
        };

        tracing::debug!(algorithm = %algorithm, "Private key decoded");
        Ok(key)
    }

    /// Load from the named environment variable.
    pub fn from_env(var: &str, algorithm: SignatureAlgorithm) -> LifecycleResult<Self> {
        let private_key = std::env::var(var).map_err(|_| {
            LifecycleError::Signing(format!("Environment variable {} not set", var))
        })?;

        Self::from_hex(&private_key, algorithm)
    }

    /// Generate a fresh random key.
    pub fn generate(algorithm: SignatureAlgorithm) -> Self {
        match algorithm {
            SignatureAlgorithm::EcdsaP256 => {
                PrivateKey::P256(p256::ecdsa::SigningKey::random(&mut rand::rngs::OsRng))
            }
            SignatureAlgorithm::EcdsaSecp256k1 => PrivateKey::Secp256k1(PrivateKeySigner::random()),
        }
    }

    pub fn algorithm(&self) -> SignatureAlgorithm {
        match self {
            PrivateKey::P256(_) => SignatureAlgorithm::EcdsaP256,
            PrivateKey::Secp256k1(_) => SignatureAlgorithm::EcdsaSecp256k1,
        }
    }

    pub fn public_key(&self) -> PublicKey {
        let point = match self {
            PrivateKey::P256(key) => key.verifying_key().to_encoded_point(false).as_bytes().to_vec(),
            PrivateKey::Secp256k1(signer) => signer
                .credential()
                .verifying_key()
                .to_encoded_point(false)
                .as_bytes()
                .to_vec(),
        };
        // Drop the 0x04 SEC1 tag.
        PublicKey {
            algorithm: self.algorithm(),
            bytes: point[1..].to_vec(),
        }
    }

    /// Hex of the raw scalar. Intended for freshly generated keys only.
    pub fn to_hex(&self) -> String {
        match self {
            PrivateKey::P256(key) => hex::encode(key.to_bytes()),
            PrivateKey::Secp256k1(signer) => hex::encode(signer.credential().to_bytes()),
        }
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("algorithm", &self.algorithm())
            .field("public_key", &self.public_key().to_hex())
            .finish()
    }
}

/// A 64-byte uncompressed public key (X ‖ Y).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    algorithm: SignatureAlgorithm,
    bytes: Vec<u8>,
}

impl PublicKey {
    pub fn from_bytes(bytes: &[u8], algorithm: SignatureAlgorithm) -> LifecycleResult<Self> {
        if bytes.len() != PUBLIC_KEY_LENGTH {
            return Err(LifecycleError::Validation(format!(
                "Public key must be {} bytes, got {}",
                PUBLIC_KEY_LENGTH,
                bytes.len()
            )));
        }
        Ok(Self {
            algorithm,
            bytes: bytes.to_vec(),
        })
    }

    pub fn from_hex(public_key_hex: &str, algorithm: SignatureAlgorithm) -> LifecycleResult<Self> {
        let key_hex = public_key_hex.strip_prefix("0x").unwrap_or(public_key_hex);
        let bytes = hex::decode(key_hex)
            .map_err(|e| LifecycleError::Validation(format!("Invalid public key hex: {}", e)))?;
        Self::from_bytes(&bytes, algorithm)
    }

    pub fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// Verify a raw r ‖ s signature over `hash(message)`.
    pub fn verify(&self, hash: HashAlgorithm, message: &[u8], signature: &[u8]) -> bool {
        let digest = hash.digest(message);
        let mut sec1 = Vec::with_capacity(PUBLIC_KEY_LENGTH + 1);
        sec1.push(0x04);
        sec1.extend_from_slice(&self.bytes);

        match self.algorithm {
            SignatureAlgorithm::EcdsaP256 => {
                let (Ok(key), Ok(sig)) = (
                    p256::ecdsa::VerifyingKey::from_sec1_bytes(&sec1),
                    p256::ecdsa::Signature::from_slice(signature),
                ) else {
                    return false;
                };
                key.verify_prehash(&digest, &sig).is_ok()
            }
            SignatureAlgorithm::EcdsaSecp256k1 => {
                let (Ok(key), Ok(sig)) = (
                    k256::ecdsa::VerifyingKey::from_sec1_bytes(&sec1),
                    k256::ecdsa::Signature::from_slice(signature),
                ) else {
                    return false;
                };
                key.verify_prehash(&digest, &sig).is_ok()
            }
        }
    }
}
