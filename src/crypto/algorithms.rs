//! Signature and hash algorithm identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};
use sha3::Sha3_256;

use crate::error::LifecycleError;

/// Curve used by an account key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureAlgorithm {
    EcdsaP256,
    EcdsaSecp256k1,
}

impl SignatureAlgorithm {
    /// Numeric code used in on-chain key encodings.
    pub const fn code(self) -> u64 {
        match self {
            SignatureAlgorithm::EcdsaP256 => 2,
            SignatureAlgorithm::EcdsaSecp256k1 => 3,
        }
    }

    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            2 => Some(SignatureAlgorithm::EcdsaP256),
            3 => Some(SignatureAlgorithm::EcdsaSecp256k1),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            SignatureAlgorithm::EcdsaP256 => "ECDSA_P256",
            SignatureAlgorithm::EcdsaSecp256k1 => "ECDSA_secp256k1",
        }
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = LifecycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ECDSA_P256" | "P256" => Ok(SignatureAlgorithm::EcdsaP256),
            "ECDSA_SECP256K1" | "SECP256K1" => Ok(SignatureAlgorithm::EcdsaSecp256k1),
            _ => Err(LifecycleError::Validation(format!(
                "Unsupported signature algorithm '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SignatureAlgorithm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Digest applied to the signing payload before signing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    Sha2_256,
    Sha3_256,
}

impl HashAlgorithm {
    pub const fn code(self) -> u64 {
        match self {
            HashAlgorithm::Sha2_256 => 1,
            HashAlgorithm::Sha3_256 => 3,
        }
    }

    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(HashAlgorithm::Sha2_256),
            3 => Some(HashAlgorithm::Sha3_256),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            HashAlgorithm::Sha2_256 => "SHA2_256",
            HashAlgorithm::Sha3_256 => "SHA3_256",
        }
    }

    pub fn digest(self, message: &[u8]) -> [u8; 32] {
        match self {
            HashAlgorithm::Sha2_256 => Sha256::digest(message).into(),
            HashAlgorithm::Sha3_256 => Sha3_256::digest(message).into(),
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = LifecycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SHA2_256" => Ok(HashAlgorithm::Sha2_256),
            "SHA3_256" => Ok(HashAlgorithm::Sha3_256),
            _ => Err(LifecycleError::Validation(format!(
                "Unsupported hash algorithm '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for HashAlgorithm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
