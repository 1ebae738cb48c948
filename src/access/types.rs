//! Network-level types shared by every lifecycle stage.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::hex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::cadence::{CadenceValue, UFix64};
use crate::crypto::{HashAlgorithm, SignatureAlgorithm};
use crate::error::{LifecycleError, LifecycleResult};

/// Width of a Flow account address in bytes.
pub const ADDRESS_LENGTH: usize = 8;

/// Width of block and transaction identifiers in bytes.
pub const IDENTIFIER_LENGTH: usize = 32;

/// Fixed-width account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    pub const fn from_bytes(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    /// Lowercase hex without prefix (16 characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Hex with the `0x` prefix used by JSON-Cadence.
    pub fn to_prefixed_hex(&self) -> String {
        format!("0x{}", self.to_hex())
    }
}

impl From<u64> for Address {
    fn from(value: u64) -> Self {
        Self(value.to_be_bytes())
    }
}

impl FromStr for Address {
    type Err = LifecycleError;

    /// Accepts an optional `0x` prefix; short forms are left-padded with zeros.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        if digits.is_empty() || digits.len() > ADDRESS_LENGTH * 2 {
            return Err(LifecycleError::Validation(format!(
                "Invalid address '{}': expected at most {} hex characters",
                s,
                ADDRESS_LENGTH * 2
            )));
        }
        let padded = format!("{:0>width$}", digits, width = ADDRESS_LENGTH * 2);
        let bytes = hex::decode(&padded)
            .map_err(|e| LifecycleError::Validation(format!("Invalid address '{}': {}", s, e)))?;

        let mut out = [0u8; ADDRESS_LENGTH];
        out.copy_from_slice(&bytes);
        Ok(Self(out))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_prefixed_hex())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// 32-byte identifier for blocks and transactions.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identifier([u8; IDENTIFIER_LENGTH]);

impl Identifier {
    pub fn as_bytes(&self) -> &[u8; IDENTIFIER_LENGTH] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl From<[u8; IDENTIFIER_LENGTH]> for Identifier {
    fn from(bytes: [u8; IDENTIFIER_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl FromStr for Identifier {
    type Err = LifecycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits)
            .map_err(|e| LifecycleError::Validation(format!("Invalid identifier '{}': {}", s, e)))?;
        let bytes: [u8; IDENTIFIER_LENGTH] = bytes.try_into().map_err(|_| {
            LifecycleError::Validation(format!(
                "Invalid identifier '{}': expected {} bytes",
                s, IDENTIFIER_LENGTH
            ))
        })?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({})", self.to_hex())
    }
}

impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// One key registered on an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountKey {
    pub index: u32,
    #[serde(serialize_with = "serialize_hex")]
    pub public_key: Vec<u8>,
    pub sign_algo: SignatureAlgorithm,
    pub hash_algo: HashAlgorithm,
    pub weight: u32,
    /// Advanced by the network each time a transaction proposed with this
    /// key is included. Never cached client-side.
    pub sequence_number: u64,
    pub revoked: bool,
}

/// Account state at the latest sealed block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub address: Address,
    pub balance: UFix64,
    pub keys: Vec<AccountKey>,
}

impl Account {
    pub fn key(&self, index: u32) -> Option<&AccountKey> {
        self.keys.iter().find(|k| k.index == index)
    }
}

/// Header of the latest sealed block, used as a transaction's reference block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub id: Identifier,
    pub parent_id: Identifier,
    pub height: u64,
}

/// Transaction status as reported by the access API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionStatus {
    Unknown,
    Pending,
    Finalized,
    Executed,
    Sealed,
    Expired,
}

impl TransactionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TransactionStatus::Sealed | TransactionStatus::Expired)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransactionStatus::Unknown => "Unknown",
            TransactionStatus::Pending => "Pending",
            TransactionStatus::Finalized => "Finalized",
            TransactionStatus::Executed => "Executed",
            TransactionStatus::Sealed => "Sealed",
            TransactionStatus::Expired => "Expired",
        }
    }
}

impl From<&str> for TransactionStatus {
    fn from(s: &str) -> Self {
        match s {
            "Pending" => TransactionStatus::Pending,
            "Finalized" => TransactionStatus::Finalized,
            "Executed" => TransactionStatus::Executed,
            "Sealed" => TransactionStatus::Sealed,
            "Expired" => TransactionStatus::Expired,
            _ => TransactionStatus::Unknown,
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event emitted during execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Fully qualified type, e.g. `flow.AccountCreated`.
    pub event_type: String,
    pub transaction_index: u32,
    pub event_index: u32,
    /// Raw JSON-Cadence payload.
    pub payload: Vec<u8>,
}

impl Event {
    /// Decode the payload into a typed value.
    pub fn value(&self) -> LifecycleResult<CadenceValue> {
        CadenceValue::decode(&self.payload).map_err(|e| {
            LifecycleError::MalformedEvent(format!(
                "Event {} payload is not valid JSON-Cadence: {}",
                self.event_type, e
            ))
        })
    }
}

/// Latest known outcome of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionResult {
    pub transaction_id: Identifier,
    pub status: TransactionStatus,
    pub status_code: u32,
    pub error_message: String,
    pub events: Vec<Event>,
    pub block_id: Option<Identifier>,
}

impl TransactionResult {
    pub fn has_error(&self) -> bool {
        !self.error_message.is_empty()
    }
}

fn serialize_hex<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(bytes))
}
