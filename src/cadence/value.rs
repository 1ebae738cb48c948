//! JSON-Cadence values used for transaction arguments and event payloads.

use serde::{Deserialize, Serialize};

use crate::access::Address;
use crate::cadence::UFix64;
use crate::error::{LifecycleError, LifecycleResult};

/// A dynamically typed Cadence value, tagged the way JSON-Cadence encodes it:
/// `{"type": "<Type>", "value": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum CadenceValue {
    String(String),
    /// Decimal string; arguments must carry exactly 8 fractional digits.
    UFix64(String),
    UInt64(String),
    /// `0x`-prefixed hex.
    Address(String),
    Optional(Option<Box<CadenceValue>>),
    Array(Vec<CadenceValue>),
    Struct(Composite),
    Event(Composite),
}

/// Composite payload (struct, event): a type id and ordered named fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Composite {
    pub id: String,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub value: CadenceValue,
}

impl Composite {
    pub fn field(&self, name: &str) -> Option<&CadenceValue> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }
}

impl CadenceValue {
    pub fn string(value: impl Into<String>) -> Self {
        CadenceValue::String(value.into())
    }

    pub fn ufix64(value: UFix64) -> Self {
        CadenceValue::UFix64(value.to_string())
    }

    pub fn uint64(value: u64) -> Self {
        CadenceValue::UInt64(value.to_string())
    }

    pub fn address(value: &Address) -> Self {
        CadenceValue::Address(value.to_prefixed_hex())
    }

    /// JSON-Cadence bytes as sent in a transaction's argument list.
    pub fn encode(&self) -> LifecycleResult<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| LifecycleError::Validation(format!("Unencodable argument: {}", e)))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Check every fixed-point value, including nested ones, for the exact
    /// 8-digit scale.
    pub fn validate_fixed_point(&self) -> LifecycleResult<()> {
        match self {
            CadenceValue::UFix64(raw) => UFix64::parse_exact(raw).map(|_| ()),
            CadenceValue::Optional(inner) => match inner {
                Some(value) => value.validate_fixed_point(),
                None => Ok(()),
            },
            CadenceValue::Array(items) => items.iter().try_for_each(Self::validate_fixed_point),
            CadenceValue::Struct(composite) | CadenceValue::Event(composite) => composite
                .fields
                .iter()
                .try_for_each(|f| f.value.validate_fixed_point()),
            CadenceValue::String(_) | CadenceValue::UInt64(_) | CadenceValue::Address(_) => Ok(()),
        }
    }
}
