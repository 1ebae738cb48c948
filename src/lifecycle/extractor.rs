//! Structured results recovered from transaction events.

use alloy::primitives::hex;

use crate::access::{Address, TransactionResult, ADDRESS_LENGTH};
use crate::cadence::CadenceValue;
use crate::error::{LifecycleError, LifecycleResult};

/// Event type emitted when a new account is created.
pub const ACCOUNT_CREATED_EVENT: &str = "flow.AccountCreated";

/// Address of the account created by a sealed transaction.
///
/// Looks up the first `flow.AccountCreated` event, reads its `address` field
/// (or the first field when unnamed) and requires an `Address` value of the
/// form `0x` + 16 hex characters.
pub fn extract_created_address(result: &TransactionResult) -> LifecycleResult<Address> {
    let event = result
        .events
        .iter()
        .find(|e| e.event_type == ACCOUNT_CREATED_EVENT)
        .ok_or_else(|| {
            LifecycleError::MalformedEvent(format!(
                "Transaction {} emitted no {} event ({} events)",
                result.transaction_id,
                ACCOUNT_CREATED_EVENT,
                result.events.len()
            ))
        })?;

    let composite = match event.value()? {
        CadenceValue::Event(composite) => composite,
        other => {
            return Err(LifecycleError::MalformedEvent(format!(
                "{} payload is {}, expected Event",
                ACCOUNT_CREATED_EVENT,
                kind(&other)
            )))
        }
    };

    let value = composite
        .field("address")
        .or_else(|| composite.fields.first().map(|f| &f.value))
        .ok_or_else(|| {
            LifecycleError::MalformedEvent(format!("{} has no fields", ACCOUNT_CREATED_EVENT))
        })?;

    match value {
        CadenceValue::Address(raw) => parse_event_address(raw),
        other => Err(LifecycleError::MalformedEvent(format!(
            "{} address field is {}, expected Address",
            ACCOUNT_CREATED_EVENT,
            kind(other)
        ))),
    }
}

fn parse_event_address(raw: &str) -> LifecycleResult<Address> {
    let malformed = || {
        LifecycleError::MalformedEvent(format!(
            "Created address '{}' is not 0x followed by {} hex characters",
            raw,
            ADDRESS_LENGTH * 2
        ))
    };

    let digits = raw.strip_prefix("0x").ok_or_else(malformed)?;
    if digits.len() != ADDRESS_LENGTH * 2 {
        return Err(malformed());
    }
    let bytes: [u8; ADDRESS_LENGTH] = hex::decode(digits)
        .map_err(|_| malformed())?
        .try_into()
        .map_err(|_| malformed())?;
    Ok(Address::from_bytes(bytes))
}

fn kind(value: &CadenceValue) -> &'static str {
    match value {
        CadenceValue::String(_) => "String",
        CadenceValue::UFix64(_) => "UFix64",
        CadenceValue::UInt64(_) => "UInt64",
        CadenceValue::Address(_) => "Address",
        CadenceValue::Optional(_) => "Optional",
        CadenceValue::Array(_) => "Array",
        CadenceValue::Struct(_) => "Struct",
        CadenceValue::Event(_) => "Event",
    }
}
