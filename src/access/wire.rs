//! JSON bodies of the Flow REST access API.
//!
//! Integers travel as decimal strings, byte blobs as base64, addresses and
//! identifiers as hex.

use alloy::primitives::hex;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Deserializer, Serialize};

use crate::access::types::{
    Account, AccountKey, Address, BlockHeader, Event, Identifier, TransactionResult,
    TransactionStatus,
};
use crate::cadence::UFix64;
use crate::crypto::{HashAlgorithm, SignatureAlgorithm};
use crate::error::{LifecycleError, LifecycleResult};
use crate::transaction::SignedTransaction;

fn malformed(what: &str, detail: impl std::fmt::Display) -> LifecycleError {
    LifecycleError::Access(format!("Malformed {} in access API response: {}", what, detail))
}

/// Accepts `"42"` as well as `42`.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        Raw::Number(n) => Ok(n),
    }
}

fn narrow(value: u64, what: &str) -> LifecycleResult<u32> {
    u32::try_from(value).map_err(|_| malformed(what, format!("{} out of range", value)))
}

#[derive(Debug, Deserialize)]
pub struct AccountResponse {
    pub address: String,
    #[serde(deserialize_with = "string_or_number")]
    pub balance: u64,
    #[serde(default)]
    pub keys: Vec<AccountKeyResponse>,
}

#[derive(Debug, Deserialize)]
pub struct AccountKeyResponse {
    #[serde(deserialize_with = "string_or_number")]
    pub index: u64,
    pub public_key: String,
    pub signing_algorithm: String,
    pub hashing_algorithm: String,
    #[serde(deserialize_with = "string_or_number")]
    pub sequence_number: u64,
    #[serde(deserialize_with = "string_or_number")]
    pub weight: u64,
    #[serde(default)]
    pub revoked: bool,
}

impl TryFrom<AccountKeyResponse> for AccountKey {
    type Error = LifecycleError;

    fn try_from(key: AccountKeyResponse) -> Result<Self, Self::Error> {
        let public_key = hex::decode(key.public_key.trim_start_matches("0x"))
            .map_err(|e| malformed("public key", e))?;
        Ok(AccountKey {
            index: narrow(key.index, "key index")?,
            public_key,
            sign_algo: key
                .signing_algorithm
                .parse::<SignatureAlgorithm>()
                .map_err(|e| malformed("signing algorithm", e))?,
            hash_algo: key
                .hashing_algorithm
                .parse::<HashAlgorithm>()
                .map_err(|e| malformed("hashing algorithm", e))?,
            weight: narrow(key.weight, "key weight")?,
            sequence_number: key.sequence_number,
            revoked: key.revoked,
        })
    }
}

impl TryFrom<AccountResponse> for Account {
    type Error = LifecycleError;

    fn try_from(account: AccountResponse) -> Result<Self, Self::Error> {
        Ok(Account {
            address: account
                .address
                .parse::<Address>()
                .map_err(|e| malformed("account address", e))?,
            balance: UFix64::from_units(account.balance),
            keys: account
                .keys
                .into_iter()
                .map(AccountKey::try_from)
                .collect::<LifecycleResult<Vec<_>>>()?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct BlockResponse {
    pub header: BlockHeaderResponse,
}

#[derive(Debug, Deserialize)]
pub struct BlockHeaderResponse {
    pub id: String,
    pub parent_id: String,
    #[serde(deserialize_with = "string_or_number")]
    pub height: u64,
}

impl TryFrom<BlockHeaderResponse> for BlockHeader {
    type Error = LifecycleError;

    fn try_from(header: BlockHeaderResponse) -> Result<Self, Self::Error> {
        Ok(BlockHeader {
            id: header.id.parse::<Identifier>().map_err(|e| malformed("block id", e))?,
            parent_id: header
                .parent_id
                .parse::<Identifier>()
                .map_err(|e| malformed("parent block id", e))?,
            height: header.height,
        })
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ProposalKeyBody {
    pub address: String,
    pub key_index: String,
    pub sequence_number: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SignatureBody {
    pub address: String,
    pub key_index: String,
    pub signature: String,
}

/// Body of `POST /v1/transactions`.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct TransactionBody {
    pub script: String,
    pub arguments: Vec<String>,
    pub reference_block_id: String,
    pub gas_limit: String,
    pub payer: String,
    pub proposal_key: ProposalKeyBody,
    pub authorizers: Vec<String>,
    pub payload_signatures: Vec<SignatureBody>,
    pub envelope_signatures: Vec<SignatureBody>,
}

impl From<&SignedTransaction> for TransactionBody {
    fn from(signed: &SignedTransaction) -> Self {
        let tx = signed.transaction();
        let proposal = tx.proposal_key();
        TransactionBody {
            script: STANDARD.encode(tx.script()),
            arguments: tx.arguments().iter().map(|a| STANDARD.encode(a)).collect(),
            reference_block_id: tx.reference_block_id().to_hex(),
            gas_limit: tx.gas_limit().to_string(),
            payer: tx.payer().to_hex(),
            proposal_key: ProposalKeyBody {
                address: proposal.address.to_hex(),
                key_index: proposal.key_index.to_string(),
                sequence_number: proposal.sequence_number.to_string(),
            },
            authorizers: tx.authorizers().iter().map(Address::to_hex).collect(),
            payload_signatures: Vec::new(),
            envelope_signatures: signed
                .envelope_signatures()
                .iter()
                .map(|s| SignatureBody {
                    address: s.address.to_hex(),
                    key_index: s.key_index.to_string(),
                    signature: STANDARD.encode(&s.signature),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TransactionIdResponse {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct EventResponse {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(deserialize_with = "string_or_number")]
    pub transaction_index: u64,
    #[serde(deserialize_with = "string_or_number")]
    pub event_index: u64,
    pub payload: String,
}

impl TryFrom<EventResponse> for Event {
    type Error = LifecycleError;

    fn try_from(event: EventResponse) -> Result<Self, Self::Error> {
        Ok(Event {
            payload: STANDARD
                .decode(&event.payload)
                .map_err(|e| malformed("event payload", e))?,
            transaction_index: narrow(event.transaction_index, "transaction index")?,
            event_index: narrow(event.event_index, "event index")?,
            event_type: event.event_type,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct TransactionResultResponse {
    #[serde(default)]
    pub block_id: String,
    pub status: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub status_code: u64,
    #[serde(default)]
    pub error_message: String,
    #[serde(default)]
    pub events: Vec<EventResponse>,
}

impl TransactionResultResponse {
    pub fn into_result(self, transaction_id: Identifier) -> LifecycleResult<TransactionResult> {
        let block_id = if self.block_id.is_empty() {
            None
        } else {
            Some(self.block_id.parse::<Identifier>().map_err(|e| malformed("block id", e))?)
        };

        Ok(TransactionResult {
            transaction_id,
            status: TransactionStatus::from(self.status.as_str()),
            status_code: narrow(self.status_code, "status code")?,
            error_message: self.error_message,
            events: self
                .events
                .into_iter()
                .map(Event::try_from)
                .collect::<LifecycleResult<Vec<_>>>()?,
            block_id,
        })
    }
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub code: u16,
    pub message: String,
}

impl ErrorResponse {
    /// Best-effort message from an error body.
    pub fn message_from(body: &str) -> String {
        match serde_json::from_str::<ErrorResponse>(body) {
            Ok(error) => error.message,
            Err(_) => body.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_conversion() {
        let body = r#"{
            "address": "f8d6e0586b0a20c7",
            "balance": "100001000",
            "keys": [{
                "index": "0",
                "public_key": "0xabcd",
                "signing_algorithm": "ECDSA_P256",
                "hashing_algorithm": "SHA3_256",
                "sequence_number": "17",
                "weight": "1000",
                "revoked": false
            }],
            "_expandable": {}
        }"#;
        let account = Account::try_from(serde_json::from_str::<AccountResponse>(body).unwrap()).unwrap();
        assert_eq!(account.address.to_hex(), "f8d6e0586b0a20c7");
        assert_eq!(account.balance.to_string(), "1.00001000");
        let key = account.key(0).unwrap();
        assert_eq!(key.public_key, vec![0xab, 0xcd]);
        assert_eq!(key.sign_algo, SignatureAlgorithm::EcdsaP256);
        assert_eq!(key.hash_algo, HashAlgorithm::Sha3_256);
        assert_eq!(key.sequence_number, 17);
        assert_eq!(key.weight, 1000);
    }

    #[test]
    fn test_unknown_algorithm_is_malformed() {
        let key = AccountKeyResponse {
            index: 0,
            public_key: "00".into(),
            signing_algorithm: "BLS_BLS12_381".into(),
            hashing_algorithm: "SHA3_256".into(),
            sequence_number: 0,
            weight: 1000,
            revoked: false,
        };
        let err = AccountKey::try_from(key).unwrap_err();
        assert!(matches!(err, LifecycleError::Access(_)));
    }

    #[test]
    fn test_transaction_result_conversion() {
        let payload = STANDARD.encode(br#"{"type":"String","value":"x"}"#);
        let body = format!(
            r#"{{
                "block_id": "{}",
                "status": "Sealed",
                "status_code": 0,
                "error_message": "",
                "computation_used": "12",
                "events": [{{
                    "type": "flow.AccountCreated",
                    "transaction_id": "{}",
                    "transaction_index": "1",
                    "event_index": "0",
                    "payload": "{}"
                }}]
            }}"#,
            "11".repeat(32),
            "22".repeat(32),
            payload
        );
        let tx_id = Identifier::from([0x22; 32]);
        let result = serde_json::from_str::<TransactionResultResponse>(&body)
            .unwrap()
            .into_result(tx_id)
            .unwrap();

        assert_eq!(result.status, TransactionStatus::Sealed);
        assert_eq!(result.block_id, Some(Identifier::from([0x11; 32])));
        assert_eq!(result.events[0].event_type, "flow.AccountCreated");
        assert_eq!(result.events[0].transaction_index, 1);
        assert_eq!(result.events[0].payload, br#"{"type":"String","value":"x"}"#);
    }

    #[test]
    fn test_pending_result_without_block() {
        let body = r#"{"block_id": "", "status": "Pending", "status_code": 0, "error_message": "", "events": []}"#;
        let result = serde_json::from_str::<TransactionResultResponse>(body)
            .unwrap()
            .into_result(Identifier::from([1; 32]))
            .unwrap();
        assert_eq!(result.status, TransactionStatus::Pending);
        assert!(result.block_id.is_none());
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            ErrorResponse::message_from(r#"{"code":400,"message":"invalid signature"}"#),
            "invalid signature"
        );
        assert_eq!(ErrorResponse::message_from(" plain text \n"), "plain text");
    }
}
