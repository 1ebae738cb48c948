//! Canonical RLP encoding of transactions.
//!
//! ```text
//! payload  = [script, [arguments..], reference_block_id, gas_limit,
//!             proposer_address, proposer_key_index, proposer_sequence_number,
//!             payer, [authorizers..]]
//! envelope = [payload, payload_signatures]
//! message  = DOMAIN_TAG ‖ rlp(envelope)
//! ```
//!
//! Payload signatures are not produced by this client, so the envelope always
//! carries an empty list in that slot.

use alloy::rlp::{Encodable, Header};

use crate::transaction::types::{SignedTransaction, UnsignedTransaction};

const fn padded_tag(tag: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    let mut i = 0;
    while i < tag.len() {
        out[i] = tag[i];
        i += 1;
    }
    out
}

/// Domain separation tag prepended to every transaction signing message.
pub const TRANSACTION_DOMAIN_TAG: [u8; 32] = padded_tag(b"FLOW-V0.0-transaction");

pub(crate) fn rlp_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() + 9);
    bytes.encode(&mut out);
    out
}

pub(crate) fn rlp_uint(value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(9);
    value.encode(&mut out);
    out
}

/// Wrap already-encoded items in a list header.
pub(crate) fn rlp_list(items: &[Vec<u8>]) -> Vec<u8> {
    let payload_length = items.iter().map(Vec::len).sum();
    let mut out = Vec::with_capacity(payload_length + 9);
    Header {
        list: true,
        payload_length,
    }
    .encode(&mut out);
    for item in items {
        out.extend_from_slice(item);
    }
    out
}

pub fn payload(tx: &UnsignedTransaction) -> Vec<u8> {
    let arguments: Vec<Vec<u8>> = tx.arguments.iter().map(|a| rlp_bytes(a)).collect();
    let authorizers: Vec<Vec<u8>> = tx
        .authorizers
        .iter()
        .map(|a| rlp_bytes(a.as_bytes()))
        .collect();

    rlp_list(&[
        rlp_bytes(&tx.script),
        rlp_list(&arguments),
        rlp_bytes(tx.reference_block_id.as_bytes()),
        rlp_uint(tx.gas_limit),
        rlp_bytes(tx.proposal_key.address.as_bytes()),
        rlp_uint(u64::from(tx.proposal_key.key_index)),
        rlp_uint(tx.proposal_key.sequence_number),
        rlp_bytes(tx.payer.as_bytes()),
        rlp_list(&authorizers),
    ])
}

pub fn envelope(tx: &UnsignedTransaction) -> Vec<u8> {
    rlp_list(&[payload(tx), rlp_list(&[])])
}

pub fn envelope_message(tx: &UnsignedTransaction) -> Vec<u8> {
    let envelope = envelope(tx);
    let mut message = Vec::with_capacity(TRANSACTION_DOMAIN_TAG.len() + envelope.len());
    message.extend_from_slice(&TRANSACTION_DOMAIN_TAG);
    message.extend_from_slice(&envelope);
    message
}

/// Payload plus every signature; hashed to form the transaction ID.
pub(crate) fn fingerprint(signed: &SignedTransaction) -> Vec<u8> {
    let tx = signed.transaction();
    let signers = tx.signers();
    let signatures: Vec<Vec<u8>> = signed
        .envelope_signatures()
        .iter()
        .map(|s| {
            let signer_index = signers
                .iter()
                .position(|a| *a == s.address)
                .unwrap_or(signers.len()) as u64;
            rlp_list(&[
                rlp_uint(signer_index),
                rlp_uint(u64::from(s.key_index)),
                rlp_bytes(&s.signature),
            ])
        })
        .collect();

    rlp_list(&[payload(tx), rlp_list(&[]), rlp_list(&signatures)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{Address, Identifier};
    use crate::transaction::types::ProposalKey;

    fn sample_transaction() -> UnsignedTransaction {
        let payer: Address = "f8d6e0586b0a20c7".parse().unwrap();
        UnsignedTransaction {
            script: b"transaction { execute { log(\"hi\") } }".to_vec(),
            arguments: vec![br#"{"type":"String","value":"x"}"#.to_vec()],
            reference_block_id: Identifier::from([7u8; 32]),
            gas_limit: 100,
            proposal_key: ProposalKey {
                address: payer,
                key_index: 0,
                sequence_number: 42,
            },
            payer,
            authorizers: vec![payer],
        }
    }

    #[test]
    fn test_domain_tag_padding() {
        assert_eq!(&TRANSACTION_DOMAIN_TAG[..21], b"FLOW-V0.0-transaction");
        assert!(TRANSACTION_DOMAIN_TAG[21..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_primitive_encodings() {
        assert_eq!(rlp_uint(0), vec![0x80]);
        assert_eq!(rlp_uint(100), vec![0x64]);
        assert_eq!(rlp_uint(1024), vec![0x82, 0x04, 0x00]);
        assert_eq!(rlp_bytes(b"dog"), vec![0x83, b'd', b'o', b'g']);
        assert_eq!(rlp_list(&[]), vec![0xc0]);
        assert_eq!(
            rlp_list(&[rlp_bytes(b"cat"), rlp_bytes(b"dog")]),
            vec![0xc8, 0x83, b'c', b'a', b't', 0x83, b'd', b'o', b'g']
        );
    }

    #[test]
    fn test_envelope_structure() {
        let tx = sample_transaction();
        let message = envelope_message(&tx);
        assert!(message.starts_with(&TRANSACTION_DOMAIN_TAG));

        let mut buf = &message[32..];
        let outer = Header::decode(&mut buf).unwrap();
        assert!(outer.list);
        assert_eq!(outer.payload_length, buf.len());

        let inner = Header::decode(&mut buf).unwrap();
        assert!(inner.list);
        assert_eq!(&buf[inner.payload_length..], &[0xc0]);
    }

    #[test]
    fn test_encoding_is_deterministic_and_field_sensitive() {
        let tx = sample_transaction();
        assert_eq!(envelope_message(&tx), envelope_message(&tx.clone()));

        let mut bumped = tx.clone();
        bumped.proposal_key.sequence_number += 1;
        assert_ne!(envelope_message(&tx), envelope_message(&bumped));
    }
}
