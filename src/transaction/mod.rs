//! Transaction assembly, canonical encoding and envelope signing.
//!
//! # Data Flow
//! ```text
//! ResolvedKey + script + arguments
//!     → builder.rs (validate, assemble UnsignedTransaction)
//!     → encoding.rs (canonical RLP envelope message)
//!     → signing.rs (hash, sign, attach envelope signature)
//!     → SignedTransaction
//! ```

pub mod builder;
pub mod encoding;
pub mod signing;
pub mod types;

pub use builder::TransactionBuilder;
pub use signing::{sign_envelope, sign_with_resolved_key};
pub use types::{EnvelopeSignature, ProposalKey, SignedTransaction, UnsignedTransaction};
