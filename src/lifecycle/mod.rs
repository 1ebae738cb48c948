//! Transaction lifecycle stages.
//!
//! # Data Flow
//! ```text
//! resolver.rs:   address + key index → ResolvedKey (fresh sequence number)
//!     → transaction::builder (UnsignedTransaction)
//!     → transaction::signing (SignedTransaction)
//! submitter.rs:  SignedTransaction → Identifier, or Rejected
//! poller.rs:     Identifier → TransactionResult (sealed), bounded + cancellable
//! extractor.rs:  TransactionResult → created Address
//! ```
//!
//! # Design Decisions
//! - No stage caches account state; each resolve is a fresh read
//! - Submission happens once; only the status query is retried
//! - A stale-sequence rejection is surfaced to the caller, who re-resolves
//!   and rebuilds

pub mod cancel;
pub mod extractor;
pub mod poller;
pub mod resolver;
pub mod submitter;

pub use cancel::CancellationToken;
pub use extractor::{extract_created_address, ACCOUNT_CREATED_EVENT};
pub use poller::{ConfirmationPoller, PollPolicy};
pub use resolver::{KeyResolver, ResolvedKey};
pub use submitter::Submitter;
