//! Client-side transaction lifecycle for the Flow network.
//!
//! Resolves proposal keys, builds and signs transaction envelopes, submits
//! them, waits (bounded and cancellable) for the seal, and extracts results
//! from the emitted events.

pub mod access;
pub mod app;
pub mod cadence;
pub mod config;
pub mod crypto;
pub mod error;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod scripts;
pub mod transaction;

pub use access::{AccessApi, Address, HttpAccessClient, Identifier, TransactionResult};
pub use app::{FlowClient, NewAccountKey, SigningAccount};
pub use config::ClientConfig;
pub use error::{LifecycleError, LifecycleResult};
pub use lifecycle::CancellationToken;
