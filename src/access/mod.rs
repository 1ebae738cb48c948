//! Network access subsystem.
//!
//! # Data Flow
//! ```text
//! lifecycle stages
//!     → api.rs (AccessApi trait, the only seam to the network)
//!     → http.rs (Flow REST access API with timeouts and read failover)
//!     → wire.rs (JSON request/response bodies)
//!     → types.rs (addresses, keys, results, events)
//! ```
//!
//! # Constraints
//! - Every request has a timeout
//! - Reads may fail over to secondary endpoints; submissions never do
//! - Nothing here caches account state

pub mod api;
pub mod http;
pub mod types;
pub mod wire;

pub use api::AccessApi;
pub use http::HttpAccessClient;
pub use types::{
    Account, AccountKey, Address, BlockHeader, Event, Identifier, TransactionResult,
    TransactionStatus, ADDRESS_LENGTH,
};
