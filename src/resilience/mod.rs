//! Resilience helpers.
//!
//! # Design Decisions
//! - Every access API request has a deadline (enforced in the HTTP client)
//! - Only reads are retried; a submission is never resent
//! - Retries back off exponentially with jitter

pub mod backoff;

pub use backoff::Backoff;
