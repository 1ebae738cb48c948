//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Lifecycle stages produce:
//!     → logging.rs (structured log events: tx id, address, key index, status)
//!     → metrics.rs (counters and latency histograms)
//!
//! Consumers:
//!     → stderr (pretty or JSON)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Logs go to stderr so command output on stdout stays machine-readable
//! - Private key material never reaches a log field
//! - Metrics are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
