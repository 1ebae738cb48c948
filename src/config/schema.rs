//! Configuration schema definitions.
//!
//! All sections default, so an empty file is a valid configuration pointed at
//! a local emulator.

use serde::{Deserialize, Serialize};

use crate::crypto::PRIVATE_KEY_ENV_VAR;

/// Root configuration for the client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Access API endpoints and timeouts.
    pub access: AccessConfig,

    /// The account that proposes, pays for and authorizes transactions.
    pub signer: SignerConfig,

    /// Transaction defaults.
    pub transaction: TransactionConfig,

    /// Confirmation polling bounds.
    pub confirmation: ConfirmationConfig,

    /// Backoff for transient status-query failures.
    pub retries: RetryConfig,

    /// Script overrides.
    pub scripts: ScriptsConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,
}

/// Access API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AccessConfig {
    /// REST access API base URL.
    pub api_url: String,

    /// Endpoints tried in order when a read against `api_url` fails.
    pub failover_urls: Vec<String>,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Ignore `HTTP_PROXY` and friends.
    pub no_proxy: bool,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8888".to_string(),
            failover_urls: Vec::new(),
            request_timeout_secs: 10,
            connect_timeout_secs: 5,
            no_proxy: false,
        }
    }
}

/// Signing account configuration. The private key itself is read from the
/// environment, never from this file.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SignerConfig {
    /// Account address (hex, optional `0x`).
    pub address: String,

    /// Index of the key on that account.
    pub key_index: u32,

    /// `ECDSA_P256` or `ECDSA_secp256k1`.
    pub signature_algorithm: String,

    /// Environment variable holding the hex private key.
    pub private_key_env: String,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            // Emulator service account.
            address: "f8d6e0586b0a20c7".to_string(),
            key_index: 0,
            signature_algorithm: "ECDSA_P256".to_string(),
            private_key_env: PRIVATE_KEY_ENV_VAR.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransactionConfig {
    /// Computation limit attached to every transaction.
    pub gas_limit: u64,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self { gas_limit: 100 }
    }
}

/// Confirmation polling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfirmationConfig {
    /// Wait between status queries in milliseconds.
    pub poll_interval_ms: u64,

    /// Maximum number of status queries per transaction.
    pub max_attempts: u32,

    /// Overall deadline in seconds.
    pub timeout_secs: u64,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            max_attempts: 180,
            timeout_secs: 300,
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 200,
            max_delay_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ScriptsConfig {
    /// Directory whose `.cdc` files replace the embedded scripts by name.
    pub directory: Option<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// `pretty` or `json`.
    pub log_format: String,

    /// Start the Prometheus exporter.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
