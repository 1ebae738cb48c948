//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, attempts > 0)
//! - Check that names and addresses parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function: ClientConfig → Result<(), Vec<ValidationError>>

use std::fmt;
use std::net::SocketAddr;

use crate::access::Address;
use crate::config::schema::ClientConfig;
use crate::crypto::SignatureAlgorithm;

/// Longest accepted confirmation wait (one day).
pub const MAX_CONFIRMATION_TIMEOUT_SECS: u64 = 86_400;

/// Longest accepted poll interval or retry delay (one hour).
pub const MAX_DELAY_MS: u64 = 3_600_000;

/// One semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending key, e.g. `access.api_url`.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check `config` and collect every problem found.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let access = &config.access;
    if access.api_url.trim().is_empty() {
        errors.push(ValidationError::new("access.api_url", "must not be empty"));
    } else if let Err(e) = access.api_url.parse::<url::Url>() {
        errors.push(ValidationError::new("access.api_url", format!("invalid URL: {}", e)));
    }
    for (i, failover) in access.failover_urls.iter().enumerate() {
        if let Err(e) = failover.parse::<url::Url>() {
            errors.push(ValidationError::new(
                &format!("access.failover_urls[{}]", i),
                format!("invalid URL: {}", e),
            ));
        }
    }
    if access.request_timeout_secs == 0 {
        errors.push(ValidationError::new("access.request_timeout_secs", "must be greater than 0"));
    }
    if access.connect_timeout_secs == 0 {
        errors.push(ValidationError::new("access.connect_timeout_secs", "must be greater than 0"));
    }

    if let Err(e) = config.signer.address.parse::<Address>() {
        errors.push(ValidationError::new("signer.address", e.to_string()));
    }
    if let Err(e) = config.signer.signature_algorithm.parse::<SignatureAlgorithm>() {
        errors.push(ValidationError::new("signer.signature_algorithm", e.to_string()));
    }
    if config.signer.private_key_env.trim().is_empty() {
        errors.push(ValidationError::new("signer.private_key_env", "must not be empty"));
    }

    if config.transaction.gas_limit == 0 {
        errors.push(ValidationError::new("transaction.gas_limit", "must be greater than 0"));
    }

    let confirmation = &config.confirmation;
    if confirmation.poll_interval_ms == 0 {
        errors.push(ValidationError::new("confirmation.poll_interval_ms", "must be greater than 0"));
    } else if confirmation.poll_interval_ms > MAX_DELAY_MS {
        errors.push(ValidationError::new(
            "confirmation.poll_interval_ms",
            format!("must not exceed {}", MAX_DELAY_MS),
        ));
    }
    if confirmation.max_attempts == 0 {
        errors.push(ValidationError::new("confirmation.max_attempts", "must be greater than 0"));
    }
    if confirmation.timeout_secs == 0 {
        errors.push(ValidationError::new("confirmation.timeout_secs", "must be greater than 0"));
    } else if confirmation.timeout_secs > MAX_CONFIRMATION_TIMEOUT_SECS {
        errors.push(ValidationError::new(
            "confirmation.timeout_secs",
            format!("must not exceed {}", MAX_CONFIRMATION_TIMEOUT_SECS),
        ));
    }

    if config.retries.max_delay_ms > MAX_DELAY_MS {
        errors.push(ValidationError::new(
            "retries.max_delay_ms",
            format!("must not exceed {}", MAX_DELAY_MS),
        ));
    }

    if config.retries.base_delay_ms > config.retries.max_delay_ms {
        errors.push(ValidationError::new(
            "retries.base_delay_ms",
            format!(
                "must not exceed retries.max_delay_ms ({})",
                config.retries.max_delay_ms
            ),
        ));
    }

    let observability = &config.observability;
    if !matches!(
        observability.log_format.to_ascii_lowercase().as_str(),
        "pretty" | "json"
    ) {
        errors.push(ValidationError::new(
            "observability.log_format",
            format!("expected 'pretty' or 'json', got '{}'", observability.log_format),
        ));
    }
    if observability.metrics_enabled && observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("invalid socket address '{}'", observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
