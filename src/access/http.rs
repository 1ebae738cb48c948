//! Flow REST access API client with timeout and failover.
//!
//! # Responsibilities
//! - Map `AccessApi` calls onto the REST endpoints
//! - Enforce connect and request timeouts
//! - Fail reads over to secondary endpoints on transport errors
//! - Classify HTTP failures (404 → NotFound, 400 on submit → Rejected)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use crate::access::api::AccessApi;
use crate::access::types::{Account, Address, BlockHeader, Identifier, TransactionResult};
use crate::access::wire::{
    AccountResponse, BlockResponse, ErrorResponse, TransactionBody, TransactionIdResponse,
    TransactionResultResponse,
};
use crate::config::schema::AccessConfig;
use crate::error::{LifecycleError, LifecycleResult};
use crate::observability::metrics;
use crate::transaction::SignedTransaction;

/// REST access API client. Cheap to clone.
#[derive(Clone)]
pub struct HttpAccessClient {
    http: reqwest::Client,
    /// Primary endpoint first, then failovers.
    endpoints: Vec<Url>,
    timeout_secs: u64,
}

/// Normalise a base URL so relative joins append to its path.
fn base_url(raw: &str) -> LifecycleResult<Url> {
    let mut url: Url = raw
        .parse()
        .map_err(|e| LifecycleError::Validation(format!("Invalid access API URL '{}': {}", raw, e)))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Message for a non-2xx response. Never empty.
fn describe_error_body<E: std::fmt::Display>(body: Result<String, E>) -> String {
    match body {
        Ok(body) => {
            let message = ErrorResponse::message_from(&body);
            if message.is_empty() {
                "<empty body>".to_string()
            } else {
                message
            }
        }
        Err(e) => format!("<unreadable body: {}>", e),
    }
}

async fn error_message(response: reqwest::Response) -> String {
    describe_error_body(response.text().await)
}

impl HttpAccessClient {
    /// Create a client for the configured endpoints.
    ///
    /// An invalid primary URL is an error; invalid failover URLs are skipped
    /// with a warning.
    pub fn new(config: &AccessConfig) -> LifecycleResult<Self> {
        let mut endpoints = vec![base_url(&config.api_url)?];
        for raw in &config.failover_urls {
            match base_url(raw) {
                Ok(url) => endpoints.push(url),
                Err(_) => tracing::warn!(url = %raw, "Ignoring invalid failover access API URL"),
            }
        }

        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs));
        if config.no_proxy {
            builder = builder.no_proxy();
        }
        let http = builder
            .build()
            .map_err(|e| LifecycleError::Access(format!("Failed to build HTTP client: {}", e)))?;

        tracing::info!(
            api_url = %config.api_url,
            failovers = endpoints.len() - 1,
            timeout_secs = config.request_timeout_secs,
            "Access client initialized"
        );

        Ok(Self {
            http,
            endpoints,
            timeout_secs: config.request_timeout_secs,
        })
    }

    pub fn endpoints(&self) -> &[Url] {
        &self.endpoints
    }

    fn transport_error(&self, error: reqwest::Error) -> LifecycleError {
        if error.is_timeout() {
            LifecycleError::Timeout(self.timeout_secs)
        } else {
            LifecycleError::Access(error.to_string())
        }
    }

    async fn get_once<T: DeserializeOwned>(
        &self,
        base: &Url,
        path: &str,
        query: &[(&str, &str)],
    ) -> LifecycleResult<T> {
        let url = base
            .join(path)
            .map_err(|e| LifecycleError::Access(format!("Invalid request path '{}': {}", path, e)))?;

        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(LifecycleError::NotFound(error_message(response).await));
        }
        if !status.is_success() {
            return Err(LifecycleError::Access(format!(
                "HTTP {}: {}",
                status,
                error_message(response).await
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| LifecycleError::Access(format!("Malformed response from {}: {}", path, e)))
    }

    /// GET with failover across endpoints. Only transient failures move on to
    /// the next endpoint.
    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
        query: &[(&str, &str)],
    ) -> LifecycleResult<T> {
        let mut last_error = None;

        for (i, base) in self.endpoints.iter().enumerate() {
            match self.get_once(base, path, query).await {
                Ok(value) => {
                    metrics::record_access_request(operation, true);
                    return Ok(value);
                }
                Err(e) if e.is_transient() => {
                    tracing::warn!(
                        endpoint_idx = i,
                        operation = operation,
                        error = %e,
                        "Access API error, trying next endpoint"
                    );
                    last_error = Some(e);
                }
                Err(e) => {
                    metrics::record_access_request(operation, false);
                    return Err(e);
                }
            }
        }

        metrics::record_access_request(operation, false);
        Err(last_error.unwrap_or_else(|| {
            LifecycleError::Access("No access API endpoints configured".to_string())
        }))
    }
}

#[async_trait]
impl AccessApi for HttpAccessClient {
    async fn get_account(&self, address: &Address) -> LifecycleResult<Account> {
        let path = format!("v1/accounts/{}", address.to_hex());
        let response: AccountResponse = self
            .get_json(
                "get_account",
                &path,
                &[("block_height", "sealed"), ("expand", "keys")],
            )
            .await
            .map_err(|e| match e {
                LifecycleError::NotFound(_) => {
                    LifecycleError::NotFound(format!("Account {} not found", address))
                }
                other => other,
            })?;
        Account::try_from(response)
    }

    async fn get_latest_block_header(&self) -> LifecycleResult<BlockHeader> {
        let blocks: Vec<BlockResponse> = self
            .get_json("get_latest_block_header", "v1/blocks", &[("height", "sealed")])
            .await?;
        let block = blocks
            .into_iter()
            .next()
            .ok_or_else(|| LifecycleError::Access("No sealed block returned".to_string()))?;
        BlockHeader::try_from(block.header)
    }

    async fn send_transaction(&self, transaction: &SignedTransaction) -> LifecycleResult<Identifier> {
        // Submissions go to the primary endpoint only.
        let base = self
            .endpoints
            .first()
            .ok_or_else(|| LifecycleError::Access("No access API endpoints configured".to_string()))?;
        let url = base
            .join("v1/transactions")
            .map_err(|e| LifecycleError::Access(format!("Invalid request path: {}", e)))?;

        let response = self
            .http
            .post(url)
            .json(&TransactionBody::from(transaction))
            .send()
            .await
            .map_err(|e| {
                metrics::record_access_request("send_transaction", false);
                self.transport_error(e)
            })?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST {
            metrics::record_access_request("send_transaction", false);
            return Err(LifecycleError::rejected(error_message(response).await));
        }
        if !status.is_success() {
            metrics::record_access_request("send_transaction", false);
            return Err(LifecycleError::Access(format!(
                "HTTP {}: {}",
                status,
                error_message(response).await
            )));
        }

        let created: TransactionIdResponse = response.json().await.map_err(|e| {
            LifecycleError::Access(format!("Malformed transaction submission response: {}", e))
        })?;
        metrics::record_access_request("send_transaction", true);
        created.id.parse::<Identifier>().map_err(|e| {
            LifecycleError::Access(format!("Malformed transaction id in response: {}", e))
        })
    }

    async fn get_transaction_result(&self, id: &Identifier) -> LifecycleResult<TransactionResult> {
        let path = format!("v1/transaction_results/{}", id.to_hex());
        let response: TransactionResultResponse =
            self.get_json("get_transaction_result", &path, &[]).await?;
        response.into_result(*id)
    }
}

impl std::fmt::Debug for HttpAccessClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let endpoints: Vec<&str> = self.endpoints.iter().map(Url::as_str).collect();
        f.debug_struct("HttpAccessClient")
            .field("endpoints", &endpoints)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
