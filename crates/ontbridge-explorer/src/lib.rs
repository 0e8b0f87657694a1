//! Typed client for the two HTTP surfaces an Ontology dApp shim talks to:
//!
//! - the node's smart-contract event endpoint, keyed by transaction hash
//! - the explorer's address summary endpoint, used for token balances
//!
//! Both return the same `{ Error, Desc, Result }` envelope. The `Result` field is
//! kept raw until the caller knows `Error == 0`, because the node sends an empty
//! string there for transactions it has not indexed yet.

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub const DEFAULT_NODE_URL: &str = "https://dappnode1.ont.io:10334";
pub const DEFAULT_EXPLORER_URL: &str = "https://explorer.ont.io";
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_REQUEST_ATTEMPTS: usize = 2;
pub const BALANCE_PAGE_SIZE: u32 = 20;
pub const BALANCE_PAGE_NUMBER: u32 = 0;

/// `Error` value the node and explorer use for success.
pub const SUCCESS_CODE: i64 = 0;

#[derive(Debug, Clone)]
pub struct ExplorerClientConfig {
    pub node_url: String,
    pub explorer_url: String,
    pub timeout_ms: u64,
    pub request_attempts: usize,
}

impl Default for ExplorerClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_NODE_URL, DEFAULT_EXPLORER_URL)
    }
}

impl ExplorerClientConfig {
    #[must_use]
    pub fn new(node_url: impl Into<String>, explorer_url: impl Into<String>) -> Self {
        Self {
            node_url: node_url.into(),
            explorer_url: explorer_url.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            request_attempts: DEFAULT_REQUEST_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExplorerClient {
    node_url: String,
    explorer_url: String,
    timeout: Duration,
    request_attempts: usize,
    http: reqwest::Client,
}

#[derive(Debug, Error)]
pub enum ExplorerClientError {
    #[error("explorer_client_base_url_missing:{which}")]
    BaseUrlMissing { which: &'static str },
    #[error("explorer_client_invalid_path")]
    InvalidPath,
    #[error("explorer_request_failed:{message}")]
    Request { message: String },
    #[error("explorer_read_failed:{message}")]
    Read { message: String },
    #[error("explorer_http_{status}:{body}")]
    Http { status: StatusCode, body: String },
    #[error("explorer_json_decode_failed:{message}")]
    Decode { message: String },
}

/// Common response wrapper of the node and explorer APIs.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApiEnvelope {
    pub error: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub desc: String,
    #[serde(default)]
    pub result: serde_json::Value,
}

impl ApiEnvelope {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error == SUCCESS_CODE
    }

    /// Decodes `Result` into `T`. A null or empty-string `Result` yields `None`.
    pub fn decode_result<T>(&self) -> Result<Option<T>, ExplorerClientError>
    where
        T: DeserializeOwned,
    {
        match &self.result {
            serde_json::Value::Null => Ok(None),
            serde_json::Value::String(text) if text.trim().is_empty() => Ok(None),
            value => serde_json::from_value::<T>(value.clone())
                .map(Some)
                .map_err(|error| ExplorerClientError::Decode {
                    message: error.to_string(),
                }),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct TxEvents {
    #[serde(default, deserialize_with = "null_as_default")]
    pub tx_hash: String,
    #[serde(default)]
    pub state: Option<i64>,
    #[serde(default)]
    pub gas_consumed: Option<u64>,
    /// Required: a null or missing list is a malformed event record, not an
    /// empty one.
    pub notify: Vec<NotifyRecord>,
}

impl TxEvents {
    /// First notification emitted by `contract_address`, in emission order.
    #[must_use]
    pub fn notify_for(&self, contract_address: &str) -> Option<&NotifyRecord> {
        self.notify
            .iter()
            .find(|record| record.contract_address == contract_address)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct NotifyRecord {
    pub contract_address: String,
    #[serde(default)]
    pub states: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct AddressSummary {
    #[serde(default, deserialize_with = "null_as_default")]
    pub asset_balance: Vec<AssetBalance>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct AssetBalance {
    pub asset_name: String,
    #[serde(deserialize_with = "number_or_numeric_string")]
    pub balance: f64,
}

impl ExplorerClient {
    pub fn new(config: ExplorerClientConfig) -> Result<Self, ExplorerClientError> {
        let node_url = normalize_base_url(&config.node_url, "node")?;
        let explorer_url = normalize_base_url(&config.explorer_url, "explorer")?;
        Ok(Self {
            node_url,
            explorer_url,
            timeout: Duration::from_millis(config.timeout_ms.max(250)),
            request_attempts: config.request_attempts.max(1),
            http: reqwest::Client::new(),
        })
    }

    #[must_use]
    pub fn node_url(&self) -> &str {
        &self.node_url
    }

    #[must_use]
    pub fn explorer_url(&self) -> &str {
        &self.explorer_url
    }

    #[must_use]
    pub fn tx_events_path(txhash: &str) -> String {
        format!("/api/v1/smartcode/event/txhash/{}", txhash.trim())
    }

    #[must_use]
    pub fn address_summary_path(address: &str) -> String {
        format!(
            "/api/v1/explorer/address/{}/{BALANCE_PAGE_SIZE}/{BALANCE_PAGE_NUMBER}",
            address.trim()
        )
    }

    /// Smart-contract events recorded for `txhash`.
    pub async fn tx_events(&self, txhash: &str) -> Result<ApiEnvelope, ExplorerClientError> {
        let url = join_url(&self.node_url, &Self::tx_events_path(txhash))
            .ok_or(ExplorerClientError::InvalidPath)?;
        self.get_json(url.as_str()).await
    }

    /// Address summary (first page of asset balances) for `address`.
    pub async fn address_summary(&self, address: &str) -> Result<ApiEnvelope, ExplorerClientError> {
        let url = join_url(&self.explorer_url, &Self::address_summary_path(address))
            .ok_or(ExplorerClientError::InvalidPath)?;
        self.get_json(url.as_str()).await
    }

    pub async fn get_json<T>(&self, url: &str) -> Result<T, ExplorerClientError>
    where
        T: DeserializeOwned,
    {
        let response = self.send_get(url).await?;
        decode_json_response(response).await
    }

    async fn send_get(&self, url: &str) -> Result<reqwest::Response, ExplorerClientError> {
        let mut last_error: Option<String> = None;

        for attempt in 0..self.request_attempts {
            let request = self
                .http
                .get(url)
                .header("x-request-id", format!("req_{}", Uuid::new_v4().simple()))
                .timeout(self.timeout);

            match request.send().await {
                Ok(response) => return Ok(response),
                Err(error) => {
                    tracing::debug!(%url, attempt, error = %error, "explorer request failed");
                    last_error = Some(error.to_string());
                    if attempt + 1 >= self.request_attempts {
                        break;
                    }
                }
            }
        }

        Err(ExplorerClientError::Request {
            message: last_error.unwrap_or_else(|| "unknown".to_string()),
        })
    }
}

pub fn format_http_error(status: StatusCode, body: &[u8]) -> ExplorerClientError {
    let body = non_empty_string(String::from_utf8_lossy(body).to_string())
        .unwrap_or_else(|| "<empty>".to_string());
    ExplorerClientError::Http { status, body }
}

fn normalize_base_url(base_url: &str, which: &'static str) -> Result<String, ExplorerClientError> {
    let trimmed = base_url.trim();
    if trimmed.is_empty() {
        return Err(ExplorerClientError::BaseUrlMissing { which });
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

fn join_url(base_url: &str, path: &str) -> Option<String> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with('/') {
        Some(format!("{base_url}{trimmed}"))
    } else {
        Some(format!("{base_url}/{trimmed}"))
    }
}

async fn decode_json_response<T>(response: reqwest::Response) -> Result<T, ExplorerClientError>
where
    T: DeserializeOwned,
{
    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|error| ExplorerClientError::Read {
            message: error.to_string(),
        })?;

    if !status.is_success() {
        return Err(format_http_error(status, &bytes));
    }

    serde_json::from_slice::<T>(&bytes).map_err(|error| ExplorerClientError::Decode {
        message: error.to_string(),
    })
}

fn non_empty_string(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

// The explorer reports balances as decimal strings for some assets.
fn number_or_numeric_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(number) => number
            .as_f64()
            .ok_or_else(|| de::Error::custom("balance out of range")),
        serde_json::Value::String(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|error| de::Error::custom(format!("invalid balance {text:?}: {error}"))),
        other => Err(de::Error::custom(format!("invalid balance {other}"))),
    }
}
