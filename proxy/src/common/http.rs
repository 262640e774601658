//! HTTP Client Utilities
//!
//! Shared HTTP client creation with consistent configuration.

use std::time::Duration;

use serde_json::Value;
use tracing::warn;

use crate::common::ProxyError;
use crate::config::ConfigError;

const USER_AGENT: &str = concat!("ostrails-proxy/", env!("CARGO_PKG_VERSION"));

/// Create the reqwest client shared by all downstream integrations
///
/// `timeout` bounds every downstream call end to end.
pub fn create_http_client(timeout: Duration) -> Result<reqwest::Client, ConfigError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10).min(timeout))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| ConfigError::HttpClient(e.to_string()))
}

/// The status line arrived but the body could not be read
#[derive(Debug, thiserror::Error)]
#[error("failed to read response body (HTTP {status}): {message}")]
pub struct BodyError {
    pub status: u16,
    pub message: String,
}

/// Read a response body as JSON, falling back to a JSON string
pub async fn read_body(response: reqwest::Response) -> Result<(u16, Value), BodyError> {
    let status = response.status().as_u16();
    match response.text().await {
        Ok(text) => Ok((status, parse_body(&text))),
        Err(e) => {
            warn!("Reading HTTP {} response body failed: {}", status, e);
            Err(BodyError {
                status,
                message: ProxyError::transport_message(&e),
            })
        }
    }
}

pub(crate) fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Object(serde_json::Map::new());
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Short human-readable detail from a downstream error body
pub(crate) fn error_detail(body: &Value) -> String {
    match body {
        Value::String(s) => s.clone(),
        Value::Object(obj) => obj
            .get("message")
            .or_else(|| obj.get("error"))
            .or_else(|| obj.get("errors"))
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .unwrap_or_else(|| body.to_string()),
        other => other.to_string(),
    }
}
