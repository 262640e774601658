use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;

use crate::{ErrorResponse, HealthResponse, PushResponse, SubmissionResult};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("proxy rejected request ({status}) {kind}: {message}")]
    Rejected {
        status: u16,
        kind: String,
        message: String,
    },

    #[error("unexpected response ({status}): {body}")]
    Unexpected { status: u16, body: String },
}

/// HTTP client for a running proxy
///
/// `base_url` is the service prefix, e.g. `http://localhost:8000/questionnaire`.
pub struct ProxyClient {
    base_url: String,
    http: reqwest::Client,
}

impl ProxyClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, Duration::from_secs(60))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let response = self.http.get(format!("{}/", self.base_url)).send().await?;
        decode(response, &[StatusCode::OK]).await
    }

    /// Submit a FAIRsharing JSON record. Downstream failures come back as a
    /// failed `SubmissionResult`, not as `Err`.
    pub async fn submit(&self, record: &Value) -> Result<SubmissionResult, ClientError> {
        let response = self
            .http
            .post(format!("{}/submit", self.base_url))
            .json(record)
            .send()
            .await?;
        decode(response, &[StatusCode::OK, StatusCode::BAD_GATEWAY]).await
    }

    /// Push a Turtle record to GitHub and the FDP.
    pub async fn push(&self, turtle: String, path: Option<&str>) -> Result<PushResponse, ClientError> {
        let mut request = self
            .http
            .post(format!("{}/push", self.base_url))
            .header("Content-Type", "text/turtle")
            .body(turtle);
        if let Some(path) = path {
            request = request.query(&[("path", path)]);
        }
        let response = request.send().await?;
        decode(
            response,
            &[StatusCode::OK, StatusCode::MULTI_STATUS, StatusCode::BAD_GATEWAY],
        )
        .await
    }
}

async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    expected: &[StatusCode],
) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.text().await?;

    if expected.contains(&status) {
        return serde_json::from_str(&body).map_err(|_| ClientError::Unexpected {
            status: status.as_u16(),
            body,
        });
    }

    match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(err) => Err(ClientError::Rejected {
            status: status.as_u16(),
            kind: err.kind,
            message: err.message,
        }),
        Err(_) => Err(ClientError::Unexpected {
            status: status.as_u16(),
            body,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ProxyClient::new("http://localhost:8000/questionnaire/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000/questionnaire");
    }
}
