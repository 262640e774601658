//! FAIRsharing Registry Client
//!
//! Sign-in exchange (`POST AUTH_URL` → `jwt`) and authenticated record
//! submission (`POST DATA_URL` with bearer token).

pub mod graphql;
pub mod record;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing::{debug, error, info};

use crate::auth::TokenSource;
use crate::common::http::error_detail;
use crate::common::{read_body, ProxyError, ProxyResult};
use crate::config::Credentials;
use crate::router::{DownstreamResponse, RegistryApi};

pub use graphql::GraphqlResolver;

pub struct RegistryClient {
    http: reqwest::Client,
    credentials: Credentials,
}

impl RegistryClient {
    pub fn new(http: reqwest::Client, credentials: Credentials) -> Self {
        Self { http, credentials }
    }
}

#[async_trait]
impl TokenSource for RegistryClient {
    async fn sign_in(&self) -> ProxyResult<String> {
        let body = json!({
            "user": {
                "login": self.credentials.username,
                "password": self.credentials.password,
            }
        });

        let response = self
            .http
            .post(&self.credentials.auth_url)
            .header(ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Registry sign-in request failed: {}", e);
                ProxyError::Auth {
                    status: None,
                    message: ProxyError::transport_message(&e),
                }
            })?;

        let (status, body) = read_body(response).await.map_err(|e| ProxyError::Auth {
            status: Some(e.status),
            message: e.to_string(),
        })?;
        debug!("Registry sign-in status: {}", status);

        if !(200..300).contains(&status) {
            error!("Registry sign-in rejected with HTTP {}", status);
            return Err(ProxyError::Auth {
                status: Some(status),
                message: format!("sign-in rejected: {}", error_detail(&body)),
            });
        }

        body.get("jwt")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(String::from)
            .ok_or_else(|| ProxyError::Auth {
                status: Some(status),
                message: "sign-in response is missing the jwt token".to_string(),
            })
    }
}

#[async_trait]
impl RegistryApi for RegistryClient {
    async fn submit_record(&self, token: &str, record: &Value) -> ProxyResult<DownstreamResponse> {
        info!("Submitting record to FAIRsharing");

        let response = self
            .http
            .post(&self.credentials.data_url)
            .bearer_auth(token)
            .header(ACCEPT, "application/json")
            .json(record)
            .send()
            .await
            .map_err(|e| {
                error!("Registry submission request failed: {}", e);
                ProxyError::Submission {
                    status: None,
                    message: ProxyError::transport_message(&e),
                }
            })?;

        let code = response.status();
        if code == StatusCode::UNAUTHORIZED || code == StatusCode::FORBIDDEN {
            return Err(ProxyError::TokenExpired {
                status: code.as_u16(),
            });
        }

        let (status, body) = read_body(response).await.map_err(|e| ProxyError::Submission {
            status: Some(e.status),
            message: e.to_string(),
        })?;
        debug!("Registry submission status: {}", status);

        if !code.is_success() {
            error!("FAIRsharing rejected record with HTTP {}", status);
            return Err(ProxyError::Submission {
                status: Some(status),
                message: format!("registry rejected record: {}", error_detail(&body)),
            });
        }

        Ok(DownstreamResponse { status, body })
    }
}
