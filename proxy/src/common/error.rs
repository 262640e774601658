//! Common Error Types
//!
//! One variant per failure class a caller can observe. Downstream variants
//! carry the downstream HTTP status when a response was received.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ostrails_protocol::{ErrorResponse, SubmissionResult, TargetName};
use serde_json::json;

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Sign-in to the registry failed
    #[error("{message}")]
    Auth {
        status: Option<u16>,
        message: String,
    },

    /// Registry refused the bearer token (401/403)
    #[error("registry rejected the session token (HTTP {status})")]
    TokenExpired { status: u16 },

    #[error("{message}")]
    Submission {
        status: Option<u16>,
        message: String,
    },

    #[error("{message}")]
    Publish {
        status: Option<u16>,
        message: String,
    },

    #[error("{message}")]
    Registration {
        status: Option<u16>,
        message: String,
        malformed_rdf: bool,
    },

    /// Caller payload rejected before any downstream call
    #[error("{0}")]
    Validation(String),
}

impl ProxyError {
    /// Taxonomy name, used as the prefix of a failed result's `error` field
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::Config(_) => "ConfigError",
            ProxyError::Auth { .. } => "AuthError",
            ProxyError::TokenExpired { .. } => "TokenExpired",
            ProxyError::Submission { .. } => "SubmissionError",
            ProxyError::Publish { .. } => "PublishError",
            ProxyError::Registration { .. } => "RegistrationError",
            ProxyError::Validation(_) => "ValidationError",
        }
    }

    /// Downstream HTTP status, if one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            ProxyError::Auth { status, .. }
            | ProxyError::Submission { status, .. }
            | ProxyError::Publish { status, .. }
            | ProxyError::Registration { status, .. } => *status,
            ProxyError::TokenExpired { status } => Some(*status),
            ProxyError::Config(_) | ProxyError::Validation(_) => None,
        }
    }

    /// Convert into the failed result reported for `target`
    ///
    /// An FDP rejection of the RDF itself carries `{"malformed_rdf": true}`
    /// as the result body.
    pub fn into_result(self, target: TargetName) -> SubmissionResult {
        let malformed_rdf = matches!(
            self,
            ProxyError::Registration {
                malformed_rdf: true,
                ..
            }
        );
        let mut result =
            SubmissionResult::failed(target, self.status(), format!("{}: {}", self.kind(), self));
        if malformed_rdf {
            result.body = Some(json!({ "malformed_rdf": true }));
        }
        result
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ProxyError::Validation(message.into())
    }

    /// Map a transport-level reqwest failure for a target's error variant
    pub fn transport_message(err: &reqwest::Error) -> String {
        if err.is_timeout() {
            format!("request timed out: {}", err)
        } else if err.is_connect() {
            format!("could not connect: {}", err)
        } else {
            format!("HTTP request failed: {}", err)
        }
    }

    fn http_status(&self) -> StatusCode {
        match self {
            ProxyError::Validation(_) => StatusCode::BAD_REQUEST,
            ProxyError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        let body = Json(ErrorResponse::new(self.kind(), self.to_string()));
        (status, body).into_response()
    }
}
