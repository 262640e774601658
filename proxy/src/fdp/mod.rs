//! FAIR Data Point Registrar
//!
//! Posts the Turtle record to the configured FDP endpoint. The FDP is
//! expected to reference the record just committed to GitHub, so it always
//! runs after the publish stage.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use tracing::{debug, error, info};
use zeroize::Zeroizing;

use crate::common::http::error_detail;
use crate::common::{read_body, ProxyError, ProxyResult};
use crate::rdf::RdfRecord;
use crate::router::{DownstreamResponse, Registrar};

pub struct FdpRegistrar {
    http: reqwest::Client,
    endpoint: Option<String>,
    token: Option<Zeroizing<String>>,
}

impl FdpRegistrar {
    pub fn new(http: reqwest::Client, endpoint: Option<String>, token: Option<String>) -> Self {
        Self {
            http,
            endpoint,
            token: token.map(Zeroizing::new),
        }
    }
}

#[async_trait]
impl Registrar for FdpRegistrar {
    async fn register(&self, record: &RdfRecord) -> ProxyResult<DownstreamResponse> {
        let Some(endpoint) = self.endpoint.as_deref() else {
            return Err(ProxyError::Registration {
                status: None,
                message: "FDP endpoint not configured (set FDP_URL)".to_string(),
                malformed_rdf: false,
            });
        };

        info!("Registering {} with FDP", record.subject());

        let mut request = self
            .http
            .post(endpoint)
            .header(CONTENT_TYPE, "text/turtle")
            .header(ACCEPT, "text/turtle, application/json;q=0.9")
            .body(record.text().to_string());
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.as_str());
        }

        let response = request.send().await.map_err(|e| {
            error!("FDP registration request failed: {}", e);
            ProxyError::Registration {
                status: None,
                message: ProxyError::transport_message(&e),
                malformed_rdf: false,
            }
        })?;

        let code = response.status();
        let (status, body) = read_body(response).await.map_err(|e| ProxyError::Registration {
            status: Some(e.status),
            message: e.to_string(),
            malformed_rdf: false,
        })?;
        debug!("FDP registration status: {}", status);

        if code.is_success() {
            return Ok(DownstreamResponse { status, body });
        }

        let malformed_rdf =
            code == StatusCode::BAD_REQUEST || code == StatusCode::UNPROCESSABLE_ENTITY;
        let message = if malformed_rdf {
            format!("FDP rejected the RDF record: {}", error_detail(&body))
        } else {
            format!("FDP registration failed: {}", error_detail(&body))
        };
        error!("FDP returned HTTP {}", status);

        Err(ProxyError::Registration {
            status: Some(status),
            message,
            malformed_rdf,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::tests::METRIC_TTL;
    use crate::test_support::spawn_fake;
    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode as AxumStatus};
    use axum::routing::post;
    use axum::{Json, Router};
    use ostrails_protocol::TargetName;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn registrar(endpoint: Option<String>, token: Option<&str>) -> FdpRegistrar {
        let http = crate::common::create_http_client(Duration::from_secs(2)).unwrap();
        FdpRegistrar::new(http, endpoint, token.map(String::from))
    }

    fn record() -> RdfRecord {
        RdfRecord::parse(METRIC_TTL.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_register_posts_turtle() {
        let app = Router::new().route(
            "/fdp",
            post(|headers: HeaderMap, body: String| async move {
                assert_eq!(headers["content-type"], "text/turtle");
                assert_eq!(headers["authorization"], "Bearer fdp-token");
                assert_eq!(body, METRIC_TTL);
                (AxumStatus::CREATED, Json(json!({"registered": true})))
            }),
        );
        let base = spawn_fake(app).await;

        let resp = registrar(Some(format!("{}/fdp", base)), Some("fdp-token"))
            .register(&record())
            .await
            .unwrap();
        assert_eq!(resp.status, 201);
        assert_eq!(resp.body["registered"], true);
    }

    #[tokio::test]
    async fn test_register_malformed_rdf() {
        let app = Router::new().route(
            "/fdp",
            post(|| async { (AxumStatus::BAD_REQUEST, "Unexpected token at line 3") }),
        );
        let base = spawn_fake(app).await;

        let err = registrar(Some(format!("{}/fdp", base)), None)
            .register(&record())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProxyError::Registration {
                status: Some(400),
                malformed_rdf: true,
                ..
            }
        ));
        assert!(err.to_string().contains("Unexpected token"));

        let result = err.into_result(TargetName::Fdp);
        assert!(!result.success);
        assert_eq!(result.body, Some(json!({"malformed_rdf": true})));
    }

    #[tokio::test]
    async fn test_register_unreachable() {
        let err = registrar(Some("http://127.0.0.1:9/fdp".to_string()), None)
            .register(&record())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "RegistrationError");
        assert_eq!(err.status(), None);
    }

    #[tokio::test]
    async fn test_register_timeout_attempted_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route(
                "/fdp",
                post(|State(calls): State<Arc<AtomicUsize>>| async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_secs(3)).await;
                    AxumStatus::CREATED
                }),
            )
            .with_state(calls.clone());
        let base = spawn_fake(app).await;

        let http = crate::common::create_http_client(Duration::from_millis(300)).unwrap();
        let err = FdpRegistrar::new(http, Some(format!("{}/fdp", base)), None)
            .register(&record())
            .await
            .unwrap_err();

        let result = err.into_result(TargetName::Fdp);
        assert!(!result.success);
        assert_eq!(result.status, None);
        let message = result.error.unwrap();
        assert!(message.starts_with("RegistrationError: request timed out"), "{}", message);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_register_without_endpoint() {
        let err = registrar(None, None).register(&record()).await.unwrap_err();
        assert!(err.to_string().contains("not configured"));
    }
}
