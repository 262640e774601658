//! Request handlers
//!
//! Thin adapters between axum extractors and the dispatcher. Request-level
//! failures (validation) become `ProxyError` responses; downstream outcomes
//! are always returned as results.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use ostrails_protocol::{ErrorResponse, HealthResponse, PushStatus};
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info};

use super::docs::{DOCS_HTML, OPENAPI_JSON};
use super::{AppState, BASE_PATH};
use crate::common::ProxyError;

#[derive(Debug, Default, Deserialize)]
pub struct PushParams {
    pub path: Option<String>,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: format!(
            "API is running. See {}/docs for interactive documentation.",
            BASE_PATH
        ),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn docs() -> Html<&'static str> {
    Html(DOCS_HTML)
}

pub async fn openapi() -> Response {
    match serde_json::from_str::<Value>(OPENAPI_JSON) {
        Ok(mut document) => {
            document["info"]["version"] = Value::String(env!("CARGO_PKG_VERSION").to_string());
            Json(document).into_response()
        }
        Err(e) => {
            error!("Embedded OpenAPI document is invalid: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn submit(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, ProxyError> {
    info!("POST {}/submit ({} bytes)", BASE_PATH, body.len());

    let result = state.dispatcher.submit(&body).await?;
    let status = if result.success {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };
    Ok((status, Json(result)).into_response())
}

pub async fn push(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PushParams>,
    body: Bytes,
) -> Result<Response, ProxyError> {
    info!("POST {}/push ({} bytes)", BASE_PATH, body.len());

    let response = state
        .dispatcher
        .push(&body, params.path.as_deref())
        .await?;
    let status = match response.status {
        PushStatus::Success => StatusCode::OK,
        PushStatus::Partial => StatusCode::MULTI_STATUS,
        PushStatus::Error => StatusCode::BAD_GATEWAY,
    };
    Ok((status, Json(response)).into_response())
}

pub async fn not_found(uri: Uri) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new(
            "NotFound",
            format!("No route for {}", uri.path()),
        )),
    )
}
