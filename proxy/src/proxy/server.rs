//! HTTP Server
//!
//! Binds the configured address and serves the questionnaire router until
//! ctrl-c or an explicit shutdown signal.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::handlers;
use super::{AppState, BASE_PATH};
use crate::config::{Config, ConfigError};
use crate::router::Dispatcher;

pub struct ProxyServer {
    bind_addr: SocketAddr,
    router: Router,
    shutdown_tx: watch::Sender<bool>,
}

impl ProxyServer {
    pub fn new(bind_addr: SocketAddr, dispatcher: Dispatcher, cors_origins: &[String]) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            bind_addr,
            router: build_router(AppState::new(dispatcher), cors_origins),
            shutdown_tx,
        }
    }

    /// Wire the real downstream clients and build the router
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let dispatcher = Dispatcher::from_config(config)?;
        Ok(Self::new(config.bind_addr, dispatcher, &config.cors_origins))
    }

    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    /// Get the router (for testing)
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Signal shutdown; takes effect even if `start` has not run yet
    pub fn shutdown(&self) {
        self.shutdown_tx.send_replace(true);
    }

    /// Serve until ctrl-c or `shutdown()`
    pub async fn start(&self) -> Result<(), std::io::Error> {
        let listener = TcpListener::bind(self.bind_addr).await?;
        info!(
            "OSTrails proxy listening on http://{}{}/",
            listener.local_addr()?,
            BASE_PATH
        );

        let shutdown_rx = self.shutdown_tx.subscribe();
        axum::serve(listener, self.router.clone())
            .with_graceful_shutdown(async move {
                tokio::select! {
                    result = tokio::signal::ctrl_c() => {
                        if let Err(e) = result {
                            warn!("Failed to listen for ctrl-c: {}", e);
                        }
                    }
                    _ = stop_requested(shutdown_rx) => {}
                }
                info!("Proxy server shutting down");
            })
            .await
    }
}

async fn stop_requested(mut rx: watch::Receiver<bool>) {
    let _ = rx.wait_for(|stop| *stop).await;
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = if origins.is_empty() {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<_> = origins
            .iter()
            .filter_map(|s| match s.parse() {
                Ok(origin) => Some(origin),
                Err(_) => {
                    warn!("Ignoring unparseable CORS origin {:?}", s);
                    None
                }
            })
            .collect();
        CorsLayer::new().allow_origin(AllowOrigin::list(origins))
    };
    cors.allow_methods(Any).allow_headers(Any)
}

/// Build the full router: every route lives under `/questionnaire`
pub fn build_router(state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let at = |suffix: &str| format!("{}{}", BASE_PATH, suffix);

    Router::new()
        .route(BASE_PATH, get(handlers::health))
        .route(&at("/"), get(handlers::health))
        .route(&at("/docs"), get(handlers::docs))
        .route(&at("/openapi.json"), get(handlers::openapi))
        .route(&at("/submit"), post(handlers::submit))
        .route(&at("/push"), post(handlers::push))
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::{base_env, load};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_from_config_builds_router() {
        let config = load(&base_env()).unwrap();
        let server = ProxyServer::from_config(&config).unwrap();
        assert_eq!(server.bind_addr().port(), 8000);

        let response = server
            .router()
            .oneshot(Request::get("/questionnaire/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_cors_restricts_to_configured_origins() {
        let mut env = base_env();
        env.insert("CORS_ORIGINS", "https://tool.example.org".to_string());
        let config = load(&env).unwrap();
        let router = ProxyServer::from_config(&config).unwrap().router();

        let allowed = router
            .clone()
            .oneshot(
                Request::get("/questionnaire/")
                    .header("origin", "https://tool.example.org")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            allowed.headers()["access-control-allow-origin"],
            "https://tool.example.org"
        );

        let denied = router
            .oneshot(
                Request::get("/questionnaire/")
                    .header("origin", "https://evil.example.org")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(denied.headers().get("access-control-allow-origin").is_none());
    }

    #[tokio::test]
    async fn test_shutdown_stops_server() {
        let mut env = base_env();
        env.insert("BIND_ADDR", "127.0.0.1:0".to_string());
        let config = load(&env).unwrap();
        let server = Arc::new(ProxyServer::from_config(&config).unwrap());

        let running = Arc::clone(&server);
        let handle = tokio::spawn(async move { running.start().await });
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        server.shutdown();

        let result = tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }
}
