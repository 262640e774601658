//! OSTrails credential-bridging proxy
//!
//! Accepts assessment component records from the authoring front-end and
//! forwards them to FAIRsharing (`submit`) or to GitHub and a FAIR Data Point
//! (`push`) using credentials that never leave this process.

pub mod auth;
pub mod common;
pub mod config;
pub mod fdp;
pub mod github;
pub mod proxy;
pub mod rdf;
pub mod registry;
pub mod router;

use tracing::info;

pub use common::{ProxyError, ProxyResult};
pub use config::{Config, ConfigError};
pub use proxy::ProxyServer;

/// Wire the downstream clients from `config` and serve until shutdown
pub async fn run(config: Config) -> Result<(), ProxyError> {
    let server = ProxyServer::from_config(&config)?;
    info!(
        "Publishing to {}/{}@{}; FDP {}",
        config.github.owner,
        config.github.repo,
        config.github.branch,
        config.fdp_url.as_deref().unwrap_or("not configured")
    );

    server.start().await.map_err(|e| {
        ProxyError::Config(ConfigError::Bind {
            addr: server.bind_addr(),
            reason: e.to_string(),
        })
    })
}
