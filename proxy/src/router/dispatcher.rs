//! Submission Dispatcher
//!
//! `submit`: AcquireToken → Submit → Done, with at most one re-acquire after
//! the registry rejects the token.
//!
//! `push`: PublishToGit → RegisterToFDP → Done, strictly in that order. Both
//! stages always run once the record parses, and both results are returned.

use std::sync::Arc;

use ostrails_protocol::{PushResponse, SubmissionResult, TargetName};
use serde_json::Value;
use tracing::{info, warn};

use super::{IriLookup, Publisher, RegistryApi, Registrar};
use crate::auth::SessionTokenCache;
use crate::common::{create_http_client, ProxyError, ProxyResult};
use crate::config::{Config, ConfigError};
use crate::fdp::FdpRegistrar;
use crate::github::GitHubPublisher;
use crate::rdf::RdfRecord;
use crate::registry::{record, GraphqlResolver, RegistryClient};

/// Retry state for the token-refresh sub-machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    FirstAttempt,
    RetriedOnce,
}

pub struct Dispatcher {
    registry: Arc<dyn RegistryApi>,
    tokens: Arc<SessionTokenCache>,
    publisher: Arc<dyn Publisher>,
    registrar: Arc<dyn Registrar>,
    iri_lookup: Option<Arc<dyn IriLookup>>,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<dyn RegistryApi>,
        tokens: Arc<SessionTokenCache>,
        publisher: Arc<dyn Publisher>,
        registrar: Arc<dyn Registrar>,
    ) -> Self {
        Self {
            registry,
            tokens,
            publisher,
            registrar,
            iri_lookup: None,
        }
    }

    pub fn with_iri_lookup(mut self, lookup: Arc<dyn IriLookup>) -> Self {
        self.iri_lookup = Some(lookup);
        self
    }

    /// Wire the real downstream clients from configuration
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let http = create_http_client(config.request_timeout)?;
        let credentials = config.credentials.clone();

        let registry = Arc::new(RegistryClient::new(http.clone(), credentials.clone()));
        let tokens = Arc::new(SessionTokenCache::new(config.token_ttl));
        let publisher = Arc::new(GitHubPublisher::new(
            http.clone(),
            config.github.clone(),
            credentials.github_token.clone(),
        ));
        let registrar = Arc::new(FdpRegistrar::new(
            http.clone(),
            config.fdp_url.clone(),
            credentials.fdp_token.clone(),
        ));

        let dispatcher = Self::new(registry, tokens, publisher, registrar);
        Ok(match credentials.graphql_key.clone() {
            Some(key) => dispatcher.with_iri_lookup(Arc::new(GraphqlResolver::new(
                http,
                config.graphql_url.clone(),
                key,
            ))),
            None => {
                warn!("FAIRSHARING_GRAPHQL_KEY not set; subject/domain IRIs will not be resolved");
                dispatcher
            }
        })
    }

    /// Submit a FAIRsharing JSON record.
    ///
    /// `Err` only for payloads rejected before any downstream call; every
    /// downstream outcome is a `SubmissionResult`.
    pub async fn submit(&self, body: &[u8]) -> ProxyResult<SubmissionResult> {
        let parsed = record::parse_submission(body)?;
        let prepared = record::prepare(&parsed, self.iri_lookup.as_deref()).await;

        let result = match self.submit_prepared(&prepared).await {
            Ok((status, body)) => SubmissionResult::succeeded(TargetName::Fairsharing, status, body),
            Err(e) => e.into_result(TargetName::Fairsharing),
        };
        info!(
            "FAIRsharing submission finished: success={} status={:?}",
            result.success, result.status
        );
        Ok(result)
    }

    async fn submit_prepared(&self, prepared: &Value) -> ProxyResult<(u16, Value)> {
        let mut attempt = Attempt::FirstAttempt;
        loop {
            let token = self.tokens.get_token(self.registry.as_ref()).await?;

            match self.registry.submit_record(token.value(), prepared).await {
                Ok(resp) => return Ok((resp.status, resp.body)),
                Err(ProxyError::TokenExpired { status }) => match attempt {
                    Attempt::FirstAttempt => {
                        warn!("Registry rejected session token (HTTP {}), signing in again", status);
                        self.tokens.invalidate(&token).await;
                        attempt = Attempt::RetriedOnce;
                    }
                    Attempt::RetriedOnce => {
                        return Err(ProxyError::Submission {
                            status: Some(status),
                            message: format!(
                                "registry rejected a freshly acquired token (HTTP {})",
                                status
                            ),
                        });
                    }
                },
                Err(e) => return Err(e),
            }
        }
    }

    /// Publish a Turtle record to GitHub, then register it with the FDP.
    ///
    /// `Err` only when the record cannot be produced at all.
    pub async fn push(&self, body: &[u8], path: Option<&str>) -> ProxyResult<PushResponse> {
        let text = std::str::from_utf8(body)
            .map_err(|_| ProxyError::validation("RDF body is not valid UTF-8."))?
            .to_string();
        let mut rdf = RdfRecord::parse(text)?;
        if let Some(path) = path {
            rdf = rdf.with_path(path)?;
        }
        info!("Pushing record {} to {}", rdf.record_id(), rdf.path());

        let github = match self.publisher.publish(&rdf).await {
            Ok(published) => SubmissionResult::succeeded(
                TargetName::Github,
                published.status,
                serde_json::to_value(&published.commit).unwrap_or(Value::Null),
            ),
            Err(e) => {
                warn!("GitHub publish failed, continuing with FDP registration: {}", e);
                e.into_result(TargetName::Github)
            }
        };

        let fdp = match self.registrar.register(&rdf).await {
            Ok(resp) => SubmissionResult::succeeded(TargetName::Fdp, resp.status, resp.body),
            Err(e) => e.into_result(TargetName::Fdp),
        };

        let response = PushResponse::from_results(vec![github, fdp]);
        info!("Push of {} finished: {:?}", rdf.record_id(), response.status);
        Ok(response)
    }
}
