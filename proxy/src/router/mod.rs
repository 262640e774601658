//! Submission Router
//!
//! Capability traits for the three downstream integrations and the
//! dispatcher that fans a caller request out to them.

pub mod dispatcher;

use async_trait::async_trait;
use serde_json::Value;

use crate::auth::TokenSource;
use crate::common::ProxyResult;
use crate::github::Published;
use crate::rdf::RdfRecord;

pub use dispatcher::Dispatcher;

/// Status and body of a successful downstream call
#[derive(Debug, Clone, PartialEq)]
pub struct DownstreamResponse {
    pub status: u16,
    pub body: Value,
}

/// FAIRsharing registry: sign-in plus authenticated record submission
#[async_trait]
pub trait RegistryApi: TokenSource {
    /// Fails with `ProxyError::TokenExpired` on 401/403
    async fn submit_record(&self, token: &str, record: &Value) -> ProxyResult<DownstreamResponse>;
}

/// Version-controlled record store
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, record: &RdfRecord) -> ProxyResult<Published>;
}

/// FAIR Data Point registration
#[async_trait]
pub trait Registrar: Send + Sync {
    async fn register(&self, record: &RdfRecord) -> ProxyResult<DownstreamResponse>;
}

/// Which vocabulary an IRI belongs to when resolving registry ids
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IriKind {
    Subject,
    Domain,
}

/// Resolves ontology IRIs to registry-internal ids
#[async_trait]
pub trait IriLookup: Send + Sync {
    /// `None` when the IRI is unknown or the lookup failed
    async fn lookup(&self, kind: IriKind, iri: &str) -> Option<Value>;
}
