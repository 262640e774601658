//! FAIRsharing GraphQL lookups for subject and domain IRIs.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::router::{IriKind, IriLookup};

pub struct GraphqlResolver {
    http: reqwest::Client,
    endpoint: String,
    key: Zeroizing<String>,
}

impl GraphqlResolver {
    pub fn new(http: reqwest::Client, endpoint: String, key: String) -> Self {
        Self {
            http,
            endpoint,
            key: Zeroizing::new(key),
        }
    }
}

fn query_field(kind: IriKind) -> &'static str {
    match kind {
        IriKind::Subject => "searchSubjects",
        IriKind::Domain => "searchDomains",
    }
}

fn build_query(kind: IriKind, iri: &str) -> Value {
    // A JSON string literal is also a valid GraphQL string literal
    let quoted = Value::String(iri.to_string()).to_string();
    json!({
        "query": format!("query {{ {}(q: {}) {{ id iri }} }}", query_field(kind), quoted)
    })
}

fn first_id(response: &Value, kind: IriKind) -> Option<Value> {
    response
        .get("data")?
        .get(query_field(kind))?
        .as_array()?
        .first()?
        .get("id")
        .filter(|id| !id.is_null())
        .cloned()
}

#[async_trait]
impl IriLookup for GraphqlResolver {
    async fn lookup(&self, kind: IriKind, iri: &str) -> Option<Value> {
        let response = match self
            .http
            .post(&self.endpoint)
            .header("x-graphql-key", self.key.as_str())
            .json(&build_query(kind, iri))
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!("GraphQL query failed for {}: {}", iri, e);
                return None;
            }
        };

        if !response.status().is_success() {
            warn!("GraphQL query for {} returned HTTP {}", iri, response.status());
            return None;
        }

        let body: Value = match response.json().await {
            Ok(v) => v,
            Err(e) => {
                warn!("GraphQL response for {} was not JSON: {}", iri, e);
                return None;
            }
        };

        let id = first_id(&body, kind);
        debug!("Resolved {} -> {:?}", iri, id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::spawn_fake;
    use axum::http::HeaderMap;
    use axum::routing::post;
    use axum::{Json, Router};
    use std::time::Duration;

    #[test]
    fn test_query_escapes_iri() {
        let query = build_query(IriKind::Domain, "http://example.org/\"x\"");
        let text = query["query"].as_str().unwrap();
        assert!(text.starts_with("query { searchDomains(q: \"http://example.org/\\\"x\\\"\")"));
    }

    #[test]
    fn test_first_id_extraction() {
        let body = json!({"data": {"searchSubjects": [{"id": 11, "iri": "a"}, {"id": 12}]}});
        assert_eq!(first_id(&body, IriKind::Subject), Some(json!(11)));
        assert_eq!(first_id(&body, IriKind::Domain), None);
        assert_eq!(
            first_id(&json!({"data": {"searchSubjects": []}}), IriKind::Subject),
            None
        );
    }

    #[tokio::test]
    async fn test_lookup_against_fake_endpoint() {
        let app = Router::new().route(
            "/graphql",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                assert_eq!(headers["x-graphql-key"], "key-1");
                let query = body["query"].as_str().unwrap_or_default().to_string();
                if query.contains("known") {
                    Json(json!({"data": {"searchSubjects": [{"id": 99, "iri": "known"}]}}))
                } else {
                    Json(json!({"data": {"searchSubjects": []}}))
                }
            }),
        );
        let base = spawn_fake(app).await;
        let http = crate::common::create_http_client(Duration::from_secs(2)).unwrap();
        let resolver = GraphqlResolver::new(http, format!("{}/graphql", base), "key-1".to_string());

        assert_eq!(
            resolver.lookup(IriKind::Subject, "http://edamontology.org/known").await,
            Some(json!(99))
        );
        assert_eq!(resolver.lookup(IriKind::Subject, "http://other").await, None);
    }
}
