//! GitHub Contents API Publisher
//!
//! Commits a Turtle record to `{owner}/{repo}` on the configured branch.
//! A preflight read decides between create and update; a stale sha surfaces
//! as a `PublishError` carrying GitHub's 409/422, never as a merge.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::ACCEPT;
use reqwest::{RequestBuilder, StatusCode};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, error, info};
use zeroize::Zeroizing;

use crate::common::http::{error_detail, BodyError};
use crate::common::{read_body, ProxyError, ProxyResult};
use crate::config::GitHubTarget;
use crate::rdf::RdfRecord;
use crate::router::Publisher;

const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const GITHUB_API_VERSION: &str = "2022-11-28";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitAction {
    Create,
    Update,
}

/// Where the record landed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommitRef {
    pub action: CommitAction,
    pub record_id: String,
    pub category: String,
    pub path: String,
    pub commit_sha: Option<String>,
    pub commit_url: Option<String>,
    pub file_url: Option<String>,
    pub message: String,
}

/// A successful publish: GitHub's status plus the commit reference
#[derive(Debug, Clone, PartialEq)]
pub struct Published {
    pub status: u16,
    pub commit: CommitRef,
}

pub struct GitHubPublisher {
    http: reqwest::Client,
    target: GitHubTarget,
    token: Zeroizing<String>,
}

impl GitHubPublisher {
    pub fn new(http: reqwest::Client, target: GitHubTarget, token: String) -> Self {
        Self {
            http,
            target,
            token: Zeroizing::new(token),
        }
    }

    fn contents_url(&self, path: &str) -> String {
        let encoded: Vec<String> = path
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.target.api_url,
            self.target.owner,
            self.target.repo,
            encoded.join("/")
        )
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .bearer_auth(self.token.as_str())
            .header(ACCEPT, GITHUB_ACCEPT)
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
    }

    /// sha of the file currently at `url`, `None` if it does not exist yet
    async fn existing_sha(&self, url: &str) -> ProxyResult<Option<String>> {
        let response = self
            .authorized(self.http.get(url))
            .query(&[("ref", self.target.branch.as_str())])
            .send()
            .await
            .map_err(|e| ProxyError::Publish {
                status: None,
                message: ProxyError::transport_message(&e),
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            StatusCode::OK => {
                let (_, body) = read_body(response).await.map_err(publish_body_error)?;
                Ok(body.get("sha").and_then(Value::as_str).map(String::from))
            }
            _ => {
                let (status, body) = read_body(response).await.map_err(publish_body_error)?;
                error!("GitHub preflight failed with HTTP {}", status);
                Err(ProxyError::Publish {
                    status: Some(status),
                    message: format!("GitHub preflight failed: {}", error_detail(&body)),
                })
            }
        }
    }

    fn commit_body(&self, record: &RdfRecord, sha: Option<&str>) -> Value {
        let mut body = json!({
            "message": format!(
                "Add or update RDF record '{}' in category '{}'.",
                record.record_id(),
                record.category()
            ),
            "content": STANDARD.encode(record.text().as_bytes()),
            "branch": self.target.branch,
        });
        if let Some(sha) = sha {
            body["sha"] = Value::String(sha.to_string());
        }
        body
    }
}

#[async_trait]
impl Publisher for GitHubPublisher {
    async fn publish(&self, record: &RdfRecord) -> ProxyResult<Published> {
        let url = self.contents_url(record.path());
        info!(
            "Publishing {} to {}/{}@{}",
            record.path(),
            self.target.owner,
            self.target.repo,
            self.target.branch
        );

        let sha = self.existing_sha(&url).await?;
        let action = if sha.is_some() {
            CommitAction::Update
        } else {
            CommitAction::Create
        };

        let response = self
            .authorized(self.http.put(&url))
            .json(&self.commit_body(record, sha.as_deref()))
            .send()
            .await
            .map_err(|e| ProxyError::Publish {
                status: None,
                message: ProxyError::transport_message(&e),
            })?;

        let (status, body) = read_body(response).await.map_err(publish_body_error)?;
        debug!("GitHub PUT status: {}", status);

        if !(200..300).contains(&status) {
            error!("GitHub rejected commit for {} with HTTP {}", record.path(), status);
            return Err(ProxyError::Publish {
                status: Some(status),
                message: format!("GitHub commit failed: {}", error_detail(&body)),
            });
        }

        let verb = match action {
            CommitAction::Create => "created",
            CommitAction::Update => "updated",
        };
        let commit = CommitRef {
            action,
            record_id: record.record_id().to_string(),
            category: record.category().to_string(),
            path: record.path().to_string(),
            commit_sha: str_at(&body, &["commit", "sha"]),
            commit_url: str_at(&body, &["commit", "html_url"]),
            file_url: str_at(&body, &["content", "html_url"]),
            message: format!(
                "RDF record '{}' successfully {} in GitHub repository '{}'.",
                record.record_id(),
                verb,
                self.target.repo
            ),
        };

        Ok(Published { status, commit })
    }
}

fn publish_body_error(e: BodyError) -> ProxyError {
    ProxyError::Publish {
        status: Some(e.status),
        message: e.to_string(),
    }
}

fn str_at(value: &Value, path: &[&str]) -> Option<String> {
    let mut current = value;
    for key in path {
        current = current.get(key)?;
    }
    current.as_str().map(String::from)
}
