//! Submission result envelopes
//!
//! One `SubmissionResult` per downstream target touched by a request.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Downstream system a result belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetName {
    Fairsharing,
    Github,
    Fdp,
}

impl TargetName {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetName::Fairsharing => "fairsharing",
            TargetName::Github => "github",
            TargetName::Fdp => "fdp",
        }
    }
}

impl fmt::Display for TargetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one downstream call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub target: TargetName,
    pub success: bool,

    /// Downstream HTTP status, absent when the call never got a response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,

    /// `"<Kind>: <detail>"` on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SubmissionResult {
    pub fn succeeded(target: TargetName, status: u16, body: Value) -> Self {
        Self {
            target,
            success: true,
            status: Some(status),
            body: Some(body),
            error: None,
        }
    }

    pub fn failed(target: TargetName, status: Option<u16>, error: impl Into<String>) -> Self {
        Self {
            target,
            success: false,
            status,
            body: None,
            error: Some(error.into()),
        }
    }
}

/// Aggregate status of a push request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PushStatus {
    Success,
    Partial,
    Error,
}

/// Response body of `POST /questionnaire/push`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushResponse {
    pub status: PushStatus,
    pub results: Vec<SubmissionResult>,
}

impl PushResponse {
    pub fn from_results(results: Vec<SubmissionResult>) -> Self {
        let ok = results.iter().filter(|r| r.success).count();
        let status = if ok == results.len() {
            PushStatus::Success
        } else if ok == 0 {
            PushStatus::Error
        } else {
            PushStatus::Partial
        };
        Self { status, results }
    }

    pub fn result_for(&self, target: TargetName) -> Option<&SubmissionResult> {
        self.results.iter().find(|r| r.target == target)
    }
}

/// Request-level error envelope (validation failures, bad routes)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub kind: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// Response body of `GET /questionnaire/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_failed_result_omits_body() {
        let result = SubmissionResult::failed(TargetName::Fdp, None, "RegistrationError: timed out");
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            json!({"target": "fdp", "success": false, "error": "RegistrationError: timed out"})
        );
    }

    #[test]
    fn test_succeeded_result_shape() {
        let result = SubmissionResult::succeeded(TargetName::Fairsharing, 201, json!({"id": 7}));
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["target"], "fairsharing");
        assert_eq!(value["status"], 201);
        assert_eq!(value["body"]["id"], 7);
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_push_status_aggregation() {
        let ok = SubmissionResult::succeeded(TargetName::Github, 201, json!({}));
        let bad = SubmissionResult::failed(TargetName::Fdp, Some(500), "RegistrationError: boom");

        let both = PushResponse::from_results(vec![ok.clone(), ok.clone()]);
        assert_eq!(both.status, PushStatus::Success);

        let partial = PushResponse::from_results(vec![ok, bad.clone()]);
        assert_eq!(partial.status, PushStatus::Partial);
        assert!(partial.result_for(TargetName::Fdp).is_some());

        let none = PushResponse::from_results(vec![bad.clone(), bad]);
        assert_eq!(none.status, PushStatus::Error);
    }

    #[test]
    fn test_target_name_wire_form() {
        assert_eq!(serde_json::to_string(&TargetName::Github).unwrap(), "\"github\"");
        let parsed: TargetName = serde_json::from_str("\"fairsharing\"").unwrap();
        assert_eq!(parsed, TargetName::Fairsharing);
        assert_eq!(TargetName::Fdp.to_string(), "fdp");
    }
}
