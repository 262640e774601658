//! FAIRsharing record validation and preparation.
//!
//! Preparation never touches the caller's value: it returns a resolved and
//! pruned copy.

use serde_json::{Map, Value};
use tracing::warn;

use crate::common::{ProxyError, ProxyResult};
use crate::router::{IriKind, IriLookup};

const RECORD_KEY: &str = "fairsharing_record";

/// Parse and check a caller-supplied submission body
pub fn parse_submission(body: &[u8]) -> ProxyResult<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ProxyError::validation("Empty record body received."));
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ProxyError::validation(format!("Invalid JSON record: {}", e)))?;

    let Some(top) = value.as_object() else {
        return Err(ProxyError::validation("Record must be a JSON object."));
    };

    let has_content = match top.get(RECORD_KEY) {
        Some(Value::Object(inner)) => !inner.is_empty(),
        Some(_) => false,
        None => {
            return Err(ProxyError::validation(format!(
                "Record must contain a '{}' object.",
                RECORD_KEY
            )))
        }
    };

    if !has_content {
        return Err(ProxyError::validation(format!(
            "'{}' must be a non-empty object.",
            RECORD_KEY
        )));
    }

    Ok(value)
}

/// Resolve subject/domain IRIs (when a lookup is available) and prune empties
pub async fn prepare(record: &Value, lookup: Option<&dyn IriLookup>) -> Value {
    let resolved = match lookup {
        Some(lookup) => resolve_iris(record, lookup).await,
        None => record.clone(),
    };
    prune_empty(&resolved)
}

/// Replace `subject_ids` / `domain_ids` IRIs with registry ids.
///
/// IRIs that do not resolve are dropped; non-string entries are kept as-is.
pub async fn resolve_iris(record: &Value, lookup: &dyn IriLookup) -> Value {
    let mut out = record.clone();
    let Some(inner) = out.get_mut(RECORD_KEY).and_then(Value::as_object_mut) else {
        return out;
    };

    for (field, kind) in [("subject_ids", IriKind::Subject), ("domain_ids", IriKind::Domain)] {
        let Some(Value::Array(entries)) = inner.get(field).cloned() else {
            continue;
        };

        let mut resolved = Vec::with_capacity(entries.len());
        for entry in entries {
            match entry {
                Value::String(iri) => match lookup.lookup(kind, &iri).await {
                    Some(id) => resolved.push(id),
                    None => warn!("Removed {} IRI without internal id: {}", field, iri),
                },
                other => resolved.push(other),
            }
        }
        inner.insert(field.to_string(), Value::Array(resolved));
    }

    out
}

/// Recursively drop `null`, `""`, `[]` and `{}`.
///
/// A value is also dropped when pruning turns it into `{}`. A list that
/// only becomes empty through pruning is kept as `[]`.
pub fn prune_empty(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let pruned: Map<String, Value> = map
                .iter()
                .filter(|(_, v)| !is_empty(v))
                .map(|(k, v)| (k.clone(), prune_empty(v)))
                .filter(|(_, v)| !is_empty_object(v))
                .collect();
            Value::Object(pruned)
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .filter(|v| !is_empty(v))
                .map(prune_empty)
                .filter(|v| !is_empty_object(v))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

fn is_empty_object(value: &Value) -> bool {
    matches!(value, Value::Object(o) if o.is_empty())
}
