//! Turtle records for the push path
//!
//! The record's repository location comes from the IRI subject of its
//! `dcterms:identifier` triple: `.../<category>/<record_id>[.ttl]`.

use oxrdf::Subject;
use oxttl::TurtleParser;

use crate::common::{ProxyError, ProxyResult};

pub const DCTERMS_IDENTIFIER: &str = "http://purl.org/dc/terms/identifier";

/// A parsed push record plus its routing metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RdfRecord {
    text: String,
    subject: String,
    record_id: String,
    category: String,
    path: String,
}

impl RdfRecord {
    /// Parse Turtle text and derive the repository path
    pub fn parse(text: String) -> ProxyResult<Self> {
        if text.trim().is_empty() {
            return Err(ProxyError::validation("Empty RDF body received."));
        }

        let mut subject = None;
        for triple in TurtleParser::new().for_slice(text.as_bytes()) {
            let triple =
                triple.map_err(|e| ProxyError::validation(format!("Invalid RDF format: {}", e)))?;
            if subject.is_some() || triple.predicate.as_str() != DCTERMS_IDENTIFIER {
                continue;
            }
            if let Subject::NamedNode(node) = &triple.subject {
                subject = Some(node.as_str().to_string());
            }
        }

        let subject = subject.ok_or_else(|| {
            ProxyError::validation("No valid identifier or subject URI found in RDF.")
        })?;

        let segments = iri_path_segments(&subject);
        let [.., category, filename] = segments.as_slice() else {
            return Err(ProxyError::validation(format!(
                "URI '{}' is malformed or missing path structure.",
                subject
            )));
        };

        let record_id = strip_ttl(filename).to_string();
        let category = category.to_string();
        if record_id.is_empty() {
            return Err(ProxyError::validation(format!(
                "URI '{}' does not name a record.",
                subject
            )));
        }
        let path = format!("{}/{}.ttl", category, record_id);

        Ok(Self {
            text,
            subject,
            record_id,
            category,
            path,
        })
    }

    /// Override the derived repository path
    pub fn with_path(mut self, path: &str) -> ProxyResult<Self> {
        let trimmed = path.trim().trim_matches('/');
        let segments: Vec<&str> = trimmed.split('/').collect();
        if trimmed.is_empty() || segments.iter().any(|s| s.is_empty() || *s == "." || *s == "..") {
            return Err(ProxyError::validation(format!(
                "Invalid target path '{}'.",
                path
            )));
        }
        self.path = segments.join("/");
        Ok(self)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn record_id(&self) -> &str {
        &self.record_id
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Repository-relative file path, e.g. `metrics/FM_F1A.ttl`
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Non-empty path segments of an IRI, ignoring query and fragment
fn iri_path_segments(iri: &str) -> Vec<&str> {
    let path = match iri.split_once("://") {
        Some((_, rest)) => rest.find('/').map(|i| &rest[i..]).unwrap_or(""),
        None => iri.split_once(':').map(|(_, rest)| rest).unwrap_or(iri),
    };
    let end = path.find(['?', '#']).unwrap_or(path.len());
    path[..end].split('/').filter(|s| !s.is_empty()).collect()
}

fn strip_ttl(name: &str) -> &str {
    let split = name.len().saturating_sub(4);
    match name.get(split..) {
        Some(ext) if ext.eq_ignore_ascii_case(".ttl") => &name[..split],
        _ => name,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const METRIC_TTL: &str = r#"
@prefix dcterms: <http://purl.org/dc/terms/> .
@prefix dcat: <http://www.w3.org/ns/dcat#> .

<https://w3id.org/ostrails/metrics/FM_F1A.ttl>
    a dcat:Resource ;
    dcterms:identifier "FM_F1A" ;
    dcterms:title "Identifier uniqueness" .
"#;

    #[test]
    fn test_parse_derives_path() {
        let record = RdfRecord::parse(METRIC_TTL.to_string()).unwrap();
        assert_eq!(record.subject(), "https://w3id.org/ostrails/metrics/FM_F1A.ttl");
        assert_eq!(record.category(), "metrics");
        assert_eq!(record.record_id(), "FM_F1A");
        assert_eq!(record.path(), "metrics/FM_F1A.ttl");
        assert_eq!(record.text(), METRIC_TTL);
    }

    #[test]
    fn test_parse_rejects_invalid_turtle() {
        let err = RdfRecord::parse("<a> <b> .".to_string()).unwrap_err();
        assert_eq!(err.kind(), "ValidationError");
        assert!(err.to_string().starts_with("Invalid RDF format"));
    }

    #[test]
    fn test_parse_rejects_empty_and_missing_identifier() {
        assert!(RdfRecord::parse("  \n".to_string()).is_err());

        let no_id = r#"
@prefix dcterms: <http://purl.org/dc/terms/> .
<https://w3id.org/ostrails/metrics/x> dcterms:title "t" .
"#;
        let err = RdfRecord::parse(no_id.to_string()).unwrap_err();
        assert!(err.to_string().contains("No valid identifier"));

        let blank = r#"
@prefix dcterms: <http://purl.org/dc/terms/> .
[] dcterms:identifier "x" .
"#;
        assert!(RdfRecord::parse(blank.to_string()).is_err());
    }

    #[test]
    fn test_parse_rejects_shallow_uri() {
        let shallow = r#"
@prefix dcterms: <http://purl.org/dc/terms/> .
<https://example.org/only> dcterms:identifier "x" .
"#;
        let err = RdfRecord::parse(shallow.to_string()).unwrap_err();
        assert!(err.to_string().contains("missing path structure"));
    }

    #[test]
    fn test_with_path_override() {
        let record = RdfRecord::parse(METRIC_TTL.to_string()).unwrap();
        let moved = record.clone().with_path("/tests/FM_F1A.ttl").unwrap();
        assert_eq!(moved.path(), "tests/FM_F1A.ttl");

        assert!(record.clone().with_path("").is_err());
        assert!(record.clone().with_path("../etc/passwd").is_err());
        assert!(record.with_path("a//b.ttl").is_err());
    }

    #[test]
    fn test_iri_helpers() {
        assert_eq!(
            iri_path_segments("https://h.org/a/b/c.ttl?x=1#frag"),
            vec!["a", "b", "c.ttl"]
        );
        assert_eq!(iri_path_segments("https://h.org"), Vec::<&str>::new());
        assert_eq!(strip_ttl("FM.TTL"), "FM");
        assert_eq!(strip_ttl("FM"), "FM");
        assert_eq!(strip_ttl("é"), "é");
    }
}
