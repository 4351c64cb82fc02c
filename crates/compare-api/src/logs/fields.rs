//! Field extraction from loosely-typed log records.

use super::reader::LogRecord;
use crate::canonical::{self, Headers, Query};
use crate::config::FieldMapping;
use serde_json::Value;
use tracing::debug;

/// Request fields pulled out of one log record, before ignore lists apply.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedRequest {
    pub method: String,
    pub path: String,
    pub query: Query,
    pub headers: Headers,
    pub body: Option<Value>,
}

/// Resolve a dotted path (`request.headers`) by descending through nested
/// objects. Yields `None` as soon as a non-object is met before the path is
/// exhausted.
pub fn resolve<'a>(record: &'a LogRecord, dotted: &str) -> Option<&'a Value> {
    let mut parts = dotted.split('.');
    let mut current = record.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

/// The first candidate resolving to a non-null, non-empty-object value.
pub fn first_present<'a>(record: &'a LogRecord, candidates: &[String]) -> Option<&'a Value> {
    candidates
        .iter()
        .filter_map(|path| resolve(record, path))
        .find(|value| match value {
            Value::Null => false,
            Value::Object(map) => !map.is_empty(),
            _ => true,
        })
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Extract request fields from a record.
///
/// Returns `None` when no request target can be formed (neither a path nor
/// a parsable URL to derive one from).
pub fn extract(record: &LogRecord, mapping: &FieldMapping) -> Option<ExtractedRequest> {
    let method = match first_present(record, &mapping.method) {
        Some(Value::String(s)) if !s.is_empty() => s.to_uppercase(),
        Some(Value::String(_)) | None => "GET".to_string(),
        Some(other) => other.to_string().to_uppercase(),
    };

    let explicit_query = first_present(record, &mapping.query)
        .map(canonical::query_from_value)
        .unwrap_or_default();
    let headers = first_present(record, &mapping.headers)
        .map(canonical::headers_from_value)
        .unwrap_or_default();
    let body = first_present(record, &mapping.body).cloned();

    let explicit_path = non_empty_str(first_present(record, &mapping.path));
    let url = non_empty_str(first_present(record, &mapping.url));

    let (path, query) = match (explicit_path, url) {
        (Some(path), _) => (path.to_string(), explicit_query),
        (None, Some(url)) => {
            let Some((path, mut query)) = canonical::split_url(url) else {
                debug!("Dropping record with unparsable url: {}", url);
                return None;
            };
            // Explicit parameters win on key collision.
            query.extend(explicit_query);
            (path, query)
        }
        (None, None) => return None,
    };

    Some(ExtractedRequest {
        method,
        path,
        query,
        headers,
        body,
    })
}
