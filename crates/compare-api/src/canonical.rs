//! Request canonicalization: header and query normalization.
//!
//! All functions here are pure.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

/// Headers meaningful only to a single connection; never forwarded.
pub const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "content-length",
    "host",
];

/// A query parameter value. Repeated parameters keep every value in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    One(String),
    Many(Vec<String>),
}

impl QueryValue {
    /// Append a repeated occurrence of the same key.
    fn push(&mut self, value: String) {
        match self {
            QueryValue::One(first) => {
                *self = QueryValue::Many(vec![std::mem::take(first), value]);
            }
            QueryValue::Many(values) => values.push(value),
        }
    }

    /// Every value, in source order.
    pub fn values(&self) -> &[String] {
        match self {
            QueryValue::One(v) => std::slice::from_ref(v),
            QueryValue::Many(vs) => vs,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            QueryValue::One(v) => Value::String(v.clone()),
            QueryValue::Many(vs) => Value::Array(vs.iter().cloned().map(Value::String).collect()),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::One(value.to_string())
    }
}

/// Query parameters keyed by name. Sorted keys keep serialization stable.
pub type Query = BTreeMap<String, QueryValue>;

/// Header map with lower-cased keys.
pub type Headers = BTreeMap<String, String>;

/// A request after extraction and canonicalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRequest {
    /// Upper-case method
    pub method: String,
    pub path: String,
    #[serde(default)]
    pub query: Query,
    #[serde(default)]
    pub headers: Headers,
    #[serde(default)]
    pub body: Option<Value>,
}

/// Render a scalar as a string: strings verbatim, anything else as JSON.
fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Build a header map from a raw log value.
///
/// Keys are lower-cased, list values comma-joined, nulls dropped.
pub fn headers_from_value(value: &Value) -> Headers {
    let Value::Object(map) = value else {
        return Headers::new();
    };

    map.iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| {
            let rendered = match v {
                Value::Array(items) => items
                    .iter()
                    .map(scalar_to_string)
                    .collect::<Vec<_>>()
                    .join(","),
                other => scalar_to_string(other),
            };
            (k.to_lowercase(), rendered)
        })
        .collect()
}

/// Build query parameters from a raw log value.
///
/// Objects map key by key (arrays become multi-valued, nulls dropped); a
/// string is parsed as a query string.
pub fn query_from_value(value: &Value) -> Query {
    match value {
        Value::Object(map) => map
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| {
                let qv = match v {
                    Value::Array(items) => {
                        QueryValue::Many(items.iter().map(scalar_to_string).collect())
                    }
                    other => QueryValue::One(scalar_to_string(other)),
                };
                (k.clone(), qv)
            })
            .collect(),
        Value::String(s) => parse_query_string(s.trim_start_matches('?')),
        _ => Query::new(),
    }
}

/// Decode one `application/x-www-form-urlencoded` component.
fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    String::from_utf8_lossy(&urlencoding::decode_binary(spaced.as_bytes())).into_owned()
}

/// Parse a query string, keeping blank values and repeated keys.
pub fn parse_query_string(query: &str) -> Query {
    let mut params = Query::new();
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode_component(key);
        let value = decode_component(value);
        match params.get_mut(&key) {
            Some(existing) => existing.push(value),
            None => {
                params.insert(key, QueryValue::One(value));
            }
        }
    }
    params
}

/// Base that relative log URLs are resolved against; only its path and
/// query survive.
const RELATIVE_BASE: &str = "http://relative.invalid/";

/// Split an absolute or relative URL into its path and query parameters.
///
/// Surrounding whitespace and control characters are stripped, the
/// fragment is discarded and an empty path becomes `/`. Returns `None`
/// when the URL cannot be parsed.
pub fn split_url(url: &str) -> Option<(String, Query)> {
    let parsed = Url::parse(RELATIVE_BASE)
        .and_then(|base| base.join(url))
        .ok()?;
    let path = match parsed.path() {
        "" => "/".to_string(),
        path => path.to_string(),
    };
    let query = parsed.query().map(parse_query_string).unwrap_or_default();
    Some((path, query))
}

/// Lower-case header keys and drop ignored ones (case-insensitive).
pub fn normalize_headers(headers: &Headers, ignore: &[String]) -> Headers {
    let ignore: HashSet<String> = ignore.iter().map(|k| k.to_lowercase()).collect();
    headers
        .iter()
        .map(|(k, v)| (k.to_lowercase(), v))
        .filter(|(k, _)| !ignore.contains(k))
        .map(|(k, v)| (k, v.clone()))
        .collect()
}

/// Drop ignored query parameters (exact, case-sensitive key match).
pub fn filter_query(query: &Query, ignore: &[String]) -> Query {
    query
        .iter()
        .filter(|(k, _)| !ignore.iter().any(|i| i == *k))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Headers for an outbound request: captured headers minus hop-by-hop,
/// overlaid with the target's defaults (which may reintroduce any of them).
pub fn outbound_headers(captured: &Headers, defaults: &BTreeMap<String, String>) -> Headers {
    let mut headers: Headers = captured
        .iter()
        .map(|(k, v)| (k.to_lowercase(), v.clone()))
        .filter(|(k, _)| !HOP_BY_HOP.contains(&k.as_str()))
        .collect();
    for (k, v) in defaults {
        headers.insert(k.to_lowercase(), v.clone());
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn headers(pairs: &[(&str, &str)]) -> Headers {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_headers_from_value() {
        let h = headers_from_value(&json!({
            "Content-Type": "application/json",
            "Accept": ["text/html", "application/json"],
            "X-Null": null,
            "X-Count": 3
        }));
        assert_eq!(h.get("content-type").unwrap(), "application/json");
        assert_eq!(h.get("accept").unwrap(), "text/html,application/json");
        assert_eq!(h.get("x-count").unwrap(), "3");
        assert!(!h.contains_key("x-null"));
        assert!(headers_from_value(&json!("nope")).is_empty());
    }

    #[test]
    fn test_query_from_value_preserves_lists() {
        let q = query_from_value(&json!({"tag": ["b", "a"], "page": 2, "skip": null}));
        assert_eq!(
            q.get("tag"),
            Some(&QueryValue::Many(vec!["b".to_string(), "a".to_string()]))
        );
        assert_eq!(q.get("page"), Some(&QueryValue::from("2")));
        assert!(!q.contains_key("skip"));
    }

    #[test]
    fn test_query_from_string_value() {
        let q = query_from_value(&json!("?a=1&b=2"));
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn test_parse_query_string() {
        let q = parse_query_string("name=hello%20world&flag&empty=&plus=a+b&k=1&k=2&k=3");
        assert_eq!(q.get("name"), Some(&QueryValue::from("hello world")));
        assert_eq!(q.get("flag"), Some(&QueryValue::from("")));
        assert_eq!(q.get("empty"), Some(&QueryValue::from("")));
        assert_eq!(q.get("plus"), Some(&QueryValue::from("a b")));
        assert_eq!(q.get("k").unwrap().values(), ["1", "2", "3"]);
    }

    #[test]
    fn test_split_relative_url() {
        let (path, query) = split_url("/items?sort=asc&page=1").unwrap();
        assert_eq!(path, "/items");
        assert_eq!(query.get("sort"), Some(&QueryValue::from("asc")));
        assert_eq!(query.get("page"), Some(&QueryValue::from("1")));
    }

    #[test]
    fn test_split_absolute_url() {
        let (path, query) = split_url("https://api.example.com:8443/v1/users?id=7#frag").unwrap();
        assert_eq!(path, "/v1/users");
        assert_eq!(query.get("id"), Some(&QueryValue::from("7")));

        let (path, query) = split_url("http://example.com").unwrap();
        assert_eq!(path, "/");
        assert!(query.is_empty());

        let (path, _) = split_url("//cdn.example.com/asset.js").unwrap();
        assert_eq!(path, "/asset.js");
    }

    #[test]
    fn test_split_url_strips_surrounding_whitespace() {
        let (path, query) = split_url(" /items?page=1\n").unwrap();
        assert_eq!(path, "/items");
        assert_eq!(query.get("page"), Some(&QueryValue::from("1")));

        let (path, query) = split_url("\thttps://api.example.com/search?q=a+b ").unwrap();
        assert_eq!(path, "/search");
        assert_eq!(query.get("q"), Some(&QueryValue::from("a b")));
    }

    #[test]
    fn test_split_url_rejects_unparsable() {
        assert!(split_url("http://example.com:99999/a").is_none());
        assert!(split_url("http://[::1/a").is_none());
    }

    #[test]
    fn test_split_url_query_containing_scheme() {
        let (path, query) = split_url("/redirect?to=http://other/x").unwrap();
        assert_eq!(path, "/redirect");
        assert_eq!(query.get("to"), Some(&QueryValue::from("http://other/x")));
    }

    #[test]
    fn test_normalize_headers_ignore_case_insensitive() {
        let h = normalize_headers(
            &headers(&[("Authorization", "secret"), ("Accept", "*/*")]),
            &["AUTHORIZATION".to_string()],
        );
        assert_eq!(h, headers(&[("accept", "*/*")]));
    }

    #[test]
    fn test_filter_query_is_case_sensitive() {
        let q = parse_query_string("nonce=1&Nonce=2&page=3");
        let filtered = filter_query(&q, &["nonce".to_string()]);
        assert!(!filtered.contains_key("nonce"));
        assert!(filtered.contains_key("Nonce"));
        assert!(filtered.contains_key("page"));
    }

    #[test]
    fn test_outbound_headers_strip_and_overlay() {
        let captured = headers(&[
            ("host", "old.example.com"),
            ("connection", "keep-alive"),
            ("content-length", "12"),
            ("accept", "application/json"),
        ]);
        let defaults: BTreeMap<String, String> = [
            ("X-Target".to_string(), "left".to_string()),
            ("Host".to_string(), "new.example.com".to_string()),
        ]
        .into_iter()
        .collect();

        let out = outbound_headers(&captured, &defaults);
        assert_eq!(out.get("accept").unwrap(), "application/json");
        assert_eq!(out.get("x-target").unwrap(), "left");
        // Defaults may deliberately reintroduce a hop-by-hop header
        assert_eq!(out.get("host").unwrap(), "new.example.com");
        assert!(!out.contains_key("connection"));
        assert!(!out.contains_key("content-length"));
    }
}
