//! Request signatures for deduplication.

use crate::canonical::NormalizedRequest;
use crate::config::DedupConfig;
use crate::diff::{prune, JsonPath};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Deterministic equivalence key: `METHOD|path[|query][|body]`.
///
/// Query and body render as JSON with sorted keys, so parameter order in
/// the source never changes the signature.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Signature(String);

impl Signature {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the signature of an already-normalized request.
///
/// `body_ignores` prune subtrees of the body before it is rendered.
pub fn compute_signature(
    request: &NormalizedRequest,
    dedup: &DedupConfig,
    body_ignores: &[JsonPath],
) -> Signature {
    let mut parts = vec![request.method.clone(), request.path.clone()];

    if dedup.strategy.includes_query() {
        let query: Map<String, Value> = request
            .query
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();
        parts.push(Value::Object(query).to_string());
    }

    if dedup.includes_body(&request.method) {
        if let Some(body) = request.body.as_ref().filter(|b| !b.is_null()) {
            parts.push(prune(body, body_ignores).to_string());
        }
    }

    Signature(parts.join("|"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::{Headers, Query, QueryValue};
    use crate::config::DedupStrategy;
    use serde_json::json;

    fn request(method: &str, query: &[(&str, &str)], body: Option<Value>) -> NormalizedRequest {
        NormalizedRequest {
            method: method.to_string(),
            path: "/items".to_string(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), QueryValue::from(*v)))
                .collect::<Query>(),
            headers: Headers::new(),
            body,
        }
    }

    fn dedup(strategy: DedupStrategy) -> DedupConfig {
        DedupConfig {
            strategy,
            ..DedupConfig::default()
        }
    }

    #[test]
    fn test_signature_format() {
        let sig = compute_signature(
            &request("GET", &[("b", "2"), ("a", "1")], None),
            &DedupConfig::default(),
            &[],
        );
        assert_eq!(sig.as_str(), r#"GET|/items|{"a":"1","b":"2"}"#);
    }

    #[test]
    fn test_query_order_independent() {
        let config = DedupConfig::default();
        let a = compute_signature(&request("GET", &[("a", "1"), ("b", "2")], None), &config, &[]);
        let b = compute_signature(&request("GET", &[("b", "2"), ("a", "1")], None), &config, &[]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_method_path_only_ignores_query() {
        let config = dedup(DedupStrategy::MethodPathOnly);
        let a = compute_signature(&request("GET", &[("page", "1")], None), &config, &[]);
        let b = compute_signature(&request("GET", &[("page", "2")], None), &config, &[]);
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "GET|/items");
    }

    #[test]
    fn test_body_only_for_configured_methods() {
        let config = DedupConfig::default();
        let post_a = compute_signature(&request("POST", &[], Some(json!({"x": 1}))), &config, &[]);
        let post_b = compute_signature(&request("POST", &[], Some(json!({"x": 2}))), &config, &[]);
        assert_ne!(post_a, post_b);

        let get_a = compute_signature(&request("GET", &[], Some(json!({"x": 1}))), &config, &[]);
        let get_b = compute_signature(&request("GET", &[], Some(json!({"x": 2}))), &config, &[]);
        assert_eq!(get_a, get_b);

        let null_body = compute_signature(&request("POST", &[], Some(Value::Null)), &config, &[]);
        assert_eq!(null_body.as_str(), "POST|/items|{}");
    }

    #[test]
    fn test_body_key_order_and_ignores() {
        let config = DedupConfig::default();
        let a = request("PUT", &[], Some(json!({"a": 1, "b": {"nonce": "x", "c": 2}})));
        let b = request("PUT", &[], Some(json!({"b": {"c": 2, "nonce": "y"}, "a": 1})));
        assert_ne!(
            compute_signature(&a, &config, &[]),
            compute_signature(&b, &config, &[])
        );

        let ignores = vec![JsonPath::parse("b.nonce").unwrap()];
        assert_eq!(
            compute_signature(&a, &config, &ignores),
            compute_signature(&b, &config, &ignores)
        );
    }

    #[test]
    fn test_multi_valued_query_is_ordered_list() {
        let mut query = Query::new();
        query.insert(
            "tag".to_string(),
            QueryValue::Many(vec!["b".to_string(), "a".to_string()]),
        );
        let req = NormalizedRequest {
            query,
            ..request("GET", &[], None)
        };
        let sig = compute_signature(&req, &DedupConfig::default(), &[]);
        assert_eq!(sig.as_str(), r#"GET|/items|{"tag":["b","a"]}"#);
    }
}
