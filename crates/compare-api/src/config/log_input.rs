//! Log input format and field-mapping configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogInputConfig {
    /// Format hint: "auto", "json" or "jsonl"
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default)]
    pub mapping: FieldMapping,
}

fn default_format() -> String {
    "auto".to_string()
}

impl Default for LogInputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            mapping: FieldMapping::default(),
        }
    }
}

/// Ordered candidate dotted paths for each logical request field.
///
/// The first candidate that resolves to a non-null, non-empty-object value
/// wins.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FieldMapping {
    #[serde(default = "default_method")]
    pub method: Vec<String>,
    #[serde(default = "default_url")]
    pub url: Vec<String>,
    #[serde(default = "default_path")]
    pub path: Vec<String>,
    #[serde(default = "default_headers")]
    pub headers: Vec<String>,
    #[serde(default = "default_query")]
    pub query: Vec<String>,
    #[serde(default = "default_body")]
    pub body: Vec<String>,
}

fn paths(candidates: &[&str]) -> Vec<String> {
    candidates.iter().map(|s| s.to_string()).collect()
}

fn default_method() -> Vec<String> {
    paths(&["method", "http_method"])
}

fn default_url() -> Vec<String> {
    paths(&["url", "request.url", "uri", "request.endpoint"])
}

fn default_path() -> Vec<String> {
    paths(&["path", "request.path"])
}

fn default_headers() -> Vec<String> {
    paths(&["headers", "request.headers"])
}

fn default_query() -> Vec<String> {
    paths(&["query", "request.query", "request.parameter"])
}

fn default_body() -> Vec<String> {
    paths(&["body", "request.body", "payload"])
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            method: default_method(),
            url: default_url(),
            path: default_path(),
            headers: default_headers(),
            query: default_query(),
            body: default_body(),
        }
    }
}
