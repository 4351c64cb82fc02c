//! Ignore lists applied on the request and response sides.

use serde::{Deserialize, Serialize};

/// Request-side ignores, applied during canonicalization.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RequestIgnores {
    /// Header names dropped before signature computation (case-insensitive)
    #[serde(default = "default_request_headers")]
    pub headers: Vec<String>,
    /// Query parameter names dropped before signature computation (exact match)
    #[serde(default = "default_query_params")]
    pub query_params: Vec<String>,
    /// Body paths pruned before the body participates in a signature,
    /// e.g. `root['meta']['nonce']`
    #[serde(default)]
    pub body_json_paths: Vec<String>,
}

fn default_request_headers() -> Vec<String> {
    [
        "authorization",
        "user-agent",
        "accept-encoding",
        "content-length",
        "host",
        "connection",
        "x-request-id",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_query_params() -> Vec<String> {
    ["timestamp", "nonce", "_"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for RequestIgnores {
    fn default() -> Self {
        Self {
            headers: default_request_headers(),
            query_params: default_query_params(),
            body_json_paths: Vec::new(),
        }
    }
}

/// Response-side ignores, applied by the diff engine.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResponseIgnores {
    #[serde(default = "default_response_headers")]
    pub headers: Vec<String>,
    /// JSON body paths whose differences are suppressed,
    /// e.g. `root['meta']['generatedAt']`
    #[serde(default)]
    pub body_json_paths: Vec<String>,
}

fn default_response_headers() -> Vec<String> {
    ["date", "server", "x-request-id", "cf-ray", "set-cookie"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for ResponseIgnores {
    fn default() -> Self {
        Self {
            headers: default_response_headers(),
            body_json_paths: Vec::new(),
        }
    }
}
