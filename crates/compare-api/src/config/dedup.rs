//! Deduplication strategy configuration.

use serde::{Deserialize, Serialize};

/// How log requests collapse into testcases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DedupStrategy {
    /// Signature covers method, path and query
    #[default]
    MethodPathQuery,
    /// Signature covers method and path only
    MethodPathOnly,
    /// One parent case per path, one sub-case per distinct signature
    PathGrouped,
}

impl DedupStrategy {
    /// Whether the normalized query participates in the signature.
    pub fn includes_query(&self) -> bool {
        !matches!(self, DedupStrategy::MethodPathOnly)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DedupConfig {
    #[serde(default)]
    pub strategy: DedupStrategy,
    /// Methods whose body participates in the signature
    #[serde(default = "default_include_body_for")]
    pub include_body_for: Vec<String>,
}

fn default_include_body_for() -> Vec<String> {
    ["POST", "PUT", "PATCH"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            strategy: DedupStrategy::default(),
            include_body_for: default_include_body_for(),
        }
    }
}

impl DedupConfig {
    /// Whether a body sent with `method` is part of the signature.
    pub fn includes_body(&self, method: &str) -> bool {
        self.include_body_for
            .iter()
            .any(|m| m.eq_ignore_ascii_case(method))
    }
}
