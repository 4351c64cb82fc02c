//! Comparison target configuration.

use super::protocol::Protocol;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One of the two HTTP endpoints under comparison.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Target {
    pub name: String,
    pub base_url: String,
    /// Headers overlaid on every outbound request to this target
    #[serde(default)]
    pub default_headers: BTreeMap<String, String>,
}

impl Target {
    fn new(name: &str, base_url: &str) -> Self {
        Self {
            name: name.to_string(),
            base_url: base_url.to_string(),
            default_headers: BTreeMap::new(),
        }
    }

    /// Validate that the target configuration is usable
    pub fn validate(&self) -> Result<(), String> {
        Protocol::from_url(&self.base_url)
            .map(|_| ())
            .map_err(|e| format!("Target '{}': {e}", self.name))
    }
}

/// The left/right target pair.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TargetsConfig {
    #[serde(default = "default_left")]
    pub left: Target,
    #[serde(default = "default_right")]
    pub right: Target,
}

fn default_left() -> Target {
    Target::new("left", "http://localhost:8080")
}

fn default_right() -> Target {
    Target::new("right", "http://localhost:8081")
}

impl Default for TargetsConfig {
    fn default() -> Self {
        Self {
            left: default_left(),
            right: default_right(),
        }
    }
}

/// Name and base URL of a target, echoed into the results payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TargetInfo {
    pub name: String,
    pub base_url: String,
}

/// Both target descriptions, as echoed into the results payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TargetsInfo {
    pub left: TargetInfo,
    pub right: TargetInfo,
}

impl From<&TargetsConfig> for TargetsInfo {
    fn from(targets: &TargetsConfig) -> Self {
        let info = |t: &Target| TargetInfo {
            name: t.name.clone(),
            base_url: t.base_url.clone(),
        };
        Self {
            left: info(&targets.left),
            right: info(&targets.right),
        }
    }
}
