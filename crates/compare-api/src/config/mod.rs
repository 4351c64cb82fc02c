//! Configuration types for compare-api.
//!
//! Every section and field carries a built-in default, so a configuration
//! file only needs to name what it overrides. Lists replace their defaults
//! wholesale.

mod dedup;
mod execution;
mod ignores;
mod log_input;
mod protocol;
mod targets;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub use dedup::{DedupConfig, DedupStrategy};
pub use execution::ExecutionConfig;
pub use ignores::{RequestIgnores, ResponseIgnores};
pub use log_input::{FieldMapping, LogInputConfig};
pub use protocol::Protocol;
pub use targets::{Target, TargetInfo, TargetsConfig, TargetsInfo};

use crate::logs::LogFormat;

/// Files probed when no configuration path is given.
const DEFAULT_CONFIG_CANDIDATES: &[&str] = &["config.yml", "config.yaml"];

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub targets: TargetsConfig,
    #[serde(default)]
    pub request_ignores: RequestIgnores,
    #[serde(default)]
    pub response_ignores: ResponseIgnores,
    #[serde(default)]
    pub deduplication: DedupConfig,
    #[serde(default)]
    pub log_input: LogInputConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
}

impl Config {
    /// Load a YAML (or JSON) configuration file and validate it.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&contents)
    }

    /// Parse configuration text and validate it. An empty document yields
    /// the defaults.
    pub fn from_yaml(contents: &str) -> Result<Self, anyhow::Error> {
        let config: Config = if contents.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(contents)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load the given file, or the first default candidate that exists, or
    /// fall back to built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, anyhow::Error> {
        let resolved = path.map(Path::to_path_buf).or_else(|| {
            DEFAULT_CONFIG_CANDIDATES
                .iter()
                .map(PathBuf::from)
                .find(|p| p.exists())
        });

        match resolved {
            Some(p) => {
                info!("Loading configuration from {}", p.display());
                Self::from_file(&p)
                    .map_err(|e| anyhow::anyhow!("Invalid configuration {}: {e}", p.display()))
            }
            None => {
                debug!("No configuration file found, using defaults");
                Ok(Config::default())
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        LogFormat::parse(&self.log_input.format)?;

        self.targets
            .left
            .validate()
            .map_err(|e| anyhow::anyhow!(e))?;
        self.targets
            .right
            .validate()
            .map_err(|e| anyhow::anyhow!(e))?;

        if self.execution.concurrency == 0 {
            anyhow::bail!("execution.concurrency must be at least 1");
        }

        if !self.execution.backoff_seconds.is_finite() || self.execution.backoff_seconds < 0.0 {
            anyhow::bail!(
                "execution.backoff_seconds must be a non-negative number, got {}",
                self.execution.backoff_seconds
            );
        }

        Ok(())
    }
}
