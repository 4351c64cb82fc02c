//! Execution tuning for the dual-target runner.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExecutionConfig {
    /// Maximum number of testcases in flight
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Per-call timeout
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,
    /// Additional attempts after a failed outbound call
    #[serde(default = "default_retries")]
    pub retries: u32,
    /// Fixed delay between attempts
    #[serde(default = "default_backoff_seconds")]
    pub backoff_seconds: f64,
}

fn default_concurrency() -> usize {
    8
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_verify_tls() -> bool {
    true
}

fn default_retries() -> u32 {
    1
}

fn default_backoff_seconds() -> f64 {
    0.2
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            timeout_seconds: default_timeout_seconds(),
            verify_tls: default_verify_tls(),
            retries: default_retries(),
            backoff_seconds: default_backoff_seconds(),
        }
    }
}

impl ExecutionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Delay between retry attempts. Invalid values collapse to zero.
    pub fn backoff(&self) -> Duration {
        Duration::try_from_secs_f64(self.backoff_seconds).unwrap_or(Duration::ZERO)
    }
}
