//! Shared HTTP client creation.

use crate::config::ExecutionConfig;
use crate::error::RequestError;
use tracing::{info, warn};

/// Create the client shared by every outbound call of a run.
///
/// Idle connections per host are capped at the worker count, since at most
/// that many calls to one target are in flight.
pub fn create_http_client(config: &ExecutionConfig) -> Result<reqwest::Client, RequestError> {
    if !config.verify_tls {
        warn!("TLS certificate verification DISABLED for both targets (development/testing only)");
    }

    let client = reqwest::Client::builder()
        .timeout(config.timeout())
        .danger_accept_invalid_certs(!config.verify_tls)
        .pool_max_idle_per_host(config.concurrency)
        .build()?;

    info!(
        "HTTP client configured: timeout={}s, verify_tls={}, max_idle_per_host={}",
        config.timeout_seconds, config.verify_tls, config.concurrency
    );
    Ok(client)
}
