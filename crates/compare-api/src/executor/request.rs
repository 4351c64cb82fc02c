//! Outbound request construction and retry.

use super::capture::ResponseCapture;
use crate::canonical::{Headers, NormalizedRequest};
use crate::config::ExecutionConfig;
use crate::error::RequestError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Url};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::debug;

/// Join a base URL and a path with exactly one slash at the seam.
pub fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Fixed-count, fixed-delay retry of transport failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RetryPolicy {
    /// Additional attempts after the first
    pub retries: u32,
    pub backoff: Duration,
}

impl From<&ExecutionConfig> for RetryPolicy {
    fn from(config: &ExecutionConfig) -> Self {
        Self {
            retries: config.retries,
            backoff: config.backoff(),
        }
    }
}

fn build_url(base_url: &str, request: &NormalizedRequest) -> Result<Url, RequestError> {
    let raw = join_url(base_url, &request.path);
    let mut url = Url::parse(&raw).map_err(|_| RequestError::InvalidUrl(raw.clone()))?;
    if !request.query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in &request.query {
            // Repeated parameters, never comma-joined
            for v in value.values() {
                pairs.append_pair(key, v);
            }
        }
    }
    Ok(url)
}

fn build_headers(headers: &Headers) -> Result<HeaderMap, RequestError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let invalid = || RequestError::InvalidHeader { name: name.clone() };
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
        let header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

/// Issue one request and capture the response.
pub async fn send_once(
    client: &reqwest::Client,
    base_url: &str,
    request: &NormalizedRequest,
    headers: &Headers,
) -> Result<ResponseCapture, RequestError> {
    let method = Method::from_bytes(request.method.as_bytes())
        .map_err(|_| RequestError::InvalidMethod(request.method.clone()))?;
    let url = build_url(base_url, request)?;

    let mut builder = client
        .request(method, url)
        .headers(build_headers(headers)?);
    builder = match &request.body {
        None | Some(Value::Null) => builder,
        Some(Value::String(text)) => builder.body(text.clone()),
        Some(structured @ (Value::Object(_) | Value::Array(_))) => builder.json(structured),
        Some(other) => builder.body(other.to_string()),
    };

    let started = Instant::now();
    let response = builder.send().await?;
    ResponseCapture::read(response, started).await
}

/// Issue a request, retrying transport failures under `policy`.
///
/// HTTP error statuses are responses, not failures, and are never retried.
pub async fn send(
    client: &reqwest::Client,
    base_url: &str,
    request: &NormalizedRequest,
    headers: &Headers,
    policy: RetryPolicy,
) -> Result<ResponseCapture, RequestError> {
    let mut attempt = 0;
    loop {
        match send_once(client, base_url, request, headers).await {
            Err(RequestError::Transport(e)) if attempt < policy.retries => {
                attempt += 1;
                debug!(
                    "{} {}{} failed ({}), retry {}/{}",
                    request.method, base_url, request.path, e, attempt, policy.retries
                );
                tokio::time::sleep(policy.backoff).await;
            }
            result => return result,
        }
    }
}
