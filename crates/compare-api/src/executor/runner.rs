//! Dual-target testcase execution.

use super::capture::ResponseCapture;
use super::client::create_http_client;
use super::request::{send, RetryPolicy};
use crate::canonical::{outbound_headers, NormalizedRequest};
use crate::config::{Config, Target, TargetsConfig};
use crate::corpus::{CaseId, TestCase};
use crate::diff::{Comparator, ComparisonResult};
use crate::error::RequestError;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A capture tagged with the name of the target that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetCapture {
    pub target: String,
    #[serde(flatten)]
    pub capture: ResponseCapture,
}

/// Outcome of one testcase.
///
/// When either side failed, `error` is set, `compare` is absent and
/// `equal` is false; the side that succeeded is still reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub id: CaseId,
    pub request: NormalizedRequest,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<TargetCapture>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<TargetCapture>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare: Option<ComparisonResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub equal: bool,
}

impl RunResult {
    /// A result for a case that produced no captures at all.
    pub fn failed(id: CaseId, request: NormalizedRequest, error: String) -> Self {
        Self {
            id,
            request,
            left: None,
            right: None,
            compare: None,
            error: Some(error),
            equal: false,
        }
    }
}

/// Replays testcases against both targets and compares the responses.
pub struct Executor {
    client: reqwest::Client,
    targets: TargetsConfig,
    comparator: Comparator,
    policy: RetryPolicy,
    concurrency: usize,
}

impl Executor {
    pub fn new(config: &Config) -> Result<Self, RequestError> {
        Ok(Self {
            client: create_http_client(&config.execution)?,
            targets: config.targets.clone(),
            comparator: Comparator::new(&config.response_ignores),
            policy: RetryPolicy::from(&config.execution),
            concurrency: config.execution.concurrency.max(1),
        })
    }

    async fn call(
        &self,
        target: &Target,
        request: &NormalizedRequest,
    ) -> Result<TargetCapture, RequestError> {
        let headers = outbound_headers(&request.headers, &target.default_headers);
        let capture = send(&self.client, &target.base_url, request, &headers, self.policy).await?;
        Ok(TargetCapture {
            target: target.name.clone(),
            capture,
        })
    }

    /// Run one (leaf) testcase against both targets.
    pub async fn run_case(&self, case: &TestCase) -> RunResult {
        let request = case.request();

        let (left, right) = tokio::join!(
            self.call(&self.targets.left, &request),
            self.call(&self.targets.right, &request)
        );

        let (left, right) = match (left, right) {
            (Ok(left), Ok(right)) => (left, right),
            (left, right) => {
                let error = [(&self.targets.left, &left), (&self.targets.right, &right)]
                    .into_iter()
                    .filter_map(|(target, side)| {
                        side.as_ref().err().map(|e| format!("{}: {e}", target.name))
                    })
                    .collect::<Vec<_>>()
                    .join("; ");
                warn!("Testcase {} failed: {}", case.id, error);
                return RunResult {
                    id: case.id.clone(),
                    request,
                    left: left.ok(),
                    right: right.ok(),
                    compare: None,
                    error: Some(error),
                    equal: false,
                };
            }
        };

        let comparison = self.comparator.compare(&left.capture, &right.capture);
        debug!(
            "Testcase {} {} {}: equal={}",
            case.id, request.method, request.path, comparison.equal
        );

        RunResult {
            id: case.id.clone(),
            request,
            left: Some(left),
            right: Some(right),
            equal: comparison.equal,
            compare: Some(comparison),
            error: None,
        }
    }

    /// Run every executable case with bounded concurrency.
    ///
    /// Grouped cases contribute their sub-cases. Results come back in
    /// completion order.
    pub async fn run_all(self: &Arc<Self>, cases: Vec<TestCase>) -> Vec<RunResult> {
        let leaves: Vec<TestCase> = cases.into_iter().flat_map(TestCase::into_leaves).collect();
        info!(
            "Running {} testcases with concurrency {}",
            leaves.len(),
            self.concurrency
        );

        stream::iter(leaves)
            .map(|case| {
                let executor = Arc::clone(self);
                let id = case.id.clone();
                let request = case.request();
                async move {
                    match tokio::spawn(async move { executor.run_case(&case).await }).await {
                        Ok(result) => result,
                        Err(e) => {
                            warn!("Testcase {} task failed: {}", id, e);
                            RunResult::failed(id, request, format!("task failed: {e}"))
                        }
                    }
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await
    }
}
