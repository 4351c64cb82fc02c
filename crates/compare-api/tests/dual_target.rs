//! Dual-target execution against stub servers.

mod common;

use common::{spawn_stub, unreachable_base_url, Stub};
use compare_api::canonical::{Headers, NormalizedRequest, Query};
use compare_api::config::{DedupStrategy, TargetsInfo};
use compare_api::diff::BodyComparison;
use compare_api::executor::{send, RetryPolicy};
use compare_api::logs::{read_logs, LogFormat};
use compare_api::{CaseId, Config, CorpusBuilder, Executor, Report, TestCase};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn config(left: &str, right: &str) -> Config {
    let mut config = Config::default();
    config.targets.left.base_url = left.to_string();
    config.targets.right.base_url = right.to_string();
    config.execution.retries = 0;
    config
}

fn cases_from_logs(config: &Config, logs: serde_json::Value) -> Vec<TestCase> {
    let records = read_logs(&logs.to_string(), LogFormat::Auto).unwrap();
    CorpusBuilder::new(config).build(&records)
}

async fn run(config: &Config, cases: Vec<TestCase>) -> Report {
    let executor = Arc::new(Executor::new(config).unwrap());
    let results = executor.run_all(cases).await;
    Report::assemble(results, TargetsInfo::from(&config.targets))
}

#[tokio::test]
async fn test_ignored_body_path_compares_equal() {
    let left = spawn_stub(Stub::json(200, json!({"a": 1, "meta": {"traceId": "x"}}))).await;
    let right = spawn_stub(Stub::json(200, json!({"a": 1, "meta": {"traceId": "y"}}))).await;

    let mut cfg = config(&left.base_url, &right.base_url);
    let cases = cases_from_logs(&cfg, json!([{"method": "GET", "url": "/status"}]));

    let report = run(&cfg, cases.clone()).await;
    assert_eq!(report.summary.failed, 1);
    let compare = report.results[0].compare.as_ref().unwrap();
    assert!(compare.status.equal);
    match &compare.bodies {
        BodyComparison::Json { equal, diff, .. } => {
            assert!(!equal);
            assert_eq!(diff[0].path, "root['meta']['traceId']");
        }
        other => panic!("unexpected body mode {}", other.mode()),
    }

    cfg.response_ignores.body_json_paths = vec!["root['meta']['traceId']".to_string()];
    let report = run(&cfg, cases).await;
    assert_eq!(report.summary.passed, 1);
    assert!(report.results[0].equal);
    assert!(report.results[0].error.is_none());
}

#[tokio::test]
async fn test_status_mismatch() {
    let left = spawn_stub(Stub::json(200, json!({"ok": true}))).await;
    let right = spawn_stub(Stub::json(500, json!({"ok": true}))).await;
    let cfg = config(&left.base_url, &right.base_url);

    let cases = cases_from_logs(&cfg, json!([{"url": "/health"}]));
    let report = run(&cfg, cases).await;

    let result = &report.results[0];
    assert!(!result.equal);
    let compare = result.compare.as_ref().unwrap();
    assert!(!compare.status.equal);
    assert_eq!(compare.status.left, 200);
    assert_eq!(compare.status.right, 500);
    assert!(compare.bodies.equal());

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["results"][0]["compare"]["status"]["left"], 200);
    assert_eq!(value["results"][0]["compare"]["status"]["right"], 500);
    assert_eq!(value["results"][0]["left"]["target"], "left");
}

#[tokio::test]
async fn test_unreachable_right_target_is_isolated() {
    let left = spawn_stub(Stub::json(200, json!({"ok": true}))).await;
    let mut cfg = config(&left.base_url, &unreachable_base_url());
    cfg.targets.right.name = "candidate".to_string();

    let cases = cases_from_logs(&cfg, json!([{"url": "/a"}, {"url": "/b"}]));
    let report = run(&cfg, cases).await;

    assert_eq!(report.summary.total, 2);
    assert_eq!(report.summary.failed, 2);
    for result in &report.results {
        assert!(!result.equal);
        assert!(result.compare.is_none());
        assert!(result.error.as_deref().unwrap().starts_with("candidate:"));
        let left = result.left.as_ref().unwrap();
        assert_eq!(left.target, "left");
        assert_eq!(left.capture.status, 200);
        assert!(result.right.is_none());
    }
    assert_eq!(report.results[0].request.path, "/a");
    assert_eq!(left.requests().len(), 2);
}

#[tokio::test]
async fn test_outbound_requests_per_target() {
    let left = spawn_stub(Stub::json(201, json!({"id": 1}))).await;
    let right = spawn_stub(Stub::json(201, json!({"id": 1}))).await;
    let mut cfg = config(&format!("{}/", left.base_url), &right.base_url);
    cfg.targets
        .left
        .default_headers
        .insert("X-Env".to_string(), "blue".to_string());
    cfg.targets
        .right
        .default_headers
        .insert("x-env".to_string(), "green".to_string());

    let cases = cases_from_logs(
        &cfg,
        json!([{
            "method": "post",
            "url": "https://prod.example.com/orders?tag=a&tag=b&nonce=7",
            "headers": {"X-Custom": "1", "Authorization": "secret", "Connection": "close"},
            "body": {"qty": 2}
        }]),
    );
    let report = run(&cfg, cases).await;
    assert!(report.results[0].equal);

    let seen_left = &left.requests()[0];
    let seen_right = &right.requests()[0];
    for seen in [seen_left, seen_right] {
        assert_eq!(seen.method, "POST");
        assert_eq!(seen.uri, "/orders?tag=a&tag=b");
        assert_eq!(seen.headers.get("x-custom").map(String::as_str), Some("1"));
        assert!(!seen.headers.contains_key("authorization"));
        assert_eq!(serde_json::from_str::<serde_json::Value>(&seen.body).unwrap(), json!({"qty": 2}));
    }
    assert_eq!(seen_left.headers.get("x-env").map(String::as_str), Some("blue"));
    assert_eq!(seen_right.headers.get("x-env").map(String::as_str), Some("green"));
}

#[tokio::test]
async fn test_xml_and_text_bodies() {
    let left = spawn_stub(Stub::text(200, "application/xml", "<r b=\"2\" a=\"1\"> <x>1</x> </r>")).await;
    let right = spawn_stub(Stub::text(200, "application/xml", "<r a=\"1\" b=\"2\"><x>1</x>   </r>")).await;
    let cfg = config(&left.base_url, &right.base_url);

    let cases = cases_from_logs(&cfg, json!([{"url": "/feed.xml"}]));
    let report = run(&cfg, cases).await;
    let compare = report.results[0].compare.as_ref().unwrap();
    assert_eq!(compare.bodies.mode(), "xml");
    assert!(compare.bodies.equal());
    // Content lengths differ, so headers do too
    assert!(!compare.headers.equal);
    assert_eq!(compare.headers.diffs[0].key, "content-length");
}

#[tokio::test]
async fn test_grouped_cases_run_as_leaves_in_order() {
    let left = spawn_stub(Stub::json(200, json!([]))).await;
    let right = spawn_stub(Stub::json(200, json!([]))).await;
    let mut cfg = config(&left.base_url, &right.base_url);
    cfg.deduplication.strategy = DedupStrategy::PathGrouped;
    cfg.execution.concurrency = 3;

    let logs = json!([
        {"url": "/b?page=1"},
        {"url": "/a?page=1"},
        {"url": "/a?page=2"},
        {"url": "/a?page=3"},
        {"url": "/b?page=1"},
    ]);
    let cases = cases_from_logs(&cfg, logs);
    assert_eq!(cases.len(), 2);

    let report = run(&cfg, cases).await;
    let ids: Vec<&CaseId> = report.results.iter().map(|r| &r.id).collect();
    let rendered: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
    assert_eq!(rendered, vec!["1.1", "1.2", "1.3", "2.1"]);
    assert_eq!(report.summary.passed, 4);
    assert_eq!(left.requests().len(), 4);
}

#[tokio::test]
async fn test_concurrency_bounds_requests_in_flight() {
    let delay = Duration::from_millis(40);
    let left = spawn_stub(Stub::json(200, json!({"ok": true})).with_delay(delay)).await;
    let right = spawn_stub(Stub::json(200, json!({"ok": true})).with_delay(delay)).await;
    let mut cfg = config(&left.base_url, &right.base_url);
    cfg.execution.concurrency = 2;

    let logs: Vec<serde_json::Value> = (0..12)
        .map(|i| json!({"url": format!("/items/{i}")}))
        .collect();
    let cases = cases_from_logs(&cfg, serde_json::Value::Array(logs));
    assert_eq!(cases.len(), 12);

    let report = run(&cfg, cases).await;
    assert_eq!(report.summary.passed, 12);
    for stub in [&left, &right] {
        assert_eq!(stub.requests().len(), 12);
        assert!((1..=2).contains(&stub.peak_in_flight()));
    }
}

#[tokio::test]
async fn test_error_status_is_not_retried() {
    let stub = spawn_stub(Stub::json(500, json!({"error": "boom"}))).await;
    let request = NormalizedRequest {
        method: "GET".to_string(),
        path: "/fails".to_string(),
        query: Query::new(),
        headers: Headers::new(),
        body: None,
    };
    let policy = RetryPolicy {
        retries: 3,
        backoff: Duration::from_millis(1),
    };

    let capture = send(
        &reqwest::Client::new(),
        &stub.base_url,
        &request,
        &Headers::new(),
        policy,
    )
    .await
    .unwrap();
    assert_eq!(capture.status, 500);
    assert_eq!(capture.body_json, Some(json!({"error": "boom"})));
    assert_eq!(stub.requests().len(), 1);
}
