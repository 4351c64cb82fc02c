//! Dual-target execution: outbound calls, response capture, bounded fan-out.

mod capture;
mod client;
mod request;
mod runner;

pub use capture::{collect_headers, is_json_content_type, ResponseCapture};
pub use client::create_http_client;
pub use request::{join_url, send, send_once, RetryPolicy};
pub use runner::{Executor, RunResult, TargetCapture};
