//! Error types for the extraction and execution phases.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading a traffic log.
///
/// Malformed individual entries never surface here; they are dropped by the
/// reader. Only whole-file failures do.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("Unsupported log format: {0} (expected json, jsonl or auto)")]
    UnsupportedFormat(String),
    #[error("Failed to parse {format} logs: {source}")]
    Parse {
        format: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("{format} logs must be an array, an object wrapping an array, or a single object")]
    UnexpectedShape { format: &'static str },
    #[error("Failed to read logs from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while persisting or reloading JSON artifacts.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised by a single outbound call.
///
/// These are always folded into the run result of the testcase that caused
/// them.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Invalid URL '{0}'")]
    InvalidUrl(String),
    #[error("Invalid method '{0}'")]
    InvalidMethod(String),
    #[error("Invalid header '{name}'")]
    InvalidHeader { name: String },
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),
}
