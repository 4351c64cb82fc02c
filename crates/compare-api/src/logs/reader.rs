//! Tolerant traffic-log reader.
//!
//! Accepts a JSON array of objects, one JSON object per line, or a single
//! object wrapping a `logs`/`data` array. Individual malformed entries are
//! dropped; only an unreadable whole file is an error.

use super::scanner::scan_objects;
use crate::error::LogError;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, info};

/// One raw traffic entry.
pub type LogRecord = Map<String, Value>;

/// Log serialization shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Detect from content
    #[default]
    Auto,
    /// A single JSON document
    Json,
    /// Newline-delimited JSON
    Jsonl,
}

impl LogFormat {
    /// Parse a format hint.
    pub fn parse(hint: &str) -> Result<Self, LogError> {
        match hint.trim().to_lowercase().as_str() {
            "auto" => Ok(LogFormat::Auto),
            "json" => Ok(LogFormat::Json),
            "jsonl" => Ok(LogFormat::Jsonl),
            _ => Err(LogError::UnsupportedFormat(hint.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Auto => "auto",
            LogFormat::Json => "json",
            LogFormat::Jsonl => "jsonl",
        }
    }

    /// Resolve `Auto` against the content: a leading `[` means a JSON array,
    /// anything else is treated as newline-delimited.
    pub fn resolve(self, text: &str) -> LogFormat {
        match self {
            LogFormat::Auto if text.trim_start().starts_with('[') => LogFormat::Json,
            LogFormat::Auto => LogFormat::Jsonl,
            other => other,
        }
    }
}

/// Read and parse a log file.
pub fn load_logs(path: &Path, format: LogFormat) -> Result<Vec<LogRecord>, LogError> {
    let bytes = std::fs::read(path).map_err(|source| LogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    // Undecodable bytes are dropped rather than failing the whole file.
    let text = String::from_utf8_lossy(&bytes);
    let format = format.resolve(&text);
    let records = read_logs(&text, format)?;
    info!(
        "Loaded {} log records from {} ({})",
        records.len(),
        path.display(),
        format.as_str()
    );
    Ok(records)
}

/// Parse log text into records.
pub fn read_logs(text: &str, format: LogFormat) -> Result<Vec<LogRecord>, LogError> {
    match format.resolve(text) {
        LogFormat::Json => read_json(text),
        _ => Ok(read_jsonl(text)),
    }
}

fn read_json(text: &str) -> Result<Vec<LogRecord>, LogError> {
    let document = parse_document(text).map_err(|source| LogError::Parse {
        format: "json",
        source,
    })?;
    unwrap_records(document).ok_or(LogError::UnexpectedShape { format: "json" })
}

fn read_jsonl(text: &str) -> Vec<LogRecord> {
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(map)) => records.push(map),
            Ok(_) => skipped += 1,
            Err(_) => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!("Skipped {} non-object or malformed JSONL lines", skipped);
    }

    if records.is_empty() {
        // Pretty-printed JSON fed as JSONL
        debug!("No JSONL lines parsed, retrying content as a single JSON document");
        return parse_document(text)
            .ok()
            .and_then(unwrap_records)
            .unwrap_or_default();
    }

    records
}

/// Parse text as one JSON document, recovering from a missing enclosing
/// array and finally from arbitrary separators between objects.
fn parse_document(text: &str) -> Result<Value, serde_json::Error> {
    let err = match serde_json::from_str::<Value>(text) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    if let Ok(value) = serde_json::from_str::<Value>(&format!("[{text}]")) {
        debug!("Parsed logs as comma-separated objects without enclosing brackets");
        return Ok(value);
    }

    let objects = scan_objects(text);
    if objects.is_empty() {
        return Err(err);
    }
    debug!(
        "Recovered {} objects with the brace-balanced scanner",
        objects.len()
    );
    Ok(Value::Array(objects.into_iter().map(Value::Object).collect()))
}

/// Flatten a parsed document into its object entries.
///
/// Returns `None` when the top-level value is neither an array nor an object.
fn unwrap_records(document: Value) -> Option<Vec<LogRecord>> {
    let items = match document {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            let wrapped = ["logs", "data"]
                .into_iter()
                .find(|key| matches!(map.get(*key), Some(Value::Array(_))));
            match wrapped.and_then(|key| map.remove(key)) {
                Some(Value::Array(items)) => items,
                _ => vec![Value::Object(map)],
            }
        }
        _ => return None,
    };

    Some(
        items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect(),
    )
}
