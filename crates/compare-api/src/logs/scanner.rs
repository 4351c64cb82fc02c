//! Brace-balanced recovery scanner.
//!
//! Splits text holding concatenated or pretty-printed JSON objects (with no
//! enclosing array and possibly garbage between them) into candidate
//! top-level `{...}` chunks. String literals and escapes are tracked so that
//! braces inside string values do not desynchronize the scan.

use serde_json::{Map, Value};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Outside any string literal
    Code,
    /// Inside a string literal
    InString,
    /// Just after a backslash inside a string literal
    Escaped,
}

/// Return the byte spans of every balanced top-level `{...}` chunk.
///
/// A stray closing brace at depth zero is ignored rather than driving the
/// depth negative.
pub fn object_spans(source: &str) -> Vec<&str> {
    let mut spans = Vec::new();
    let mut state = State::Code;
    let mut depth = 0usize;
    let mut start = 0usize;

    // Every byte inspected here is ASCII, so indices are char boundaries.
    for (i, byte) in source.bytes().enumerate() {
        state = match (state, byte) {
            (State::Escaped, _) => State::InString,
            (State::InString, b'\\') => State::Escaped,
            (State::InString, b'"') => State::Code,
            (State::InString, _) => State::InString,
            (State::Code, b'"') => State::InString,
            (State::Code, b'{') => {
                if depth == 0 {
                    start = i;
                }
                depth += 1;
                State::Code
            }
            (State::Code, b'}') => {
                match depth {
                    0 => {}
                    1 => {
                        depth = 0;
                        spans.push(&source[start..=i]);
                    }
                    _ => depth -= 1,
                }
                State::Code
            }
            (State::Code, _) => State::Code,
        };
    }

    spans
}

/// Extract every top-level chunk that parses as a JSON object, skipping the
/// rest.
pub fn scan_objects(source: &str) -> Vec<Map<String, Value>> {
    object_spans(source)
        .into_iter()
        .filter_map(|chunk| match serde_json::from_str::<Value>(chunk) {
            Ok(Value::Object(map)) => Some(map),
            Ok(_) => None,
            Err(e) => {
                debug!("Skipping unparseable object chunk: {}", e);
                None
            }
        })
        .collect()
}
