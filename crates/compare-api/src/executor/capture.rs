//! Response capture.

use crate::canonical::Headers;
use crate::diff::BodyView;
use crate::error::RequestError;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

/// What one target answered for one testcase.
///
/// At most one of `body_text` and `body_json` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseCapture {
    pub status: u16,
    /// Lower-cased names; repeated headers comma-joined
    pub headers: Headers,
    pub elapsed_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_json: Option<Value>,
}

/// `application/json` or any `+json` structured suffix.
pub fn is_json_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || mime.ends_with("+json")
}

/// Collapse a header map into one value per lower-cased name.
pub fn collect_headers(map: &HeaderMap) -> Headers {
    let mut headers = Headers::new();
    for (name, value) in map {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        headers
            .entry(name.as_str().to_lowercase())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    headers
}

impl ResponseCapture {
    /// Build a capture, parsing the body as JSON only when the content type
    /// says so and it parses; raw text otherwise.
    pub fn from_parts(status: u16, headers: Headers, elapsed_ms: u64, body: String) -> Self {
        let declared_json = headers
            .get(CONTENT_TYPE.as_str())
            .is_some_and(|ct| is_json_content_type(ct));

        let (body_text, body_json) = if declared_json {
            match serde_json::from_str::<Value>(&body) {
                Ok(json) => (None, Some(json)),
                Err(_) => (Some(body), None),
            }
        } else {
            (Some(body), None)
        };

        Self {
            status,
            headers,
            elapsed_ms,
            body_text,
            body_json,
        }
    }

    /// Read a response to completion. Elapsed time includes the body.
    pub async fn read(response: reqwest::Response, started: Instant) -> Result<Self, RequestError> {
        let status = response.status().as_u16();
        let headers = collect_headers(response.headers());
        let bytes = response.bytes().await?;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let body = String::from_utf8_lossy(&bytes).into_owned();
        Ok(Self::from_parts(status, headers, elapsed_ms, body))
    }

    pub fn body_view(&self) -> BodyView<'_> {
        match (&self.body_json, &self.body_text) {
            (Some(json), _) => BodyView::Json(json),
            (None, Some(text)) => BodyView::Text(text),
            (None, None) => BodyView::Absent,
        }
    }
}
