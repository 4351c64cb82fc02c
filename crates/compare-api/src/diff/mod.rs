//! Response comparison.
//!
//! Status, headers and bodies are compared independently; a response pair is
//! equal only when all three are. Bodies pick a mode per pair: structural
//! JSON when both sides are objects or arrays, canonical XML when both look
//! like XML, literal text otherwise.

mod headers;
mod json;
mod path;
mod status;
mod text;
mod xml;

pub use headers::{compare_headers, HeaderComparison, HeaderDiff};
pub use json::{pretty, ChangeKind, JsonChange, JsonDiffer};
pub use path::{parse_paths, prune, JsonPath, Segment};
pub use status::{compare_status, StatusComparison};
pub use text::unified_diff;
pub use xml::{looks_like_xml, normalize_xml};

use crate::config::ResponseIgnores;
use crate::executor::ResponseCapture;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A borrowed view of a captured body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BodyView<'a> {
    Json(&'a Value),
    Text(&'a str),
    Absent,
}

impl<'a> BodyView<'a> {
    fn structured(&self) -> Option<&'a Value> {
        match *self {
            BodyView::Json(v) if v.is_object() || v.is_array() => Some(v),
            _ => None,
        }
    }

    /// String form: text verbatim, JSON strings unquoted, other JSON
    /// serialized, null and absent bodies empty.
    fn as_text(&self) -> String {
        match self {
            BodyView::Text(s) => s.to_string(),
            BodyView::Json(Value::String(s)) => s.clone(),
            BodyView::Json(Value::Null) | BodyView::Absent => String::new(),
            BodyView::Json(other) => other.to_string(),
        }
    }
}

/// Body verdict, tagged with the comparison mode that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum BodyComparison {
    Json {
        equal: bool,
        diff: Vec<JsonChange>,
        left_pretty: String,
        right_pretty: String,
    },
    Xml {
        equal: bool,
        left_normalized: String,
        right_normalized: String,
        /// False when either side failed to parse and raw text was compared
        normalized: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        unified_diff: Option<String>,
    },
    Text {
        equal: bool,
        left_text: String,
        right_text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        unified_diff: Option<String>,
    },
}

impl BodyComparison {
    pub fn equal(&self) -> bool {
        match self {
            BodyComparison::Json { equal, .. }
            | BodyComparison::Xml { equal, .. }
            | BodyComparison::Text { equal, .. } => *equal,
        }
    }

    pub fn mode(&self) -> &'static str {
        match self {
            BodyComparison::Json { .. } => "json",
            BodyComparison::Xml { .. } => "xml",
            BodyComparison::Text { .. } => "text",
        }
    }
}

/// Full verdict for one response pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub status: StatusComparison,
    pub headers: HeaderComparison,
    pub bodies: BodyComparison,
    pub equal: bool,
}

/// Compares response pairs under the configured response-side ignores.
#[derive(Debug, Clone, Default)]
pub struct Comparator {
    ignore_headers: Vec<String>,
    differ: JsonDiffer,
}

impl Comparator {
    pub fn new(ignores: &ResponseIgnores) -> Self {
        Self {
            ignore_headers: ignores.headers.clone(),
            differ: JsonDiffer::new(parse_paths(&ignores.body_json_paths)),
        }
    }

    pub fn compare(&self, left: &ResponseCapture, right: &ResponseCapture) -> ComparisonResult {
        let status = compare_status(left.status, right.status);
        let headers = compare_headers(&left.headers, &right.headers, &self.ignore_headers);
        let bodies = self.compare_bodies(left.body_view(), right.body_view());
        let equal = status.equal && headers.equal && bodies.equal();

        ComparisonResult {
            status,
            headers,
            bodies,
            equal,
        }
    }

    pub fn compare_bodies(&self, left: BodyView<'_>, right: BodyView<'_>) -> BodyComparison {
        if let (Some(l), Some(r)) = (left.structured(), right.structured()) {
            let diff = self.differ.diff(l, r);
            return BodyComparison::Json {
                equal: diff.is_empty(),
                diff,
                left_pretty: pretty(l),
                right_pretty: pretty(r),
            };
        }

        let (left_text, right_text) = (left.as_text(), right.as_text());
        let neither_structured = left.structured().is_none() && right.structured().is_none();

        if neither_structured && looks_like_xml(&left_text) && looks_like_xml(&right_text) {
            let (left_normalized, right_normalized, normalized) =
                match (normalize_xml(&left_text), normalize_xml(&right_text)) {
                    (Some(l), Some(r)) => (l, r, true),
                    _ => (left_text, right_text, false),
                };
            let equal = left_normalized == right_normalized;
            let unified_diff = (!equal).then(|| unified_diff(&left_normalized, &right_normalized));
            return BodyComparison::Xml {
                equal,
                left_normalized,
                right_normalized,
                normalized,
                unified_diff,
            };
        }

        let equal = left_text == right_text;
        let unified_diff = (!equal).then(|| unified_diff(&left_text, &right_text));
        BodyComparison::Text {
            equal,
            left_text,
            right_text,
            unified_diff,
        }
    }
}
