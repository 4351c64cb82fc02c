//! Order-insensitive, ignore-aware structural JSON diff.

use super::path::JsonPath;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// Kind of a single structural difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Same type, different value
    ValueChanged,
    /// Different JSON types at the same path
    TypeChanged,
    /// Present only on the right
    ItemAdded,
    /// Present only on the left
    ItemRemoved,
}

/// One difference between the left and right documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonChange {
    pub path: String,
    pub kind: ChangeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<Value>,
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Structural differ. Arrays compare as multisets; differences at an
/// ignored path (or beneath it) are never reported.
#[derive(Debug, Clone, Default)]
pub struct JsonDiffer {
    ignore: Vec<JsonPath>,
}

impl JsonDiffer {
    pub fn new(ignore: Vec<JsonPath>) -> Self {
        Self { ignore }
    }

    fn ignored(&self, path: &JsonPath) -> bool {
        self.ignore.iter().any(|p| p.covers(path))
    }

    /// Every difference between `left` and `right`, in a stable order.
    pub fn diff(&self, left: &Value, right: &Value) -> Vec<JsonChange> {
        let mut changes = Vec::new();
        self.diff_at(left, right, &JsonPath::root(), &mut changes);
        changes
    }

    fn equal_at(&self, left: &Value, right: &Value, path: &JsonPath) -> bool {
        let mut changes = Vec::new();
        self.diff_at(left, right, path, &mut changes);
        changes.is_empty()
    }

    fn diff_at(&self, left: &Value, right: &Value, path: &JsonPath, out: &mut Vec<JsonChange>) {
        if self.ignored(path) {
            return;
        }

        match (left, right) {
            (Value::Object(l), Value::Object(r)) => {
                let keys: BTreeSet<&String> = l.keys().chain(r.keys()).collect();
                for key in keys {
                    let child = path.key(key);
                    if self.ignored(&child) {
                        continue;
                    }
                    match (l.get(key), r.get(key)) {
                        (Some(lv), Some(rv)) => self.diff_at(lv, rv, &child, out),
                        (Some(lv), None) => out.push(removed(&child, lv)),
                        (None, Some(rv)) => out.push(added(&child, rv)),
                        (None, None) => {}
                    }
                }
            }
            (Value::Array(l), Value::Array(r)) => self.diff_arrays(l, r, path, out),
            _ if type_name(left) != type_name(right) => out.push(JsonChange {
                path: path.to_string(),
                kind: ChangeKind::TypeChanged,
                left: Some(left.clone()),
                right: Some(right.clone()),
            }),
            _ if !scalars_equal(left, right) => out.push(JsonChange {
                path: path.to_string(),
                kind: ChangeKind::ValueChanged,
                left: Some(left.clone()),
                right: Some(right.clone()),
            }),
            _ => {}
        }
    }

    /// Multiset comparison: each left element consumes the first equal,
    /// still-unmatched right element. Leftovers pair up positionally; paired
    /// containers of the same kind are diffed recursively so a single changed
    /// field is reported at its own path.
    fn diff_arrays(&self, l: &[Value], r: &[Value], path: &JsonPath, out: &mut Vec<JsonChange>) {
        let mut unmatched_right: Vec<usize> = (0..r.len())
            .filter(|j| !self.ignored(&path.index(*j)))
            .collect();
        let mut unmatched_left = Vec::new();

        for (i, lv) in l.iter().enumerate() {
            let child = path.index(i);
            if self.ignored(&child) {
                continue;
            }
            let found = unmatched_right
                .iter()
                .position(|&j| self.equal_at(lv, &r[j], &child));
            match found {
                Some(pos) => {
                    unmatched_right.remove(pos);
                }
                None => unmatched_left.push(i),
            }
        }

        let mut left_iter = unmatched_left.into_iter();
        let mut right_iter = unmatched_right.into_iter();
        loop {
            match (left_iter.next(), right_iter.next()) {
                (Some(i), Some(j)) => {
                    let same_container = matches!(
                        (&l[i], &r[j]),
                        (Value::Object(_), Value::Object(_)) | (Value::Array(_), Value::Array(_))
                    );
                    if same_container {
                        self.diff_at(&l[i], &r[j], &path.index(i), out);
                    } else {
                        out.push(removed(&path.index(i), &l[i]));
                        out.push(added(&path.index(j), &r[j]));
                    }
                }
                (Some(i), None) => out.push(removed(&path.index(i), &l[i])),
                (None, Some(j)) => out.push(added(&path.index(j), &r[j])),
                (None, None) => break,
            }
        }
    }
}

/// Numbers compare by value so `1` and `1.0` are equal.
///
/// Two integers compare exactly; floats only enter when one side is one.
fn scalars_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) if a.is_f64() || b.is_f64() => {
            matches!((a.as_f64(), b.as_f64()), (Some(x), Some(y)) if x == y)
        }
        _ => left == right,
    }
}

fn removed(path: &JsonPath, value: &Value) -> JsonChange {
    JsonChange {
        path: path.to_string(),
        kind: ChangeKind::ItemRemoved,
        left: Some(value.clone()),
        right: None,
    }
}

fn added(path: &JsonPath, value: &Value) -> JsonChange {
    JsonChange {
        path: path.to_string(),
        kind: ChangeKind::ItemAdded,
        left: None,
        right: Some(value.clone()),
    }
}

/// Stable, key-sorted, two-space indented rendering for display.
pub fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
