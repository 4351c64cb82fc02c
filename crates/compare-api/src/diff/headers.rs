//! Header comparator.

use crate::canonical::{normalize_headers, Headers};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A header whose value differs (or is missing on one side).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderDiff {
    pub key: String,
    pub left: Option<String>,
    pub right: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderComparison {
    pub equal: bool,
    /// Mismatches ordered by header name
    pub diffs: Vec<HeaderDiff>,
    /// Left headers after normalization
    pub left: Headers,
    /// Right headers after normalization
    pub right: Headers,
}

/// Compare two header maps after dropping `ignore` (case-insensitive).
pub fn compare_headers(left: &Headers, right: &Headers, ignore: &[String]) -> HeaderComparison {
    let left = normalize_headers(left, ignore);
    let right = normalize_headers(right, ignore);

    let keys: BTreeSet<&String> = left.keys().chain(right.keys()).collect();
    let diffs: Vec<HeaderDiff> = keys
        .into_iter()
        .filter_map(|key| {
            let (lv, rv) = (left.get(key), right.get(key));
            (lv != rv).then(|| HeaderDiff {
                key: key.clone(),
                left: lv.cloned(),
                right: rv.cloned(),
            })
        })
        .collect();

    HeaderComparison {
        equal: diffs.is_empty(),
        diffs,
        left,
        right,
    }
}
