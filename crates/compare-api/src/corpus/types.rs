//! Testcase types: the artifact bridging extraction and execution.

use crate::canonical::{Headers, NormalizedRequest, Query};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Testcase identifier.
///
/// Flat cases have a single segment (`3`); grouped sub-cases have two
/// (`"1.2"`). Ordering compares segments numerically, so `1.2 < 1.10 < 2`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CaseId(Vec<u64>);

impl CaseId {
    pub fn top(id: u64) -> Self {
        Self(vec![id])
    }

    pub fn child(&self, k: u64) -> Self {
        let mut segments = self.0.clone();
        segments.push(k);
        Self(segments)
    }

    pub fn segments(&self) -> &[u64] {
        &self.0
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.0 {
            if !first {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
            first = false;
        }
        Ok(())
    }
}

impl FromStr for CaseId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments = s
            .split('.')
            .map(|part| part.trim().parse::<u64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| format!("invalid testcase id '{s}'"))?;
        Ok(Self(segments))
    }
}

impl Serialize for CaseId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.as_slice() {
            [single] => serializer.serialize_u64(*single),
            _ => serializer.serialize_str(&self.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for CaseId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(u64),
            Str(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Num(n) => Ok(CaseId::top(n)),
            Raw::Str(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Role of a case produced by the path-grouped strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseKind {
    PathGroup,
    ParameterCombination,
}

/// One canonical request to replay against both targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub id: CaseId,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<CaseKind>,
    pub method: String,
    pub path: String,
    #[serde(default)]
    pub query: Query,
    #[serde(default)]
    pub headers: Headers,
    #[serde(default)]
    pub body: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_cases: Vec<TestCase>,
}

impl TestCase {
    /// Flat case built from a normalized request.
    pub fn from_request(id: CaseId, request: NormalizedRequest) -> Self {
        Self {
            id,
            kind: None,
            method: request.method,
            path: request.path,
            query: request.query,
            headers: request.headers,
            body: request.body,
            parent_id: None,
            sub_cases: Vec::new(),
        }
    }

    pub fn is_group(&self) -> bool {
        !self.sub_cases.is_empty()
    }

    /// Executable cases: the case itself, or its sub-cases flattened.
    pub fn into_leaves(self) -> Vec<TestCase> {
        if !self.is_group() {
            vec![self]
        } else {
            self.sub_cases
                .into_iter()
                .flat_map(TestCase::into_leaves)
                .collect()
        }
    }

    /// Snapshot of the request this case replays.
    pub fn request(&self) -> NormalizedRequest {
        NormalizedRequest {
            method: self.method.clone(),
            path: self.path.clone(),
            query: self.query.clone(),
            headers: self.headers.clone(),
            body: self.body.clone(),
        }
    }
}
