//! Root-relative addressing into JSON documents.
//!
//! Paths render as `root['meta']['items'][0]`. Parsing also accepts JSONPath
//! style (`$.meta.items[0]`) and bare dotted form (`meta.items[0]`); `[*]`
//! matches any index or key.

use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
    Any,
}

impl Segment {
    /// Whether this (pattern) segment addresses `actual`.
    ///
    /// A numeric key also matches the array index of the same value, so
    /// dotted paths like `items.0` work.
    fn matches(&self, actual: &Segment) -> bool {
        match (self, actual) {
            (Segment::Any, _) => true,
            (Segment::Key(a), Segment::Key(b)) => a == b,
            (Segment::Index(a), Segment::Index(b)) => a == b,
            (Segment::Key(k), Segment::Index(i)) => k.parse::<usize>().ok() == Some(*i),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JsonPath {
    segments: Vec<Segment>,
}

impl JsonPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn key(&self, key: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Key(key.to_string()));
        Self { segments }
    }

    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Index(index));
        Self { segments }
    }

    /// Whether this pattern addresses `path` or one of its ancestors.
    pub fn covers(&self, path: &JsonPath) -> bool {
        self.segments.len() <= path.segments.len()
            && self
                .segments
                .iter()
                .zip(&path.segments)
                .all(|(pattern, actual)| pattern.matches(actual))
    }

    /// Parse any accepted path syntax. Returns `None` on malformed input.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if let Some(rest) = input.strip_prefix("root") {
            if rest.is_empty() || rest.starts_with('[') {
                return parse_brackets(rest).map(|segments| Self { segments });
            }
        }
        let dotted = input.strip_prefix('$').unwrap_or(input);
        let dotted = dotted.strip_prefix('.').unwrap_or(dotted);
        parse_dotted(dotted).map(|segments| Self { segments })
    }
}

/// Parse `['a'][0]["b"][*]` sequences.
fn parse_brackets(mut rest: &str) -> Option<Vec<Segment>> {
    let mut segments = Vec::new();
    while !rest.is_empty() {
        rest = rest.strip_prefix('[')?;
        let quote = rest.chars().next()?;
        if quote == '\'' || quote == '"' {
            let body = &rest[1..];
            let end = body.find(&format!("{quote}]"))?;
            segments.push(Segment::Key(body[..end].to_string()));
            rest = &body[end + 2..];
        } else {
            let end = rest.find(']')?;
            segments.push(index_segment(rest[..end].trim())?);
            rest = &rest[end + 1..];
        }
    }
    Some(segments)
}

fn index_segment(raw: &str) -> Option<Segment> {
    if raw == "*" {
        Some(Segment::Any)
    } else {
        raw.parse().ok().map(Segment::Index)
    }
}

/// Parse `a.b[0].c` / `a.*` sequences.
fn parse_dotted(input: &str) -> Option<Vec<Segment>> {
    let mut segments = Vec::new();
    if input.is_empty() {
        return Some(segments);
    }
    for part in input.split('.') {
        let (name, mut indices) = match part.find('[') {
            Some(pos) => (&part[..pos], &part[pos..]),
            None => (part, ""),
        };
        match name {
            "" if indices.is_empty() => return None,
            "" => {}
            "*" => segments.push(Segment::Any),
            _ => segments.push(Segment::Key(name.to_string())),
        }
        while !indices.is_empty() {
            indices = indices.strip_prefix('[')?;
            let end = indices.find(']')?;
            segments.push(index_segment(indices[..end].trim())?);
            indices = &indices[end + 1..];
        }
    }
    Some(segments)
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("root")?;
        for segment in &self.segments {
            match segment {
                Segment::Key(k) => write!(f, "['{k}']")?,
                Segment::Index(i) => write!(f, "[{i}]")?,
                Segment::Any => f.write_str("[*]")?,
            }
        }
        Ok(())
    }
}

/// Parse a list of configured paths, dropping (and reporting) malformed ones.
pub fn parse_paths(raw: &[String]) -> Vec<JsonPath> {
    raw.iter()
        .filter_map(|p| {
            let parsed = JsonPath::parse(p);
            if parsed.is_none() {
                tracing::warn!("Ignoring malformed JSON path '{}'", p);
            }
            parsed
        })
        .collect()
}

/// Remove every subtree addressed by one of `paths`.
///
/// A path covering the root yields `Value::Null`.
pub fn prune(value: &Value, paths: &[JsonPath]) -> Value {
    if paths.is_empty() {
        return value.clone();
    }
    prune_at(value, &JsonPath::root(), paths).unwrap_or(Value::Null)
}

fn prune_at(value: &Value, at: &JsonPath, paths: &[JsonPath]) -> Option<Value> {
    if paths.iter().any(|p| p.covers(at)) {
        return None;
    }
    Some(match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter_map(|(k, v)| prune_at(v, &at.key(k), paths).map(|v| (k.clone(), v)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .enumerate()
                .filter_map(|(i, v)| prune_at(v, &at.index(i), paths))
                .collect(),
        ),
        other => other.clone(),
    })
}
