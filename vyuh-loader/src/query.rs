//! CMS queries and route resolution.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Document type that route documents are published under unless configured
/// otherwise.
pub const DEFAULT_ROUTE_TYPE: &str = "vyuh.route";

/// A literal CMS query plus bound parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub text: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub params: Map<String, Value>,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            params: Map::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// The query selecting the first `route_type` document whose `path`
    /// equals the normalized `path`:
    ///
    /// ```text
    /// *[_type == "vyuh.route" && path == "/chakra"][0]
    /// ```
    pub fn route(route_type: &str, path: &str) -> Self {
        Self::new(format!(
            "*[_type == \"{}\" && path == \"{}\"][0]",
            escape(route_type),
            escape(&normalize_path(path))
        ))
    }

    /// Recovers `(route_type, path)` from a query built by [`Query::route`].
    pub fn as_route(&self) -> Option<(String, String)> {
        let rest = self.text.strip_prefix("*[_type == ")?;
        let (route_type, rest) = take_string(rest)?;
        let rest = rest.strip_prefix(" && path == ")?;
        let (path, rest) = take_string(rest)?;
        (rest == "][0]").then_some((route_type, path))
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// What a loader fetches.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentSource {
    Query(Query),
    Route { path: String },
}

impl DocumentSource {
    pub fn route(path: impl Into<String>) -> Self {
        Self::Route { path: path.into() }
    }

    pub fn to_query(&self, route_type: &str) -> Query {
        match self {
            Self::Query(query) => query.clone(),
            Self::Route { path } => Query::route(route_type, path),
        }
    }
}

impl From<Query> for DocumentSource {
    fn from(query: Query) -> Self {
        Self::Query(query)
    }
}

/// Leading `/`, no empty segments, no trailing `/` except for the root.
pub fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path
        .trim()
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect();
    format!("/{}", segments.join("/"))
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Reads one double-quoted, backslash-escaped literal from the front of
/// `input`.
fn take_string(input: &str) -> Option<(String, &str)> {
    let body = input.strip_prefix('"')?;
    let mut out = String::new();
    let mut chars = body.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => out.push(chars.next()?.1),
            '"' => return Some((out, &body[i + 1..])),
            c => out.push(c),
        }
    }
    None
}
