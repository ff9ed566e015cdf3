//! Path resolution over decoded JSON response bodies
//!
//! A path is a `.`-separated list of property keys with `[]` marking array
//! projection: `"[]departmentId"` on an array of objects yields every
//! object's `departmentId`. Resolution is total. A shape mismatch never
//! fails, it simply produces fewer matches (or absent ones), so that
//! predicates built on top can return `false` instead of aborting a batch.
//!
//! Copyright (c) 2025 Apiprobe Team
//! Licensed under the Apache-2.0 license

pub mod error;
pub mod parser;


pub use error::PathError;
pub use parser::Segment;

use serde_json::Value;

/// A parsed, reusable path expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExpr {
    raw: String,
    segments: Vec<Segment>,
}

impl PathExpr {
    /// Parse a path expression
    pub fn parse(path: &str) -> Result<Self, PathError> {
        Ok(Self {
            raw: path.to_string(),
            segments: parser::parse(path)?,
        })
    }

    /// Whether the path contains at least one `[]` projection
    pub fn is_projected(&self) -> bool {
        self.segments.contains(&Segment::Project)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Resolve against a value, keeping one entry per reached leaf
    pub fn resolve<'a>(&self, value: &'a Value) -> Matches<'a> {
        let mut items = Vec::new();
        resolve_into(&self.segments, Some(value), &mut items);
        Matches {
            items,
            projected: self.is_projected(),
        }
    }
}

impl std::fmt::Display for PathExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl std::str::FromStr for PathExpr {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn resolve_into<'a>(segments: &[Segment], current: Option<&'a Value>, out: &mut Vec<Option<&'a Value>>) {
    let Some((head, rest)) = segments.split_first() else {
        out.push(current);
        return;
    };

    match head {
        Segment::Project => {
            if let Some(Value::Array(items)) = current {
                for item in items {
                    resolve_into(rest, Some(item), out);
                }
            }
        }
        Segment::Key(key) => {
            let next = current.and_then(|value| match value {
                Value::Object(map) => map.get(key),
                Value::Array(items) => key.parse::<usize>().ok().and_then(|index| items.get(index)),
                _ => None,
            });
            resolve_into(rest, next, out);
        }
    }
}

/// The outcome of resolving a path: one slot per reached leaf, `None`
/// where the leaf property was missing
#[derive(Debug, Clone, PartialEq)]
pub struct Matches<'a> {
    items: Vec<Option<&'a Value>>,
    projected: bool,
}

impl<'a> Matches<'a> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            projected: false,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether the path that produced these matches used `[]`
    pub fn is_projected(&self) -> bool {
        self.projected
    }

    /// True when there is at least one match and none is absent or null
    pub fn all_present(&self) -> bool {
        !self.items.is_empty()
            && self
                .items
                .iter()
                .all(|item| matches!(item, Some(value) if !value.is_null()))
    }

    /// The single match, if there is exactly one and it is present
    pub fn single(&self) -> Option<&'a Value> {
        match self.items.as_slice() {
            [Some(value)] => Some(*value),
            _ => None,
        }
    }

    /// Present matches, skipping absent slots
    pub fn present(&self) -> impl Iterator<Item = &'a Value> + '_ {
        self.items.iter().filter_map(|item| *item)
    }

    /// Raw slots in resolution order
    pub fn slots(&self) -> &[Option<&'a Value>] {
        &self.items
    }

    /// Owned copy with absent slots rendered as JSON null
    pub fn to_values(&self) -> Vec<Value> {
        self.items
            .iter()
            .map(|item| item.cloned().unwrap_or(Value::Null))
            .collect()
    }
}

/// Resolve a path string against a value
///
/// An unparseable path resolves to no matches.
pub fn resolve<'a>(value: &'a Value, path: &str) -> Matches<'a> {
    match PathExpr::parse(path) {
        Ok(expr) => expr.resolve(value),
        Err(err) => {
            tracing::debug!(path, error = %err, "path did not parse, treating as unresolved");
            Matches::empty()
        }
    }
}
