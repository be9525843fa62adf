//! Path-addressed access to clouds documents
//!
//! Clouds files are read and written through the [`DocumentStore`] trait,
//! which addresses nodes with path expressions instead of fixed structs.
//! Input files come from many generators and are only loosely shaped, so
//! lookups have to tolerate missing branches and odd nesting.
//!
//! ## Path Syntax
//!
//! - Dot notation: `clouds.prod.auth.auth_url`
//! - Quoted keys: `clouds["my.project"].auth` (keys containing dots)
//! - Sequence indices: `regions[0]`
//! - Escaped dots: `clouds.my\.project`

pub mod yaml;

use serde_yaml::Value;

use crate::error::Result;

pub use yaml::YamlDocument;

/// One step in a document path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathSegment {
    /// A mapping key
    Key(String),
    /// A sequence index
    Index(usize),
}

impl PathSegment {
    pub fn key(key: impl Into<String>) -> Self {
        PathSegment::Key(key.into())
    }
}

/// Render segments back into a path string for error messages.
pub fn display_path(path: &[PathSegment]) -> String {
    let mut out = String::new();
    for segment in path {
        match segment {
            PathSegment::Key(key) if key.contains('.') => {
                out.push_str(&format!("[\"{}\"]", key));
            }
            PathSegment::Key(key) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(key);
            }
            PathSegment::Index(idx) => out.push_str(&format!("[{}]", idx)),
        }
    }
    out
}

/// Parse a path expression into segments.
///
/// # Examples
///
/// ```
/// use clouds_gen::document::{parse_path, PathSegment};
///
/// let segments = parse_path(r#"clouds["a.b"].auth"#);
/// assert_eq!(segments[1], PathSegment::Key("a.b".to_string()));
/// ```
pub fn parse_path(path: &str) -> Vec<PathSegment> {
    let path = path.trim();
    if path.is_empty() || path == "/" {
        return Vec::new();
    }

    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = path.chars().peekable();

    let flush = |current: &mut String, segments: &mut Vec<PathSegment>| {
        if !current.is_empty() {
            segments.push(PathSegment::Key(std::mem::take(current)));
        }
    };

    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            '.' => flush(&mut current, &mut segments),
            '[' => {
                flush(&mut current, &mut segments);
                match chars.peek().copied() {
                    Some(quote @ ('"' | '\'')) => {
                        chars.next();
                        let mut key = String::new();
                        while let Some(ch) = chars.next() {
                            if ch == '\\' {
                                if let Some(next) = chars.next() {
                                    key.push(next);
                                }
                            } else if ch == quote && chars.peek() == Some(&']') {
                                chars.next();
                                break;
                            } else {
                                key.push(ch);
                            }
                        }
                        segments.push(PathSegment::Key(key));
                    }
                    _ => {
                        let inner: String = chars.by_ref().take_while(|c| *c != ']').collect();
                        let inner = inner.trim();
                        match inner.parse::<usize>() {
                            Ok(idx) => segments.push(PathSegment::Index(idx)),
                            Err(_) if !inner.is_empty() => {
                                segments.push(PathSegment::Key(inner.to_string()))
                            }
                            Err(_) => {}
                        }
                    }
                }
            }
            _ => current.push(ch),
        }
    }
    flush(&mut current, &mut segments);

    segments
}

/// Path-based read/write over a tree-shaped document.
pub trait DocumentStore {
    /// Value at `path`; fails when any segment is missing.
    fn get(&self, path: &[PathSegment]) -> Result<&Value>;

    /// Replace the value at `path`, creating intermediate mappings.
    fn set(&mut self, path: &[PathSegment], value: Value) -> Result<()>;

    /// First value stored under `key` anywhere in the document, depth-first
    /// in document order.
    fn find_first(&self, key: &str) -> Option<&Value>;

    /// Scalar at `path` rendered as a string, if present and scalar.
    fn get_string(&self, path: &[PathSegment]) -> Option<String> {
        self.get(path).ok().and_then(scalar_to_string)
    }
}

/// Render a scalar YAML value as a string. Mappings, sequences and nulls
/// yield `None`.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}
