//! YAML-backed document store
//!
//! [`YamlDocument`] wraps a `serde_yaml::Value` and implements
//! [`DocumentStore`] on top of it. Mappings keep insertion order, which is
//! what makes generated clouds files reproducible from run to run.

use std::fs;
use std::path::Path;

use log::debug;
use serde_yaml::{Mapping, Value};

use super::{display_path, DocumentStore, PathSegment};
use crate::error::{Error, Result};

/// A parsed YAML document.
#[derive(Debug, Clone, PartialEq)]
pub struct YamlDocument {
    root: Value,
}

impl Default for YamlDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl YamlDocument {
    /// An empty document whose root is a mapping.
    pub fn new() -> Self {
        Self {
            root: Value::Mapping(Mapping::new()),
        }
    }

    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    /// Parse a document from a string. An empty input yields an empty mapping.
    pub fn parse(content: &str) -> Result<Self> {
        let root: Value = serde_yaml::from_str(content)?;
        let root = if root.is_null() {
            Value::Mapping(Mapping::new())
        } else {
            root
        };
        Ok(Self { root })
    }

    /// Read and parse a document from disk.
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Reading document {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Serialize to YAML, always ending with a newline.
    pub fn to_yaml_string(&self) -> Result<String> {
        let mut out = serde_yaml::to_string(&self.root)?;
        if !out.ends_with('\n') {
            out.push('\n');
        }
        Ok(out)
    }

    /// Write the serialized document to `path`, creating parent directories.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, self.to_yaml_string()?)?;
        Ok(())
    }
}

/// Walk `path` from `value`, creating mappings and padding sequences as
/// needed. Fails when a scalar sits where a container is required.
fn navigate_mut<'a>(value: &'a mut Value, path: &[PathSegment]) -> Result<&'a mut Value> {
    let mut current = value;
    for (depth, segment) in path.iter().enumerate() {
        match segment {
            PathSegment::Key(key) => {
                if current.is_null() {
                    *current = Value::Mapping(Mapping::new());
                }
                let map = match current {
                    Value::Mapping(map) => map,
                    other => {
                        return Err(Error::Document {
                            path: display_path(&path[..=depth]),
                            message: format!(
                                "expected mapping while navigating to '{}', found {}",
                                key,
                                type_name(other)
                            ),
                        })
                    }
                };
                current = map.entry(Value::String(key.clone())).or_insert(Value::Null);
            }
            PathSegment::Index(idx) => {
                if current.is_null() {
                    *current = Value::Sequence(Vec::new());
                }
                let seq = match current {
                    Value::Sequence(seq) => seq,
                    other => {
                        return Err(Error::Document {
                            path: display_path(&path[..=depth]),
                            message: format!(
                                "expected sequence while navigating to index {}, found {}",
                                idx,
                                type_name(other)
                            ),
                        })
                    }
                };
                if seq.len() <= *idx {
                    seq.resize(*idx + 1, Value::Null);
                }
                current = &mut seq[*idx];
            }
        }
    }
    Ok(current)
}

fn find_first_in<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Mapping(map) => {
            if let Some(found) = map.get(key) {
                return Some(found);
            }
            map.values().find_map(|child| find_first_in(child, key))
        }
        Value::Sequence(seq) => seq.iter().find_map(|child| find_first_in(child, key)),
        Value::Tagged(tagged) => find_first_in(&tagged.value, key),
        _ => None,
    }
}

/// Human-readable type name for a YAML value.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "Null",
        Value::Bool(_) => "Bool",
        Value::Number(_) => "Number",
        Value::String(_) => "String",
        Value::Sequence(_) => "Sequence",
        Value::Mapping(_) => "Mapping",
        Value::Tagged(_) => "Tagged",
    }
}

impl DocumentStore for YamlDocument {
    fn get(&self, path: &[PathSegment]) -> Result<&Value> {
        let mut current = &self.root;
        for (depth, segment) in path.iter().enumerate() {
            let next = match segment {
                PathSegment::Key(key) => current.as_mapping().and_then(|map| map.get(key.as_str())),
                PathSegment::Index(idx) => current.as_sequence().and_then(|seq| seq.get(*idx)),
            };
            current = next.ok_or_else(|| Error::Document {
                path: display_path(&path[..=depth]),
                message: "no such node".to_string(),
            })?;
        }
        Ok(current)
    }

    fn set(&mut self, path: &[PathSegment], value: Value) -> Result<()> {
        let target = navigate_mut(&mut self.root, path)?;
        *target = value;
        Ok(())
    }

    fn find_first(&self, key: &str) -> Option<&Value> {
        find_first_in(&self.root, key)
    }
}
