//! Merge engine
//!
//! Folds the entries produced for each source into one output document and
//! keeps track of how every source fared. Sources are handled strictly in
//! order; a failing source is recorded and skipped, never fatal on its own.
//!
//! ## Merge Rules
//!
//! - Entries are inserted under the top-level `clouds` map.
//! - An entry replaces any previous entry with the same key wholesale; fields
//!   are never merged between entries.
//! - Nothing is ever removed from the document.
//!
//! The run fails only when no source succeeded. In that case the document is
//! discarded and nothing is written.

pub mod outcome;

use std::collections::BTreeSet;

use log::{debug, info, warn};

use crate::document::{DocumentStore, PathSegment, YamlDocument};
use crate::error::{Error, Result};
use crate::expand::OutputEntry;

pub use outcome::{RunSummary, SourceOutcome};

/// Top-level key of a clouds document.
pub const CLOUDS_KEY: &str = "clouds";

/// The clouds document being assembled for this run.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputDocument {
    document: YamlDocument,
    keys: Vec<String>,
}

impl Default for OutputDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputDocument {
    /// A document with an empty `clouds` map.
    pub fn new() -> Self {
        let mut root = serde_yaml::Mapping::new();
        root.insert(
            serde_yaml::Value::String(CLOUDS_KEY.to_string()),
            serde_yaml::Value::Mapping(serde_yaml::Mapping::new()),
        );
        Self {
            document: YamlDocument::from_value(serde_yaml::Value::Mapping(root)),
            keys: Vec::new(),
        }
    }

    /// Insert or replace the entry at `key`.
    pub fn insert(&mut self, key: &str, entry: &OutputEntry) -> Result<()> {
        let value = serde_yaml::to_value(entry)?;
        let replaced = self.keys.iter().any(|k| k == key);
        self.document
            .set(&[PathSegment::key(CLOUDS_KEY), PathSegment::key(key)], value)?;
        if replaced {
            debug!("Replaced existing entry '{}'", key);
        } else {
            self.keys.push(key.to_string());
        }
        Ok(())
    }

    /// Entry stored at `key`, if any.
    pub fn get(&self, key: &str) -> Option<OutputEntry> {
        self.document
            .get(&[PathSegment::key(CLOUDS_KEY), PathSegment::key(key)])
            .ok()
            .and_then(|value| serde_yaml::from_value(value.clone()).ok())
    }

    /// Entry keys in insertion order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The underlying YAML document.
    pub fn document(&self) -> &YamlDocument {
        &self.document
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        self.document.to_yaml_string()
    }
}

/// Insert every entry into `document`, later entries winning on key
/// collisions.
///
/// # Returns
///
/// The number of distinct keys written. Entries in `entries` that share a
/// key count once.
pub fn merge(document: &mut OutputDocument, entries: &[(String, OutputEntry)]) -> Result<usize> {
    let mut written = BTreeSet::new();
    for (key, entry) in entries {
        document.insert(key, entry)?;
        written.insert(key.as_str());
    }
    Ok(written.len())
}

/// Accumulates entries and per-source outcomes across a run.
#[derive(Debug, Default)]
pub struct MergeEngine {
    document: OutputDocument,
    summary: RunSummary,
}

impl MergeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the result of processing one source.
    ///
    /// Successful results are merged into the document. Errors, and
    /// successful results with no entries, are recorded as skipped.
    pub fn record(
        &mut self,
        source: &str,
        result: Result<Vec<(String, OutputEntry)>>,
    ) -> &SourceOutcome {
        let outcome = match result {
            Ok(entries) if entries.is_empty() => SourceOutcome::SkippedProjectListFailure {
                message: "no projects returned".to_string(),
            },
            Ok(entries) => match merge(&mut self.document, &entries) {
                Ok(count) => SourceOutcome::Success { entries: count },
                Err(e) => SourceOutcome::SkippedInvalidSource {
                    message: e.to_string(),
                },
            },
            Err(e) => SourceOutcome::from_error(&e),
        };

        match &outcome {
            SourceOutcome::Success { entries } => {
                info!("{}: added {} cloud entries", source, entries)
            }
            skipped => warn!("{}: skipped ({})", source, skipped),
        }

        self.summary.push(source, outcome)
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Close the run. Fails with [`Error::NoSourcesProcessed`] when every
    /// source was skipped.
    pub fn finish(self) -> Result<(OutputDocument, RunSummary)> {
        if self.summary.succeeded() == 0 {
            return Err(Error::NoSourcesProcessed {
                failed: self.summary.failed(),
            });
        }
        Ok((self.document, self.summary))
    }
}
