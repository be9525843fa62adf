//! Merge mode: combine several clouds files into one.
//!
//! For every input file, in order:
//!
//! 1. Read the first entry under `clouds`.
//! 2. Overlay the command-line username, password and name for this index.
//! 3. List the source's projects.
//! 4. Expand the projects into entries namespaced by the name or file stem.
//!
//! A failure in any step skips the file and moves on to the next one.

use std::path::{Path, PathBuf};

use log::{debug, info};

use super::RunOutput;
use crate::assignment::CliAssignments;
use crate::document::{PathSegment, YamlDocument};
use crate::error::{Error, Result};
use crate::expand::{expand, Namespace, OutputEntry};
use crate::lister::ProjectLister;
use crate::merge::MergeEngine;
use crate::params::{first_cloud_name, resolve, values_from_entry, ParamValues};

/// Switches that apply to every source.
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    /// Never write usernames or passwords into the output.
    pub no_credentials: bool,
}

/// Label used for a source in logs and the summary.
fn source_label(path: &Path) -> String {
    path.display().to_string()
}

/// Turn one input file into keyed entries.
pub fn process_source(
    path: &Path,
    index: usize,
    assignments: &CliAssignments,
    options: &MergeOptions,
    lister: &dyn ProjectLister,
) -> Result<Vec<(String, OutputEntry)>> {
    let label = source_label(path);
    if !path.is_file() {
        return Err(Error::SourceNotFound {
            path: path.to_path_buf(),
        });
    }

    let document = YamlDocument::from_file(path)?;
    let cloud = first_cloud_name(&document).ok_or_else(|| Error::NoCloudEntries {
        path: path.to_path_buf(),
    })?;
    debug!("{}: using cloud entry '{}'", label, cloud);

    let entry_path = [PathSegment::key("clouds"), PathSegment::key(cloud)];
    let source_values = values_from_entry(&document, &entry_path);

    let assignment = assignments.resolve_for_index(index);
    let overrides = ParamValues {
        username: assignment.username,
        password: assignment.password,
        ..Default::default()
    };
    let params = resolve(overrides, source_values, &label)?;

    let namespace = match assignment.name {
        Some(name) => Namespace::Verbatim(name),
        None => Namespace::from_path(path),
    };

    let projects = lister
        .list_projects(&params)
        .map_err(|e| Error::ProjectList {
            source_name: label.clone(),
            message: e.to_string(),
        })?;
    if projects.is_empty() {
        return Err(Error::ProjectList {
            source_name: label,
            message: "no projects returned".to_string(),
        });
    }

    let include_credentials = params.has_credentials() && !options.no_credentials;
    expand(&params, &namespace, &projects, include_credentials)
}

/// Process every input file in order and merge the results.
pub fn run(
    inputs: &[PathBuf],
    assignments: &CliAssignments,
    options: &MergeOptions,
    lister: &dyn ProjectLister,
) -> Result<RunOutput> {
    let mut engine = MergeEngine::new();

    for (index, path) in inputs.iter().enumerate() {
        info!("Processing source {} of {}: {}", index + 1, inputs.len(), path.display());
        let result = process_source(path, index, assignments, options, lister);
        engine.record(&source_label(path), result);
    }

    let (document, summary) = engine.finish()?;
    Ok(RunOutput { document, summary })
}
