//! Project expansion
//!
//! Turns one source's connection parameters and its project listing into
//! clouds entries, one per project. Entry keys are namespaced as
//! `<namespace>-<project name>` so several sources can share one output
//! file; the entry itself always records the original project name.
//!
//! Two sources that produce the same namespace and project name collide on
//! the same key. The later source wins; no warning is emitted.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::params::ConnectionParams;

/// One project as returned by a project listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub name: String,
    pub id: String,
}

impl ProjectRecord {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}

/// The `auth` block of a clouds entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthBlock {
    pub auth_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub user_domain_name: String,
    pub project_id: String,
    pub project_name: String,
}

/// One named profile under the top-level `clouds` map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputEntry {
    pub auth: AuthBlock,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_name: Option<String>,
    pub interface: String,
    pub identity_api_version: u32,
}

/// Prefix for entry keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Namespace {
    /// Given explicitly (`--name`, or the discovery tag); used as is.
    Verbatim(String),
    /// Derived from an input file name; `.` and `-` become `_`.
    FromFilename(String),
}

impl Namespace {
    /// Namespace for an input file: its name without the final extension.
    pub fn from_path(path: &Path) -> Self {
        let stem = path
            .file_stem()
            .or_else(|| path.file_name())
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Namespace::FromFilename(stem)
    }

    /// The prefix as it appears in entry keys.
    pub fn prefix(&self) -> String {
        match self {
            Namespace::Verbatim(name) => name.clone(),
            Namespace::FromFilename(name) => name.replace(['.', '-'], "_"),
        }
    }

    /// Entry key for a project.
    pub fn key_for(&self, project_name: &str) -> String {
        format!("{}-{}", self.prefix(), project_name)
    }
}

/// ID of the first project in `projects` named `name`.
pub fn lookup_project_id<'a>(projects: &'a [ProjectRecord], name: &str) -> Option<&'a str> {
    projects
        .iter()
        .find(|p| p.name == name)
        .map(|p| p.id.as_str())
}

/// Build the entry for one project.
pub fn build_entry(
    params: &ConnectionParams,
    project_id: &str,
    project_name: &str,
    include_credentials: bool,
) -> OutputEntry {
    let (username, password) = if include_credentials {
        (params.username.clone(), params.password.clone())
    } else {
        (None, None)
    };

    OutputEntry {
        auth: AuthBlock {
            auth_url: params.auth_url.clone(),
            username,
            password,
            user_domain_name: params.user_domain_name.clone(),
            project_id: project_id.to_string(),
            project_name: project_name.to_string(),
        },
        region_name: params.region_name.clone(),
        interface: params.interface.clone(),
        identity_api_version: params.identity_api_version,
    }
}

/// Expand a project listing into keyed entries, sorted by project name.
///
/// Fails with [`Error::ProjectNotFound`] when a name cannot be mapped back
/// to an ID; the caller treats that as fatal for the source only.
pub fn expand(
    params: &ConnectionParams,
    namespace: &Namespace,
    projects: &[ProjectRecord],
    include_credentials: bool,
) -> Result<Vec<(String, OutputEntry)>> {
    let mut names: Vec<&str> = projects.iter().map(|p| p.name.as_str()).collect();
    names.sort();

    names
        .into_iter()
        .map(|name| -> Result<(String, OutputEntry)> {
            let id = lookup_project_id(projects, name).ok_or_else(|| Error::ProjectNotFound {
                name: name.to_string(),
            })?;
            Ok((
                namespace.key_for(name),
                build_entry(params, id, name, include_credentials),
            ))
        })
        .collect()
}
