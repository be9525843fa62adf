//! Listing through the `openstack` command-line client
//!
//! Each call writes a clouds file holding exactly one cloud, built from the
//! source's parameters, and points the client at it with
//! `OS_CLIENT_CONFIG_FILE`. Every inherited `OS_*` variable is removed from
//! the child environment so the invoking shell cannot change which cloud is
//! queried.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;
use serde::{Deserialize, Serialize};

use super::{ProjectLister, RegionLister};
use crate::error::{Error, Result};
use crate::expand::ProjectRecord;
use crate::params::ConnectionParams;

/// Name of the single cloud in the per-call clouds file.
const CLOUD_NAME: &str = "clouds-gen-source";

/// File name of the per-call clouds file inside the work directory.
const CLOUDS_FILE: &str = "clouds-gen-source.yaml";

#[derive(Serialize)]
struct ListingAuth<'a> {
    auth_url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
    user_domain_name: &'a str,
}

#[derive(Serialize)]
struct ListingCloud<'a> {
    auth: ListingAuth<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    region_name: Option<&'a str>,
    interface: &'a str,
    identity_api_version: u32,
}

#[derive(Serialize)]
struct ListingFile<'a> {
    clouds: std::collections::BTreeMap<&'static str, ListingCloud<'a>>,
}

#[derive(Deserialize)]
struct ProjectRow {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Name")]
    name: String,
}

#[derive(Deserialize)]
struct RegionRow {
    #[serde(rename = "Region")]
    region: String,
}

/// Runs `openstack` for project and region listings.
#[derive(Debug, Clone)]
pub struct OpenStackCli {
    program: String,
    work_dir: PathBuf,
}

impl OpenStackCli {
    /// Use the `openstack` binary on `PATH`, writing per-call files into
    /// `work_dir`.
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: "openstack".to_string(),
            work_dir: work_dir.into(),
        }
    }

    /// Use a different client binary.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Write the single-cloud clouds file for `params`.
    fn write_clouds_file(&self, params: &ConnectionParams) -> Result<PathBuf> {
        let cloud = ListingCloud {
            auth: ListingAuth {
                auth_url: &params.auth_url,
                username: params.username.as_deref(),
                password: params.password.as_deref(),
                user_domain_name: &params.user_domain_name,
            },
            region_name: params.region_name.as_deref(),
            interface: &params.interface,
            identity_api_version: params.identity_api_version,
        };
        let file = ListingFile {
            clouds: [(CLOUD_NAME, cloud)].into_iter().collect(),
        };

        let path = self.work_dir.join(CLOUDS_FILE);
        std::fs::write(&path, serde_yaml::to_string(&file)?)?;
        Ok(path)
    }

    /// Run the client with `args` against `params` and return stdout.
    fn run(&self, params: &ConnectionParams, args: &[&str]) -> Result<String> {
        let clouds_file = self.write_clouds_file(params)?;
        let command_line = format!("{} {}", self.program, args.join(" "));
        debug!("Running '{}' for {}", command_line, params.auth_url);

        let mut command = Command::new(&self.program);
        command
            .arg("--os-cloud")
            .arg(CLOUD_NAME)
            .args(args)
            .current_dir(&self.work_dir);
        for (key, _) in env::vars_os() {
            if key.to_string_lossy().starts_with("OS_") {
                command.env_remove(&key);
            }
        }
        command.env("OS_CLIENT_CONFIG_FILE", &clouds_file);

        let output = command.output().map_err(|e| Error::ExternalCommand {
            command: command_line.clone(),
            stderr: e.to_string(),
        });
        remove_quietly(&clouds_file);
        let output = output?;

        if !output.status.success() {
            return Err(Error::ExternalCommand {
                command: command_line,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn remove_quietly(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        debug!("Could not remove {}: {}", path.display(), e);
    }
}

/// Parse `openstack project list -f json` output.
pub fn parse_project_rows(json: &str) -> Result<Vec<ProjectRecord>> {
    let rows: Vec<ProjectRow> = serde_json::from_str(json)?;
    Ok(rows
        .into_iter()
        .map(|row| ProjectRecord::new(row.name, row.id))
        .collect())
}

/// Parse `openstack region list -f json` output.
pub fn parse_region_rows(json: &str) -> Result<Vec<String>> {
    let rows: Vec<RegionRow> = serde_json::from_str(json)?;
    Ok(rows.into_iter().map(|row| row.region).collect())
}

impl ProjectLister for OpenStackCli {
    fn list_projects(&self, params: &ConnectionParams) -> Result<Vec<ProjectRecord>> {
        let stdout = self.run(params, &["project", "list", "--my-projects", "-f", "json"])?;
        parse_project_rows(&stdout)
    }
}

impl RegionLister for OpenStackCli {
    fn list_regions(&self, params: &ConnectionParams) -> Result<Vec<String>> {
        let stdout = self
            .run(params, &["region", "list", "-f", "json"])
            .map_err(|e| Error::RegionList {
                message: e.to_string(),
            })?;
        parse_region_rows(&stdout)
    }
}
