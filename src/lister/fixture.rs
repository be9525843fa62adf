//! Offline listings from a YAML fixture
//!
//! Used by `--test` runs. The fixture maps auth URLs to what the backend
//! would have answered:
//!
//! ```yaml
//! projects:
//!   https://keystone.a:5000/v3:
//!     - name: demo
//!       id: 8f14e45f
//! regions:
//!   https://keystone.a:5000/v3: [RegionOne]
//! fail_once:
//!   - https://keystone.a:5000/v3
//! ```
//!
//! An auth URL missing from `projects` fails the listing. URLs under
//! `fail_once` fail their first project listing and succeed afterwards.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use log::debug;
use serde::Deserialize;

use super::{ProjectLister, RegionLister};
use crate::error::{Error, Result};
use crate::expand::ProjectRecord;
use crate::params::ConnectionParams;

#[derive(Debug, Default, Deserialize)]
struct Fixture {
    #[serde(default)]
    projects: BTreeMap<String, Vec<ProjectRecord>>,
    #[serde(default)]
    regions: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    fail_once: BTreeSet<String>,
}

/// Answers listings from a fixture document.
#[derive(Debug, Default)]
pub struct FixtureLister {
    fixture: Fixture,
    failed: RefCell<BTreeSet<String>>,
}

impl FixtureLister {
    pub fn parse(content: &str) -> Result<Self> {
        Ok(Self {
            fixture: serde_yaml::from_str(content)?,
            failed: RefCell::default(),
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading listing fixture {}", path.display());
        Self::parse(&std::fs::read_to_string(path)?)
    }
}

impl ProjectLister for FixtureLister {
    fn list_projects(&self, params: &ConnectionParams) -> Result<Vec<ProjectRecord>> {
        let url = &params.auth_url;
        if self.fixture.fail_once.contains(url) && self.failed.borrow_mut().insert(url.clone()) {
            return Err(Error::ExternalCommand {
                command: "fixture project list".to_string(),
                stderr: format!("transient failure for {}", url),
            });
        }
        self.fixture
            .projects
            .get(url)
            .cloned()
            .ok_or_else(|| Error::ExternalCommand {
                command: "fixture project list".to_string(),
                stderr: format!("no projects configured for {}", url),
            })
    }
}

impl RegionLister for FixtureLister {
    fn list_regions(&self, params: &ConnectionParams) -> Result<Vec<String>> {
        self.fixture
            .regions
            .get(&params.auth_url)
            .cloned()
            .ok_or_else(|| Error::RegionList {
                message: format!("no regions configured for {}", params.auth_url),
            })
    }
}
