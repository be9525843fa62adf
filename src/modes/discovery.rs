//! Discovery mode: one live source, no input files.
//!
//! Parameters resolve in three tiers: command-line flags, then `OS_*`
//! environment variables (both already folded into
//! [`DiscoveryInputs::values`] by the caller), then a best-effort scan of a
//! previously generated clouds file for the first node carrying each key.
//!
//! A missing region is filled from the first region the identity service
//! reports. If listing projects fails, the default clouds file is moved
//! aside and the listing is retried once; a second failure ends the run.

use std::path::PathBuf;

use log::{debug, info, warn};

use super::RunOutput;
use crate::defaults;
use crate::document::YamlDocument;
use crate::error::{Error, Result};
use crate::expand::{expand, Namespace, ProjectRecord};
use crate::lister::{ProjectLister, RegionLister};
use crate::merge::MergeEngine;
use crate::params::{resolve, values_by_scan, ConnectionParams, ParamValues};
use crate::scratch::Backup;

/// Label for the single discovery-mode source.
pub const SOURCE_LABEL: &str = "environment";

/// Everything discovery mode needs from the caller.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryInputs {
    /// Values from flags and environment variables.
    pub values: ParamValues,
    /// Legacy clouds file scanned for missing values.
    pub fallback_file: Option<PathBuf>,
    /// File moved aside before the retry.
    pub default_output: Option<PathBuf>,
    pub no_credentials: bool,
}

/// Result of a discovery run. `backup` holds the moved-aside default file,
/// if the retry path was taken; dropping it restores the file.
#[derive(Debug)]
pub struct DiscoveryOutput {
    pub output: RunOutput,
    pub backup: Option<Backup>,
}

/// Values found in the fallback file, or nothing if it cannot be read.
fn fallback_values(path: Option<&PathBuf>) -> ParamValues {
    let Some(path) = path.filter(|p| p.is_file()) else {
        return ParamValues::default();
    };
    match YamlDocument::from_file(path) {
        Ok(document) => {
            debug!("Scanning {} for fallback values", path.display());
            values_by_scan(&document)
        }
        Err(e) => {
            debug!("Ignoring fallback file {}: {}", path.display(), e);
            ParamValues::default()
        }
    }
}

/// Resolve the discovery-mode connection parameters.
pub fn resolve_params(inputs: &DiscoveryInputs) -> Result<ConnectionParams> {
    let fallback = fallback_values(inputs.fallback_file.as_ref());
    resolve(inputs.values.clone(), fallback, SOURCE_LABEL).map_err(|e| match e {
        Error::MissingAuthUrl { source_name, .. } => Error::MissingAuthUrl {
            source_name,
            hint: Some("Set OS_AUTH_URL or pass --auth-url".to_string()),
        },
        other => other,
    })
}

/// Fill in `region_name` from the first listed region, if unset.
pub fn detect_region(params: &mut ConnectionParams, regions: &dyn RegionLister) {
    if params.region_name.is_some() {
        return;
    }
    match regions.list_regions(params) {
        Ok(list) => match list.into_iter().next() {
            Some(region) => {
                info!("Using detected region {}", region);
                params.region_name = Some(region);
            }
            None => debug!("Identity service reported no regions"),
        },
        Err(e) => warn!("Region detection failed, continuing without a region: {}", e),
    }
}

/// List projects, retrying once with the default clouds file moved aside.
fn list_with_retry(
    params: &ConnectionParams,
    inputs: &DiscoveryInputs,
    projects: &dyn ProjectLister,
) -> Result<(Vec<ProjectRecord>, Option<Backup>)> {
    let first_error = match projects.list_projects(params) {
        Ok(list) => return Ok((list, None)),
        Err(e) => e,
    };
    warn!("Project listing failed ({}); retrying once", first_error);

    let backup = match &inputs.default_output {
        Some(path) => Backup::stash(path)?,
        None => None,
    };
    if let Some(backup) = &backup {
        info!(
            "Moved {} to {} for the retry",
            backup.original().display(),
            backup.backup_path().display()
        );
    }

    match projects.list_projects(params) {
        Ok(list) => Ok((list, backup)),
        Err(e) => Err(Error::ProjectList {
            source_name: SOURCE_LABEL.to_string(),
            message: e.to_string(),
        }),
    }
}

/// Run discovery mode end to end.
pub fn run(
    inputs: &DiscoveryInputs,
    projects: &dyn ProjectLister,
    regions: &dyn RegionLister,
) -> Result<DiscoveryOutput> {
    let mut params = resolve_params(inputs)?;
    detect_region(&mut params, regions);

    let (listing, backup) = list_with_retry(&params, inputs, projects)?;

    let include_credentials = params.has_credentials() && !inputs.no_credentials;
    let namespace = Namespace::Verbatim(defaults::DISCOVERY_NAMESPACE.to_string());
    let result = if listing.is_empty() {
        Err(Error::ProjectList {
            source_name: SOURCE_LABEL.to_string(),
            message: "no projects returned".to_string(),
        })
    } else {
        expand(&params, &namespace, &listing, include_credentials)
    };

    let mut engine = MergeEngine::new();
    engine.record(SOURCE_LABEL, result);
    let (document, summary) = engine.finish()?;

    Ok(DiscoveryOutput {
        output: RunOutput { document, summary },
        backup,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lister::{FixtureLister, MockProjectLister, MockRegionLister};
    use std::fs;
    use tempfile::TempDir;

    fn inputs_with_url(url: &str) -> DiscoveryInputs {
        DiscoveryInputs {
            values: ParamValues {
                auth_url: Some(url.to_string()),
                username: Some("admin".to_string()),
                password: Some("secret".to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn no_regions() -> MockRegionLister {
        let mut regions = MockRegionLister::new();
        regions
            .expect_list_regions()
            .returning(|_| Err(Error::RegionList {
                message: "unavailable".to_string(),
            }));
        regions
    }

    #[test]
    fn test_discovery_expands_sorted_projects() {
        let fixture = FixtureLister::parse(
            "projects:\n  https://k:\n    - name: beta\n      id: b\n    - name: alpha\n      id: a\nregions:\n  https://k:\n    - RegionOne\n",
        )
        .unwrap();

        let result = run(&inputs_with_url("https://k"), &fixture, &fixture).unwrap();
        let document = &result.output.document;

        assert_eq!(
            document.keys(),
            &["openstack-alpha".to_string(), "openstack-beta".to_string()]
        );
        let alpha = document.get("openstack-alpha").unwrap();
        assert_eq!(alpha.auth.project_name, "alpha");
        assert_eq!(alpha.auth.project_id, "a");
        assert_eq!(alpha.region_name.as_deref(), Some("RegionOne"));
        assert_eq!(alpha.auth.username.as_deref(), Some("admin"));
        assert!(result.backup.is_none());
    }

    #[test]
    fn test_missing_auth_url_is_fatal_with_hint() {
        let inputs = DiscoveryInputs::default();
        let projects = MockProjectLister::new();
        let err = run(&inputs, &projects, &no_regions()).unwrap_err();
        assert!(matches!(err, Error::MissingAuthUrl { .. }));
        assert!(err.to_string().contains("OS_AUTH_URL"));
        assert_eq!(err.exit_code(), crate::exit_codes::UNRESOLVED_ENVIRONMENT);
    }

    #[test]
    fn test_fallback_file_supplies_missing_values() {
        let dir = TempDir::new().unwrap();
        let fallback = dir.path().join("clouds.yaml");
        fs::write(
            &fallback,
            "clouds:\n  old:\n    auth:\n      auth_url: https://legacy\n      username: olduser\n      password: oldpass\n    region_name: RegionX\n",
        )
        .unwrap();
        let inputs = DiscoveryInputs {
            values: ParamValues {
                username: Some("flaguser".to_string()),
                ..Default::default()
            },
            fallback_file: Some(fallback),
            ..Default::default()
        };

        let params = resolve_params(&inputs).unwrap();
        assert_eq!(params.auth_url, "https://legacy");
        assert_eq!(params.username.as_deref(), Some("flaguser"));
        assert_eq!(params.password.as_deref(), Some("oldpass"));
        assert_eq!(params.region_name.as_deref(), Some("RegionX"));
    }

    #[test]
    fn test_unreadable_fallback_file_is_ignored() {
        let dir = TempDir::new().unwrap();
        let fallback = dir.path().join("clouds.yaml");
        fs::write(&fallback, "clouds: [unclosed").unwrap();
        let mut inputs = inputs_with_url("https://k");
        inputs.fallback_file = Some(fallback);
        assert_eq!(resolve_params(&inputs).unwrap().auth_url, "https://k");
    }

    #[test]
    fn test_explicit_region_skips_detection() {
        let mut params = resolve_params(&inputs_with_url("https://k")).unwrap();
        params.region_name = Some("Mine".to_string());
        let mut regions = MockRegionLister::new();
        regions.expect_list_regions().times(0);
        detect_region(&mut params, &regions);
        assert_eq!(params.region_name.as_deref(), Some("Mine"));
    }

    #[test]
    fn test_region_detection_failure_is_not_fatal() {
        let mut projects = MockProjectLister::new();
        projects
            .expect_list_projects()
            .times(1)
            .returning(|_| Ok(vec![ProjectRecord::new("demo", "1")]));

        let result = run(&inputs_with_url("https://k"), &projects, &no_regions()).unwrap();
        let entry = result.output.document.get("openstack-demo").unwrap();
        assert_eq!(entry.region_name, None);
    }

    #[test]
    fn test_retry_once_with_default_file_moved_aside() {
        let dir = TempDir::new().unwrap();
        let default_file = dir.path().join("clouds.yaml");
        fs::write(&default_file, "clouds: {}\n").unwrap();

        let mut inputs = inputs_with_url("https://k");
        inputs.default_output = Some(default_file.clone());

        let mut projects = MockProjectLister::new();
        let mut calls = 0;
        projects.expect_list_projects().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Err(Error::ExternalCommand {
                    command: "openstack project list".to_string(),
                    stderr: "conflicting cloud".to_string(),
                })
            } else {
                Ok(vec![ProjectRecord::new("demo", "1")])
            }
        });

        let result = run(&inputs, &projects, &no_regions()).unwrap();
        assert_eq!(result.output.document.len(), 1);
        assert!(!default_file.exists());

        drop(result);
        assert!(default_file.exists());
    }

    #[test]
    fn test_second_failure_is_fatal_and_restores_file() {
        let dir = TempDir::new().unwrap();
        let default_file = dir.path().join("clouds.yaml");
        fs::write(&default_file, "clouds: {}\n").unwrap();

        let mut inputs = inputs_with_url("https://k");
        inputs.default_output = Some(default_file.clone());

        let mut projects = MockProjectLister::new();
        projects.expect_list_projects().times(2).returning(|_| {
            Err(Error::ExternalCommand {
                command: "openstack project list".to_string(),
                stderr: "401".to_string(),
            })
        });

        let err = run(&inputs, &projects, &no_regions()).unwrap_err();
        assert!(matches!(err, Error::ProjectList { .. }));
        assert_eq!(err.exit_code(), crate::exit_codes::FAILURE);
        assert!(default_file.exists());
    }

    #[test]
    fn test_empty_listing_fails_run() {
        let mut projects = MockProjectLister::new();
        projects.expect_list_projects().returning(|_| Ok(vec![]));
        let err = run(&inputs_with_url("https://k"), &projects, &no_regions()).unwrap_err();
        assert!(matches!(err, Error::NoSourcesProcessed { failed: 1 }));
    }

    #[test]
    fn test_no_credentials_in_discovery() {
        let mut inputs = inputs_with_url("https://k");
        inputs.no_credentials = true;
        let mut projects = MockProjectLister::new();
        projects
            .expect_list_projects()
            .returning(|_| Ok(vec![ProjectRecord::new("demo", "1")]));

        let result = run(&inputs, &projects, &no_regions()).unwrap();
        let entry = result.output.document.get("openstack-demo").unwrap();
        assert_eq!(entry.auth.username, None);
        assert_eq!(entry.auth.password, None);
    }
}
