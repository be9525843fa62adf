//! CLI argument parsing and run dispatch

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn, LevelFilter};

use clouds_gen::assignment::CliAssignments;
use clouds_gen::defaults;
use clouds_gen::error::Error;
use clouds_gen::exit_codes;
use clouds_gen::expand::ProjectRecord;
use clouds_gen::interrupt;
use clouds_gen::lister::{FixtureLister, OpenStackCli, ProjectLister, RegionLister};
use clouds_gen::modes::discovery::{self, DiscoveryInputs};
use clouds_gen::modes::merge::{self, MergeOptions};
use clouds_gen::modes::RunOutput;
use clouds_gen::output::{OutputConfig, Reporter};
use clouds_gen::params::{ConnectionParams, ParamValues};
use clouds_gen::scratch::{Backup, ScratchDir};
use clouds_gen::write::{self, OutputTarget};

/// Generate a clouds.yaml with one profile per accessible project
///
/// With FILES, every file's first cloud is expanded into one profile per
/// project, keyed `<name>-<project>`. Without FILES, the cloud described by
/// the flags and `OS_*` environment variables is expanded under `openstack-`.
#[derive(Parser, Debug)]
#[command(name = "clouds-gen")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Existing clouds files to merge
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,

    /// Identity endpoint (discovery mode)
    #[arg(short, long, value_name = "URL", env = "OS_AUTH_URL")]
    auth_url: Option<String>,

    /// User domain (discovery mode)
    #[arg(long, value_name = "DOMAIN", env = "OS_USER_DOMAIN_NAME")]
    user_domain_name: Option<String>,

    /// Region; detected from the identity service when unset (discovery mode)
    #[arg(long, value_name = "REGION", env = "OS_REGION_NAME")]
    region_name: Option<String>,

    /// Endpoint interface (discovery mode)
    #[arg(long, value_name = "INTERFACE", env = "OS_INTERFACE")]
    interface: Option<String>,

    /// Identity API version (discovery mode)
    #[arg(long, value_name = "VERSION", env = "OS_IDENTITY_API_VERSION")]
    identity_api_version: Option<String>,

    /// Name prefix for the matching input file; repeatable
    #[arg(short, long = "name", value_name = "NAME")]
    names: Vec<String>,

    /// Username for the matching input file; repeatable
    #[arg(short, long = "username", value_name = "USER")]
    usernames: Vec<String>,

    /// Password for the matching input file; repeatable
    #[arg(short, long = "password", value_name = "PASS")]
    passwords: Vec<String>,

    /// Write to the default clouds file
    #[arg(short, long, conflicts_with = "output")]
    inplace: bool,

    /// Write to PATH instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Clouds file scanned for values missing in discovery mode
    #[arg(long, value_name = "PATH")]
    fallback_file: Option<PathBuf>,

    /// Leave usernames and passwords out of the output
    #[arg(long)]
    no_credentials: bool,

    /// Answer listings from a fixture file instead of the openstack client
    #[arg(short, long)]
    test: bool,

    /// Fixture file used with --test
    #[arg(long, value_name = "PATH", env = "CLOUDS_GEN_FIXTURE")]
    fixture: Option<PathBuf>,

    /// Show detailed progress information
    #[arg(short, long)]
    verbose: bool,

    /// Colorize output (always, never, auto)
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

/// The listing backend picked for this run.
enum Backend {
    OpenStack(OpenStackCli),
    Fixture(FixtureLister),
}

impl ProjectLister for Backend {
    fn list_projects(
        &self,
        params: &ConnectionParams,
    ) -> clouds_gen::error::Result<Vec<ProjectRecord>> {
        match self {
            Backend::OpenStack(cli) => cli.list_projects(params),
            Backend::Fixture(fixture) => fixture.list_projects(params),
        }
    }
}

impl RegionLister for Backend {
    fn list_regions(&self, params: &ConnectionParams) -> clouds_gen::error::Result<Vec<String>> {
        match self {
            Backend::OpenStack(cli) => cli.list_regions(params),
            Backend::Fixture(fixture) => fixture.list_regions(params),
        }
    }
}

impl Cli {
    /// Run and return the process exit code.
    pub fn execute(self) -> i32 {
        self.init_logging();
        if let Err(e) = interrupt::install_handler() {
            warn!("Could not install the interrupt handler: {}", e);
        }
        let reporter = Reporter::new(OutputConfig::from_env_and_flag(&self.color));

        match self.run(&reporter) {
            Ok(()) => exit_codes::SUCCESS,
            Err(e) => {
                reporter.error(&format!("{:#}", e));
                exit_code_for(&e)
            }
        }
    }

    fn init_logging(&self) {
        let level = if self.verbose {
            LevelFilter::Debug
        } else {
            self.log_level.parse().unwrap_or(LevelFilter::Warn)
        };
        let _ = env_logger::Builder::new()
            .filter_level(level)
            .parse_default_env()
            .format_timestamp(None)
            .try_init();
    }

    fn output_target(&self) -> Result<OutputTarget> {
        if self.inplace {
            return Ok(OutputTarget::File(defaults::default_clouds_file()));
        }
        match &self.output {
            Some(path) => Ok(OutputTarget::File(absolute(path)?)),
            None => Ok(OutputTarget::Stdout),
        }
    }

    fn discovery_values(&self) -> ParamValues {
        ParamValues {
            auth_url: self.auth_url.clone(),
            username: self
                .usernames
                .first()
                .cloned()
                .or_else(|| env::var("OS_USERNAME").ok()),
            password: self
                .passwords
                .first()
                .cloned()
                .or_else(|| env::var("OS_PASSWORD").ok()),
            user_domain_name: self.user_domain_name.clone(),
            region_name: self.region_name.clone(),
            interface: self.interface.clone(),
            identity_api_version: self.identity_api_version.clone(),
        }
    }

    fn has_discovery_flags(&self) -> bool {
        self.auth_url.is_some()
            || self.user_domain_name.is_some()
            || self.region_name.is_some()
            || self.interface.is_some()
            || self.identity_api_version.is_some()
    }

    fn backend(&self, scratch: &ScratchDir, fixture: Option<&Path>) -> Result<Backend> {
        if !self.test {
            return Ok(Backend::OpenStack(OpenStackCli::new(scratch.path())));
        }
        let fixture =
            fixture.context("--test needs a fixture file (--fixture or CLOUDS_GEN_FIXTURE)")?;
        let lister = FixtureLister::from_file(fixture)
            .with_context(|| format!("failed to load fixture {}", fixture.display()))?;
        Ok(Backend::Fixture(lister))
    }

    fn run(&self, reporter: &Reporter) -> Result<()> {
        let assignments = CliAssignments::new(
            self.usernames.clone(),
            self.passwords.clone(),
            self.names.clone(),
        )?;

        // Relative paths must be resolved before the working directory moves.
        let target = self.output_target()?;
        let inputs = self
            .files
            .iter()
            .map(|path| absolute(path))
            .collect::<Result<Vec<_>>>()?;
        let fixture = self.fixture.as_deref().map(absolute).transpose()?;
        let fallback_file = match &self.fallback_file {
            Some(path) => absolute(path)?,
            None => defaults::default_clouds_file(),
        };

        let scratch = ScratchDir::enter()?;
        let backend = self.backend(&scratch, fixture.as_deref())?;

        let (output, backup) = if inputs.is_empty() {
            let inputs = DiscoveryInputs {
                values: self.discovery_values(),
                fallback_file: Some(fallback_file),
                default_output: Some(defaults::default_clouds_file()),
                no_credentials: self.no_credentials,
            };
            let result = discovery::run(&inputs, &backend, &backend)?;
            (result.output, result.backup)
        } else {
            if self.has_discovery_flags() {
                info!("Connection flags and OS_* values are ignored when merging files");
            }
            if assignments.credentials_active() {
                info!("Command-line credentials replace those of every input file");
            }
            let options = MergeOptions {
                no_credentials: self.no_credentials,
            };
            (merge::run(&inputs, &assignments, &options, &backend)?, None)
        };

        self.finish(output, backup, &target, reporter)?;
        drop(scratch);
        Ok(())
    }

    fn finish(
        &self,
        output: RunOutput,
        backup: Option<Backup>,
        target: &OutputTarget,
        reporter: &Reporter,
    ) -> Result<()> {
        write::execute(&output.document, target)?;
        reporter.summary(&output.summary);

        if let Some(backup) = backup {
            if target.is_file(backup.original()) {
                let kept = backup.keep();
                reporter.warning(&format!("Previous clouds file kept at {}", kept.display()));
            } else {
                backup.restore()?;
                debug!("Restored the default clouds file");
            }
        }

        reporter.success(&format!(
            "Wrote {} cloud entries to {}",
            output.document.len(),
            target
        ));
        Ok(())
    }
}

/// Exit code for a failed run: the library's code when the error came from
/// `clouds_gen`, else a general failure.
fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<Error>()
        .map(Error::exit_code)
        .unwrap_or(exit_codes::FAILURE)
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).with_context(|| format!("invalid path {}", path.display()))
}
