//! # Error Handling
//!
//! This module defines the centralized error type for `clouds-gen`. It uses
//! `thiserror` to describe every failure the generator can run into, from a
//! single unreadable source file to a run that produced nothing at all.
//!
//! Errors fall into three groups:
//!
//! - **Fatal**: the run stops before any output is written
//!   (`MissingAuthUrl` in discovery mode, `CredentialListMismatch`,
//!   `NoSourcesProcessed`, `Scratch`).
//! - **Per-source**: the current source is skipped and the run continues
//!   (`SourceNotFound`, `NoCloudEntries`, `ProjectList`, `ProjectNotFound`,
//!   `Document`).
//! - **Best-effort**: logged and ignored (`RegionList`).
//!
//! Fatal errors carry their process exit code via [`Error::exit_code`].

use std::path::PathBuf;

use thiserror::Error;

use crate::exit_codes;

/// Main error type for clouds-gen operations
#[derive(Error, Debug)]
pub enum Error {
    /// No identity endpoint could be resolved for a source.
    #[error("No auth_url could be resolved for {source_name}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    MissingAuthUrl {
        source_name: String,
        /// Optional hint for how to supply the value
        hint: Option<String>,
    },

    /// `--username` and `--password` were both given but not pairwise.
    #[error("Got {usernames} username(s) but {passwords} password(s); they must be supplied in pairs")]
    CredentialListMismatch { usernames: usize, passwords: usize },

    /// A project name could not be mapped back to its ID.
    ///
    /// Skips the current source only.
    #[error("Project not found in listing: {name}")]
    ProjectNotFound { name: String },

    /// The project listing failed or came back empty.
    ///
    /// In merge mode this skips the source. In discovery mode it is fatal
    /// once the single retry has also failed.
    #[error("Project listing failed for {source_name}: {message}")]
    ProjectList {
        /// Input file path, or `environment` in discovery mode
        source_name: String,
        message: String,
    },

    /// The region listing failed.
    #[error("Region listing failed: {message}")]
    RegionList { message: String },

    /// An external command could not be run or exited non-zero.
    #[error("Command failed: {command} - {stderr}")]
    ExternalCommand {
        /// The command line that was run
        command: String,
        /// Trimmed stderr of the command, or the spawn error
        stderr: String,
    },

    /// An input file does not exist.
    #[error("Source file not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    /// An input document has no usable entry under `clouds`.
    #[error("No cloud entries found in {}", path.display())]
    NoCloudEntries { path: PathBuf },

    /// A document path lookup or update failed.
    #[error("Document error at '{path}': {message}")]
    Document { path: String, message: String },

    /// The scratch working directory could not be created or entered.
    #[error("Scratch directory error: {message}")]
    Scratch { message: String },

    /// Every source failed, so there is nothing to write.
    ///
    /// The output target is left untouched.
    #[error("No sources could be processed ({failed} failed); no output written")]
    NoSourcesProcessed { failed: usize },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON parsing error, wrapped from `serde_json::Error`.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Process exit code for an error that terminates the run.
    ///
    /// # Returns
    /// - [`exit_codes::UNRESOLVED_ENVIRONMENT`] for `MissingAuthUrl`
    /// - [`exit_codes::SCRATCH_DIR`] for `Scratch`
    /// - [`exit_codes::FAILURE`] for everything else
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::MissingAuthUrl { .. } => exit_codes::UNRESOLVED_ENVIRONMENT,
            Error::Scratch { .. } => exit_codes::SCRATCH_DIR,
            _ => exit_codes::FAILURE,
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
