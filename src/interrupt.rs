//! Cleanup on interrupt
//!
//! `SIGINT`/`SIGTERM` end the process without running destructors, so the
//! [`ScratchDir`](crate::scratch::ScratchDir) and
//! [`Backup`](crate::scratch::Backup) guards also record what they hold in
//! a process-wide [`CleanupRegistry`]. The handler installed by
//! [`install_handler`] replays that registry and exits with
//! [`exit_codes::INTERRUPTED`].
//!
//! ## Behavior
//!
//! - Every active backup is renamed back over its original file.
//! - The scratch directory, if any, is removed.
//! - Guards deregister themselves when they clean up normally, so the
//!   registry only ever holds work still outstanding.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, warn};

use crate::exit_codes;

/// A file moved aside that must be put back on interrupt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRestore {
    pub original: PathBuf,
    pub backup: PathBuf,
}

/// Outstanding cleanup work for the running process.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CleanupRegistry {
    scratch: Option<PathBuf>,
    restores: Vec<PendingRestore>,
}

static REGISTRY: Mutex<CleanupRegistry> = Mutex::new(CleanupRegistry::new());

/// Lock the process-wide registry, ignoring poisoning.
pub fn registry() -> MutexGuard<'static, CleanupRegistry> {
    REGISTRY.lock().unwrap_or_else(PoisonError::into_inner)
}

impl CleanupRegistry {
    pub const fn new() -> Self {
        Self {
            scratch: None,
            restores: Vec::new(),
        }
    }

    /// Remember the scratch directory to delete.
    pub fn set_scratch(&mut self, path: &Path) {
        self.scratch = Some(path.to_path_buf());
    }

    /// Forget the scratch directory `path`, if it is the registered one.
    pub fn clear_scratch(&mut self, path: &Path) {
        if self.scratch.as_deref() == Some(path) {
            self.scratch = None;
        }
    }

    /// Remember that `backup` must be moved back to `original`.
    pub fn add_restore(&mut self, original: &Path, backup: &Path) {
        self.restores.push(PendingRestore {
            original: original.to_path_buf(),
            backup: backup.to_path_buf(),
        });
    }

    /// Forget the pending restore for `original`.
    pub fn remove_restore(&mut self, original: &Path) {
        self.restores.retain(|pending| pending.original != original);
    }

    pub fn scratch(&self) -> Option<&Path> {
        self.scratch.as_deref()
    }

    pub fn restores(&self) -> &[PendingRestore] {
        &self.restores
    }

    pub fn is_empty(&self) -> bool {
        self.scratch.is_none() && self.restores.is_empty()
    }

    /// Perform and clear all outstanding cleanup.
    ///
    /// # Behavior
    ///
    /// Backups are restored newest first. Failures are logged and do not stop
    /// the remaining steps.
    pub fn run(&mut self) {
        for pending in self.restores.drain(..).rev() {
            match fs::rename(&pending.backup, &pending.original) {
                Ok(()) => debug!("Restored {}", pending.original.display()),
                Err(e) => warn!(
                    "Could not restore {} from {}: {}",
                    pending.original.display(),
                    pending.backup.display(),
                    e
                ),
            }
        }
        if let Some(scratch) = self.scratch.take() {
            if let Err(e) = fs::remove_dir_all(&scratch) {
                warn!("Could not remove {}: {}", scratch.display(), e);
            }
        }
    }
}

/// Install the `SIGINT`/`SIGTERM` handler that runs the registry and exits.
pub fn install_handler() -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(|| {
        registry().run();
        std::process::exit(exit_codes::INTERRUPTED);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_run_restores_backup_and_removes_scratch() {
        let temp_dir = TempDir::new().unwrap();
        let original = temp_dir.path().join("clouds.yaml");
        let backup = temp_dir.path().join("clouds.yaml.bak");
        fs::write(&backup, "clouds: {}\n").unwrap();
        let scratch = temp_dir.path().join("clouds-gen-scratch");
        fs::create_dir_all(scratch.join("nested")).unwrap();
        fs::write(scratch.join("nested").join("source.yaml"), "x").unwrap();

        let mut registry = CleanupRegistry::new();
        registry.add_restore(&original, &backup);
        registry.set_scratch(&scratch);
        registry.run();

        assert_eq!(fs::read_to_string(&original).unwrap(), "clouds: {}\n");
        assert!(!backup.exists());
        assert!(!scratch.exists());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_run_continues_past_failures() {
        let temp_dir = TempDir::new().unwrap();
        let gone = temp_dir.path().join("gone.yaml");
        let scratch = temp_dir.path().join("scratch");
        fs::create_dir(&scratch).unwrap();

        let mut registry = CleanupRegistry::new();
        registry.add_restore(&gone, &temp_dir.path().join("gone.yaml.bak"));
        registry.set_scratch(&scratch);
        registry.run();

        assert!(!gone.exists());
        assert!(!scratch.exists());
    }

    #[test]
    fn test_deregistration() {
        let mut registry = CleanupRegistry::new();
        registry.add_restore(Path::new("/a/clouds.yaml"), Path::new("/a/clouds.yaml.bak"));
        registry.set_scratch(Path::new("/tmp/clouds-gen-1"));

        registry.clear_scratch(Path::new("/tmp/other"));
        assert_eq!(registry.scratch(), Some(Path::new("/tmp/clouds-gen-1")));

        registry.clear_scratch(Path::new("/tmp/clouds-gen-1"));
        registry.remove_restore(Path::new("/a/clouds.yaml"));
        assert!(registry.is_empty());
        assert!(registry.restores().is_empty());
    }
}
