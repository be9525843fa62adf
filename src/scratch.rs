//! Scratch working directory and file backups
//!
//! The `openstack` client picks up a `clouds.yaml` from the current
//! directory. To keep a stray file there from changing what gets listed, a
//! run moves into a private temporary directory for its whole lifetime.
//! [`ScratchDir`] restores the previous working directory and deletes the
//! temporary one when dropped, whether the run succeeded or failed.
//!
//! [`Backup`] moves an existing file aside for the duration of a retry and
//! puts it back on drop unless told to keep the backup.
//!
//! Both guards also record themselves in the
//! [`interrupt`](crate::interrupt) registry, which undoes their work when
//! the process is stopped by a signal.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use tempfile::TempDir;

use crate::error::{Error, Result};
use crate::interrupt;

/// A temporary working directory, entered for the life of the guard.
#[derive(Debug)]
pub struct ScratchDir {
    dir: TempDir,
    previous: PathBuf,
}

impl ScratchDir {
    /// Create a temporary directory and make it the working directory.
    pub fn enter() -> Result<Self> {
        let previous = env::current_dir().map_err(|e| Error::Scratch {
            message: format!("cannot determine current directory: {}", e),
        })?;
        let dir = tempfile::Builder::new()
            .prefix("clouds-gen-")
            .tempdir()
            .map_err(|e| Error::Scratch {
                message: format!("cannot create temporary directory: {}", e),
            })?;
        env::set_current_dir(dir.path()).map_err(|e| Error::Scratch {
            message: format!("cannot enter {}: {}", dir.path().display(), e),
        })?;
        interrupt::registry().set_scratch(dir.path());
        debug!("Working in scratch directory {}", dir.path().display());
        Ok(Self { dir, previous })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if let Err(e) = env::set_current_dir(&self.previous) {
            warn!(
                "Could not return to {}: {}",
                self.previous.display(),
                e
            );
        }
        interrupt::registry().clear_scratch(self.dir.path());
        // `dir` is removed when the TempDir field drops after this.
    }
}

/// A file moved aside to `<name>.bak`.
#[derive(Debug)]
pub struct Backup {
    original: PathBuf,
    backup: PathBuf,
    active: bool,
}

impl Backup {
    /// Move `path` to `<path>.bak` if it exists.
    pub fn stash(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let mut name = path.as_os_str().to_owned();
        name.push(".bak");
        let backup = PathBuf::from(name);
        let mut registry = interrupt::registry();
        fs::rename(path, &backup)?;
        registry.add_restore(path, &backup);
        debug!("Moved {} to {}", path.display(), backup.display());
        Ok(Some(Self {
            original: path.to_path_buf(),
            backup,
            active: true,
        }))
    }

    pub fn original(&self) -> &Path {
        &self.original
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup
    }

    /// Move the file back to its original location.
    pub fn restore(mut self) -> Result<()> {
        self.active = false;
        let mut registry = interrupt::registry();
        registry.remove_restore(&self.original);
        fs::rename(&self.backup, &self.original)?;
        debug!("Restored {}", self.original.display());
        Ok(())
    }

    /// Leave the backup where it is.
    pub fn keep(mut self) -> PathBuf {
        self.active = false;
        interrupt::registry().remove_restore(&self.original);
        self.backup.clone()
    }
}

impl Drop for Backup {
    fn drop(&mut self) {
        if self.active {
            let mut registry = interrupt::registry();
            registry.remove_restore(&self.original);
            if let Err(e) = fs::rename(&self.backup, &self.original) {
                warn!(
                    "Could not restore {} from {}: {}",
                    self.original.display(),
                    self.backup.display(),
                    e
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_scratch_dir_enters_and_cleans_up() {
        let before = env::current_dir().unwrap();
        let scratch_path;
        {
            let scratch = ScratchDir::enter().unwrap();
            scratch_path = scratch.path().to_path_buf();
            assert!(scratch_path.exists());
            assert_eq!(
                env::current_dir().unwrap().canonicalize().unwrap(),
                scratch_path.canonicalize().unwrap()
            );
        }
        assert!(!scratch_path.exists());
        assert_eq!(env::current_dir().unwrap(), before);
        assert_ne!(interrupt::registry().scratch(), Some(scratch_path.as_path()));
    }

    #[test]
    #[serial]
    fn test_scratch_dir_is_registered_for_interrupts() {
        let scratch = ScratchDir::enter().unwrap();
        assert_eq!(interrupt::registry().scratch(), Some(scratch.path()));
    }

    #[test]
    fn test_stash_missing_file_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let backup = Backup::stash(&temp_dir.path().join("clouds.yaml")).unwrap();
        assert!(backup.is_none());
    }

    #[test]
    fn test_backup_restored_on_drop() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("clouds.yaml");
        fs::write(&path, "clouds: {}\n").unwrap();
        {
            let backup = Backup::stash(&path).unwrap().unwrap();
            assert!(!path.exists());
            assert!(backup.backup_path().exists());
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), "clouds: {}\n");
    }

    #[test]
    fn test_active_backup_is_registered_until_restored() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("clouds.yaml");
        fs::write(&path, "old").unwrap();

        let backup = Backup::stash(&path).unwrap().unwrap();
        assert!(interrupt::registry()
            .restores()
            .iter()
            .any(|pending| pending.original == path));

        backup.restore().unwrap();
        assert!(!interrupt::registry()
            .restores()
            .iter()
            .any(|pending| pending.original == path));
    }

    #[test]
    fn test_backup_explicit_restore() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("clouds.yaml");
        fs::write(&path, "old").unwrap();
        let backup = Backup::stash(&path).unwrap().unwrap();
        backup.restore().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "old");
        assert!(!temp_dir.path().join("clouds.yaml.bak").exists());
    }

    #[test]
    fn test_backup_keep_leaves_bak_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("clouds.yaml");
        fs::write(&path, "old").unwrap();
        let backup = Backup::stash(&path).unwrap().unwrap();
        let kept = backup.keep();
        assert_eq!(kept, temp_dir.path().join("clouds.yaml.bak"));
        assert!(!path.exists());
        assert_eq!(fs::read_to_string(kept).unwrap(), "old");
    }
}
