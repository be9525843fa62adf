//! Writing the finished document
//!
//! The output document is serialized exactly once, after every source has
//! been processed, and only when the run produced at least one entry. It
//! goes to stdout, to an explicit path, or in place to the default clouds
//! file.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{Error, Result};
use crate::merge::OutputDocument;

/// Where the output document goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    /// Whether this target writes to `path`.
    pub fn is_file(&self, path: &Path) -> bool {
        matches!(self, OutputTarget::File(target) if target == path)
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputTarget::Stdout => write!(f, "stdout"),
            OutputTarget::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Serialize `document` to `target`.
pub fn execute(document: &OutputDocument, target: &OutputTarget) -> Result<()> {
    match target {
        OutputTarget::Stdout => {
            let yaml = document.to_yaml_string()?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(yaml.as_bytes())?;
            stdout.flush()?;
        }
        OutputTarget::File(path) => {
            document.document().write_to(path).map_err(|e| match e {
                Error::Io(io) => Error::Io(std::io::Error::new(
                    io.kind(),
                    format!("failed to write '{}': {}", path.display(), io),
                )),
                other => other,
            })?;
            debug!("Wrote {} entries to {}", document.len(), path.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expand::{build_entry, OutputEntry};
    use crate::params::ConnectionParams;
    use std::fs;
    use tempfile::TempDir;

    fn entry() -> OutputEntry {
        let params = ConnectionParams {
            auth_url: "https://a".to_string(),
            username: None,
            password: None,
            user_domain_name: "Default".to_string(),
            region_name: None,
            interface: "public".to_string(),
            identity_api_version: 3,
        };
        build_entry(&params, "1", "demo", false)
    }

    #[test]
    fn test_write_to_nested_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("openstack").join("clouds.yaml");
        let mut document = OutputDocument::new();
        document.insert("x-demo", &entry()).unwrap();

        execute(&document, &OutputTarget::File(path.clone())).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("clouds:\n  x-demo:\n"), "{}", written);
        assert!(written.contains("project_name: demo"));
        assert!(written.ends_with('\n'));
    }

    #[test]
    fn test_write_replaces_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("clouds.yaml");
        fs::write(&path, "old: content\n").unwrap();
        let mut document = OutputDocument::new();
        document.insert("x-demo", &entry()).unwrap();

        execute(&document, &OutputTarget::File(path.clone())).unwrap();

        assert!(!fs::read_to_string(&path).unwrap().contains("old"));
    }

    #[test]
    fn test_target_display_and_match() {
        let path = PathBuf::from("/tmp/clouds.yaml");
        let target = OutputTarget::File(path.clone());
        assert!(target.is_file(&path));
        assert!(!OutputTarget::Stdout.is_file(&path));
        assert_eq!(OutputTarget::Stdout.to_string(), "stdout");
        assert_eq!(target.to_string(), "/tmp/clouds.yaml");
    }
}
