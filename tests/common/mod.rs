//! Shared test utilities for E2E tests.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_listing(listings::TWO_SITES);
//!     fixture.command().arg("--test").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::{listings, source_file};
    pub use super::TestFixture;
}

/// Listing fixtures answered by `--test` runs.
#[allow(dead_code)]
pub mod listings {
    /// Two identity endpoints with one project each, plus regions.
    pub const TWO_SITES: &str = r#"
projects:
  https://a.example/v3:
    - name: p1
      id: "1"
  https://b.example/v3:
    - name: p2
      id: "2"
    - name: p3
      id: "3"
regions:
  https://a.example/v3:
    - RegionA
"#;

    /// An endpoint whose first project listing fails.
    pub const FLAKY: &str = r#"
projects:
  https://flaky.example/v3:
    - name: demo
      id: "42"
fail_once:
  - https://flaky.example/v3
"#;
}

/// A single-cloud clouds file for `auth_url` with the given credentials.
#[allow(dead_code)]
pub fn source_file(auth_url: &str, username: &str, password: &str) -> String {
    format!(
        "clouds:\n  site:\n    auth:\n      auth_url: {}\n      username: {}\n      password: {}\n",
        auth_url, username, password
    )
}

/// A temporary directory acting as both the working directory and `HOME`.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        if let Some(parent) = self.temp_dir.path().join(path).parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Add the listing fixture used by `--test`.
    pub fn with_listing(self, content: &str) -> Self {
        self.with_file("listing.yaml", content)
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// The default clouds file as seen by the binary under this fixture.
    #[allow(dead_code)]
    pub fn default_clouds_file(&self) -> PathBuf {
        self.path()
            .join("config")
            .join("openstack")
            .join("clouds.yaml")
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFixture {
    /// Create a command running in this fixture's directory, isolated from
    /// the invoking shell's `OS_*` variables and configuration directory.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("clouds-gen");
        cmd.current_dir(self.path())
            .env("HOME", self.path())
            .env("XDG_CONFIG_HOME", self.path().join("config"))
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .env_remove("CLOUDS_GEN_FIXTURE");
        for (key, _) in std::env::vars_os() {
            if key.to_string_lossy().starts_with("OS_") {
                cmd.env_remove(key);
            }
        }
        cmd
    }

    /// A command in offline mode answering listings from `listing.yaml`.
    #[allow(dead_code)]
    pub fn offline_command(&self) -> assert_cmd::Command {
        let mut cmd = self.command();
        cmd.arg("--test")
            .arg("--fixture")
            .arg(self.path().join("listing.yaml"));
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_with_file() {
        let fixture = TestFixture::new().with_file("a.yaml", "clouds: {}");
        assert!(fixture.path().join("a.yaml").exists());
    }

    #[test]
    fn test_listings_are_valid_yaml() {
        for listing in [listings::TWO_SITES, listings::FLAKY] {
            serde_yaml::from_str::<serde_yaml::Value>(listing).expect("listing should parse");
        }
    }
}
