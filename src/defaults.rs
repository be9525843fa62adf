//! Default values for clouds-gen.
//!
//! Centralizes the fallbacks applied to connection parameters and the
//! location of the default clouds file so every mode agrees on them.

use std::path::PathBuf;

/// Domain used when a source does not name one.
pub const USER_DOMAIN_NAME: &str = "Default";

/// Endpoint interface used when a source does not name one.
pub const INTERFACE: &str = "public";

/// Identity API version used when a source omits it or it is not numeric.
pub const IDENTITY_API_VERSION: u32 = 3;

/// Namespace prefixed to every project key in discovery mode.
pub const DISCOVERY_NAMESPACE: &str = "openstack";

/// Returns the default clouds file location.
///
/// Uses the platform configuration directory:
/// - Linux: `~/.config/openstack/clouds.yaml`
/// - macOS: `~/Library/Application Support/openstack/clouds.yaml`
///
/// Falls back to `clouds.yaml` in the current directory if the platform
/// configuration directory cannot be determined.
pub fn default_clouds_file() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("openstack").join("clouds.yaml"))
        .unwrap_or_else(|| PathBuf::from("clouds.yaml"))
}
