//! Project and region listing
//!
//! The generator never talks to an identity service directly. It asks a
//! [`ProjectLister`] (and, in discovery mode, a [`RegionLister`]) for the
//! data it needs, handing over one source's [`ConnectionParams`] per call.
//! Each call is self-contained, so consecutive sources cannot leak settings
//! into each other.
//!
//! Two implementations ship with the crate:
//!
//! - [`OpenStackCli`]: runs the `openstack` command against a single-cloud
//!   clouds file written to the scratch directory.
//! - [`FixtureLister`]: answers from a YAML fixture, for offline runs.

pub mod fixture;
pub mod openstack;

use crate::error::Result;
use crate::expand::ProjectRecord;
use crate::params::ConnectionParams;

pub use fixture::FixtureLister;
pub use openstack::OpenStackCli;

/// Lists the projects a set of credentials can access.
#[cfg_attr(test, mockall::automock)]
pub trait ProjectLister {
    /// Projects in the order the backend returned them.
    fn list_projects(&self, params: &ConnectionParams) -> Result<Vec<ProjectRecord>>;
}

/// Lists the regions of an identity endpoint.
#[cfg_attr(test, mockall::automock)]
pub trait RegionLister {
    fn list_regions(&self, params: &ConnectionParams) -> Result<Vec<String>>;
}
