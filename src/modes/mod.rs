//! Run drivers
//!
//! A run works in one of two modes:
//!
//! 1. **Merge** ([`merge`]): one or more existing clouds files are read in
//!    order. Each file's connection parameters, optionally overridden from
//!    the command line, are used to list that source's projects, and every
//!    project becomes an entry in one combined document.
//! 2. **Discovery** ([`discovery`]): no input files. Parameters come from
//!    flags, the environment and a legacy clouds file, and the single
//!    source's projects are listed under a fixed namespace.
//!
//! Both drivers feed the [`MergeEngine`](crate::merge::MergeEngine) and
//! return the finished document together with the per-source summary.

pub mod discovery;
pub mod merge;

use crate::merge::{OutputDocument, RunSummary};

/// Result of a completed run.
#[derive(Debug)]
pub struct RunOutput {
    pub document: OutputDocument,
    pub summary: RunSummary,
}
