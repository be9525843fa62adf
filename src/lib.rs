//! # Clouds Generator Library
//!
//! This library builds OpenStack-style `clouds.yaml` documents holding one
//! named profile per accessible project. It backs the `clouds-gen`
//! command-line tool.
//!
//! ## Quick Example
//!
//! ```
//! use clouds_gen::expand::{expand, Namespace, ProjectRecord};
//! use clouds_gen::merge::{merge, OutputDocument};
//! use clouds_gen::params::{resolve, ParamValues};
//!
//! let source = ParamValues {
//!     auth_url: Some("https://keystone.example:5000/v3".to_string()),
//!     ..Default::default()
//! };
//! let params = resolve(ParamValues::default(), source, "example").unwrap();
//!
//! let projects = vec![ProjectRecord::new("demo", "8f14e45f")];
//! let entries = expand(&params, &Namespace::Verbatim("lab".into()), &projects, false).unwrap();
//!
//! let mut document = OutputDocument::new();
//! merge(&mut document, &entries).unwrap();
//! assert_eq!(document.keys(), &["lab-demo".to_string()]);
//! ```
//!
//! ## Core Concepts
//!
//! - **Connection parameters (`params`)**: resolving one source's endpoint,
//!   credentials and defaults.
//! - **Assignment (`assignment`)**: matching command-line credentials and
//!   names to input files by position.
//! - **Expansion (`expand`)**: one namespaced entry per listed project.
//! - **Merging (`merge`)**: folding every source's entries into one document
//!   while recording per-source outcomes.
//! - **Listers (`lister`)**: the project and region listing backends.
//! - **Documents (`document`)**: path-addressed YAML access.
//! - **Interrupts (`interrupt`)**: undoing scratch and backup work when a
//!   signal stops the run.
//!
//! ## Execution Flow
//!
//! 1. **Scratch**: move into a private temporary directory (`scratch`).
//! 2. **Resolve**: merge mode reads each input file, discovery mode reads
//!    flags, environment and a legacy clouds file (`modes`).
//! 3. **List**: ask the lister for each source's projects.
//! 4. **Expand and merge**: build entries and fold them into one document.
//! 5. **Write**: serialize once, only if at least one source succeeded
//!    (`write`).

pub mod assignment;
pub mod defaults;
pub mod document;
pub mod error;
pub mod exit_codes;
pub mod expand;
pub mod interrupt;
pub mod lister;
pub mod merge;
pub mod modes;
pub mod output;
pub mod params;
pub mod scratch;
pub mod write;
