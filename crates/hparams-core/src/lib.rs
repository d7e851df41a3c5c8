//! # hparams-core — Foundational Types for hparams
//!
//! This crate is the leaf of the hparams workspace. It defines the value
//! model shared by blueprints and hyperparameters and the class registry
//! that maps classes to textual qualifiers and back. Every other crate in
//! the workspace depends on `hparams-core`; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **An explicit registry instead of dynamic imports.** Classes are
//!    registered descriptors. Resolution is a pure lookup over registered
//!    namespaces; no text is ever evaluated.
//!
//! 2. **Values are tagged at assignment.** A field value is either a
//!    [`Scalar`] or a [`ClassRef`]; validation and persistence dispatch on
//!    the variant, never on a runtime shape test.
//!
//! 3. **Storage locations are values.** A [`RecordStore`] is passed to every
//!    save and load. There is no process-wide default directory.
//!
//! 4. **Curation is injected.** Turning a catalog into a class list is a
//!    [`Curator`] supplied by the caller.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `hparams-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod class;
pub mod config;
pub mod curate;
pub mod error;
pub mod manifest;
pub mod registry;
pub mod storage;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use class::{ClassDescriptor, ClassRef, Parameter};
pub use config::StorageConfig;
pub use curate::{Candidate, Catalog, Curator, ExcludeIndices, IncludeAll, IncludeNames};
pub use error::{HparamsError, ResolutionError, Result};
pub use manifest::ClassManifest;
pub use registry::ClassRegistry;
pub use storage::{RecordKind, RecordStore, SaveMode};
pub use value::{Scalar, ScalarKind, Value};
