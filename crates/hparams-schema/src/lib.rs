//! # hparams-schema — Blueprint Schemas
//!
//! A blueprint declares the fields a configuration may carry and what each
//! field accepts. This crate provides:
//!
//! - [`Constraint`]: the closed constraint model and its validator.
//! - [`FieldInput`]: the shapes a field may be declared with and how each
//!   becomes a constraint, including one-shot catalog curation.
//! - [`Blueprint`]: the schema itself, with strict validation queries and
//!   persistence through a [`hparams_core::RecordStore`].
//! - [`BlueprintRecord`]: the on-disk layout.
//!
//! ## Crate Policy
//!
//! - Depends only on `hparams-core` among workspace crates.
//! - Class identity is never approximated: a class list accepts exactly its
//!   members.

pub mod blueprint;
pub mod constraint;
pub mod input;
pub mod record;

pub use blueprint::Blueprint;
pub use constraint::Constraint;
pub use input::FieldInput;
pub use record::BlueprintRecord;
