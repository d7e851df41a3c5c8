//! # hparams-set — Hyperparameter Sets
//!
//! Concrete, validated configurations built against a blueprint.
//!
//! - [`HyperParameters`]: field values scoped to a [`SharedBlueprint`],
//!   with permissive bulk construction, strict single-field assignment and
//!   optional schema widening.
//! - [`DefaultExtractor`]: the keyword defaults handed back with every
//!   class-valued field, overridden by same-named sibling fields.
//! - [`HyperParametersRecord`]: the on-disk layout.
//!
//! ## Crate Policy
//!
//! - Blueprint locks are never held across calls out of this crate.
//! - Loading is all-or-nothing: an unresolvable class reference leaves the
//!   set unchanged.

pub mod defaults;
pub mod hyperparameters;
pub mod record;

pub use defaults::{DefaultExtractor, NestedDefaults};
pub use hyperparameters::{share, HyperParameters, ParamValue, SharedBlueprint};
pub use record::HyperParametersRecord;
