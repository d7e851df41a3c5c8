//! # hparams-cli — Command-Line Interface for hparams
//!
//! Provides the `hparams` binary: a thin shell over the library crates that
//! reads YAML input definitions, prompts for catalog curation or
//! hyperparameter values when asked to, and prints records back.
//!
//! ## Subcommands
//!
//! - `hparams catalog [namespace]`: list the public classes of a namespace,
//!   or every declared namespace.
//! - `hparams blueprint create|show|list`: manage blueprint records.
//! - `hparams params create|show|list`: manage hyperparameter records.
//!
//! ```bash
//! hparams --manifest classes.yaml --root runs blueprint create train.yaml --interactive
//! hparams --manifest classes.yaml --root runs params create run-1.yaml --interactive
//! hparams --manifest classes.yaml --root runs params show train run-1
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing lives here; schema and storage logic stays in the
//!   library crates.
//! - Handlers return an exit code; errors carry `anyhow` context.

pub mod blueprint;
pub mod catalog;
pub mod context;
pub mod definition;
pub mod params;
pub mod prompt;
pub mod wizard;

pub use context::Context;
