//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types used throughout hparams. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Constraint violations carry the field, the rejected value and the
//!   constraint it failed, all rendered to text at the point of failure.
//! - Resolution failures always name the exact qualifier that could not be
//!   mapped back to a class. There is no partial or best-guess result.
//! - Storage failures carry the full path of the record involved.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for hparams.
#[derive(Error, Debug)]
pub enum HparamsError {
    /// A field input had a shape that cannot be turned into a constraint,
    /// or a value handed to an operation had the wrong kind.
    #[error("type mismatch for field '{field}': cannot use a value of kind {provided_kind}")]
    TypeMismatch {
        /// Field the input was provided for.
        field: String,
        /// Kind of the offending input (e.g. `"int"`, `"class"`).
        provided_kind: String,
    },

    /// A field was referenced that the blueprint does not declare.
    #[error("field '{name}' is not declared in the blueprint")]
    SchemaFieldMissing {
        /// Name of the undeclared field.
        name: String,
    },

    /// A strict single-field assignment failed validation.
    #[error("value {value} violates constraint {constraint} of field '{field}'")]
    ConstraintViolation {
        /// Field being assigned.
        field: String,
        /// Rendered value that was rejected.
        value: String,
        /// Rendered constraint the value failed.
        constraint: String,
    },

    /// A stored qualifier could not be mapped back to a class.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// No record exists at the expected location.
    #[error("record not found: {}", path.display())]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// A record already exists and the save mode forbids overwriting it.
    #[error("record already exists: {}", path.display())]
    AlreadyExists {
        /// Path that already holds a record.
        path: PathBuf,
    },

    /// The same field name was declared twice in one construction.
    #[error("field '{name}' declared more than once")]
    DuplicateField {
        /// The repeated field name.
        name: String,
    },

    /// A class with the same qualifier is already registered.
    #[error("class '{qualifier}' is already registered")]
    DuplicateClass {
        /// The repeated qualifier.
        qualifier: String,
    },

    /// An identifier, namespace or class name is syntactically unusable.
    #[error("invalid identifier '{value}': {reason}")]
    InvalidIdentifier {
        /// The rejected identifier.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A persisted record parsed as JSON but is structurally inconsistent.
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    /// A configuration or manifest file could not be interpreted.
    #[error("configuration error: {0}")]
    Config(String),

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A qualifier could not be resolved at either tier of lookup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot resolve qualifier '{qualifier}'")]
pub struct ResolutionError {
    /// The qualifier exactly as it was handed to the resolver.
    pub qualifier: String,
}

impl ResolutionError {
    /// Build a resolution error for `qualifier`.
    pub fn new(qualifier: impl Into<String>) -> Self {
        Self {
            qualifier: qualifier.into(),
        }
    }
}

/// Convenience alias used across the workspace.
pub type Result<T, E = HparamsError> = std::result::Result<T, E>;
