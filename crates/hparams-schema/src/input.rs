//! # Field Inputs
//!
//! The heterogeneous shapes a caller may declare a blueprint field with,
//! and the derivation that turns each shape into a [`Constraint`].
//!
//! | Input | Constraint |
//! |-------|------------|
//! | `Type(kind)` | `ScalarType(kind)` |
//! | `Value(scalar)` | `ScalarValue(scalar)` |
//! | `List(classes)` | `ClassSet(classes)` |
//! | `Catalog { namespace, curator }` | `ClassSet(curated classes)` |
//!
//! A single bare class (`Value(Value::Class(_))`), a list holding a scalar,
//! and a non-finite float literal are rejected with `TypeMismatch`.

use std::fmt;

use hparams_core::{ClassRef, ClassRegistry, Curator, HparamsError, IncludeAll, ScalarKind, Value};

use crate::constraint::Constraint;

/// How a blueprint field is declared.
pub enum FieldInput {
    /// A primitive type.
    Type(ScalarKind),
    /// A literal. Only scalar literals are accepted.
    Value(Value),
    /// An explicit list of allowed classes, kept in the given order.
    List(Vec<Value>),
    /// Every public class of a registry namespace, filtered by `curator`.
    Catalog {
        namespace: String,
        curator: Box<dyn Curator>,
    },
}

impl FieldInput {
    pub fn of_type(kind: ScalarKind) -> Self {
        Self::Type(kind)
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Value(value.into())
    }

    pub fn classes(classes: impl IntoIterator<Item = ClassRef>) -> Self {
        Self::List(classes.into_iter().map(Value::Class).collect())
    }

    /// A catalog field retaining every public class.
    pub fn catalog(namespace: impl Into<String>) -> Self {
        Self::curated(namespace, IncludeAll)
    }

    /// A catalog field filtered by `curator`.
    pub fn curated(namespace: impl Into<String>, curator: impl Curator + 'static) -> Self {
        Self::Catalog {
            namespace: namespace.into(),
            curator: Box::new(curator),
        }
    }

    /// Derive the constraint for `field`.
    ///
    /// Catalog inputs are enumerated against `registry` and curated here,
    /// exactly once.
    pub fn derive(self, field: &str, registry: &ClassRegistry) -> Result<Constraint, HparamsError> {
        match self {
            Self::Type(kind) => Ok(Constraint::ScalarType(kind)),
            Self::Value(Value::Scalar(scalar)) if scalar.is_representable() => {
                Ok(Constraint::ScalarValue(scalar))
            }
            Self::Value(Value::Scalar(_)) => Err(mismatch(field, "non-finite float")),
            Self::Value(Value::Class(_)) => Err(mismatch(field, "class")),
            Self::List(values) => values
                .into_iter()
                .map(|value| match value {
                    Value::Class(class) => Ok(class),
                    Value::Scalar(scalar) => Err(mismatch(field, scalar.kind().name())),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Constraint::ClassSet),
            Self::Catalog { namespace, curator } => {
                let catalog = registry.catalog(&namespace)?;
                Ok(Constraint::ClassSet(catalog.curate(curator.as_ref())))
            }
        }
    }
}

fn mismatch(field: &str, provided_kind: &str) -> HparamsError {
    HparamsError::TypeMismatch {
        field: field.to_string(),
        provided_kind: provided_kind.to_string(),
    }
}

impl fmt::Debug for FieldInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(kind) => f.debug_tuple("Type").field(kind).finish(),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::List(values) => f.debug_tuple("List").field(values).finish(),
            Self::Catalog { namespace, .. } => f
                .debug_struct("Catalog")
                .field("namespace", namespace)
                .finish_non_exhaustive(),
        }
    }
}

impl From<ScalarKind> for FieldInput {
    fn from(kind: ScalarKind) -> Self {
        Self::Type(kind)
    }
}

impl From<Value> for FieldInput {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Vec<ClassRef>> for FieldInput {
    fn from(classes: Vec<ClassRef>) -> Self {
        Self::classes(classes)
    }
}
