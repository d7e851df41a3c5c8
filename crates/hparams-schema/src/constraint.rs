//! # Field Constraints
//!
//! The closed set of constraints a blueprint field can carry, and the
//! validator that decides whether a candidate value satisfies one.
//!
//! Matching is exact in every case. An `int` never satisfies `float`, a
//! `bool` never satisfies `int`, and a class satisfies a class set only if it
//! is one of the listed classes, never because it is related to one.

use std::fmt;

use hparams_core::{ClassRef, Scalar, ScalarKind, Value};

/// What a blueprint field accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// Any scalar of exactly this kind.
    ScalarType(ScalarKind),
    /// Exactly this literal.
    ScalarValue(Scalar),
    /// Exactly one of these classes. Order is preserved and significant for
    /// equality.
    ClassSet(Vec<ClassRef>),
}

impl Constraint {
    /// Whether `value` satisfies this constraint.
    pub fn check(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::ScalarType(kind), Value::Scalar(s)) => s.kind() == *kind,
            (Self::ScalarValue(literal), Value::Scalar(s)) => s == literal,
            (Self::ClassSet(classes), Value::Class(class)) => classes.contains(class),
            _ => false,
        }
    }

    /// The allowed classes, if this is a class set.
    pub fn classes(&self) -> Option<&[ClassRef]> {
        match self {
            Self::ClassSet(classes) => Some(classes),
            _ => None,
        }
    }

    pub fn is_class_set(&self) -> bool {
        matches!(self, Self::ClassSet(_))
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ScalarType(kind) => write!(f, "type {kind}"),
            Self::ScalarValue(literal) => write!(f, "literal {literal}"),
            Self::ClassSet(classes) => {
                f.write_str("one of [")?;
                for (i, class) in classes.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", class.qualifier())?;
                }
                f.write_str("]")
            }
        }
    }
}
