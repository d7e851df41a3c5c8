//! # Scalar and Field Values
//!
//! The closed value model shared by blueprints and hyperparameters.
//!
//! A field value is tagged at the point of assignment as either a
//! [`Scalar`] or a class reference. Nothing downstream inspects a value's
//! runtime shape to decide how to validate or persist it: the variant
//! alone determines the storage bucket.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::class::ClassRef;
use crate::error::ResolutionError;

/// The primitive types a field can be constrained to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    /// Boolean.
    Bool,
    /// Signed 64-bit integer.
    Int,
    /// 64-bit float.
    Float,
    /// UTF-8 string.
    Str,
}

impl ScalarKind {
    /// Every scalar kind, in declaration order.
    pub const ALL: [ScalarKind; 4] = [
        ScalarKind::Bool,
        ScalarKind::Int,
        ScalarKind::Float,
        ScalarKind::Str,
    ];

    /// Short type name (`"int"`, `"float"`, ...).
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "str",
        }
    }

    /// Qualifier persisted for bare-type fields.
    pub fn qualifier(&self) -> &'static str {
        match self {
            Self::Bool => "builtins.bool",
            Self::Int => "builtins.int",
            Self::Float => "builtins.float",
            Self::Str => "builtins.str",
        }
    }

    /// Parse a type qualifier. Accepts both `builtins.int` and the bare `int`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError`] naming `qualifier` if it is not a scalar type.
    pub fn from_qualifier(qualifier: &str) -> Result<Self, ResolutionError> {
        let bare = qualifier.strip_prefix("builtins.").unwrap_or(qualifier);
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == bare)
            .ok_or_else(|| ResolutionError::new(qualifier))
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScalarKind {
    type Err = ResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_qualifier(s)
    }
}

/// A primitive value, persisted as a plain JSON literal.
///
/// Deserialization is untagged: `true` is a `Bool`, `10` an `Int`,
/// `0.5` or `1.0` a `Float`, and a quoted string a `Str`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Boolean literal.
    Bool(bool),
    /// Integer literal.
    Int(i64),
    /// Float literal.
    Float(f64),
    /// String literal.
    Str(String),
}

impl Scalar {
    /// The exact kind of this scalar.
    pub fn kind(&self) -> ScalarKind {
        match self {
            Self::Bool(_) => ScalarKind::Bool,
            Self::Int(_) => ScalarKind::Int,
            Self::Float(_) => ScalarKind::Float,
            Self::Str(_) => ScalarKind::Str,
        }
    }

    /// Whether the scalar survives a JSON round-trip.
    ///
    /// NaN and the infinities have no JSON literal.
    pub fn is_representable(&self) -> bool {
        match self {
            Self::Float(f) => f.is_finite(),
            _ => true,
        }
    }

    /// Parse user input as a scalar of exactly `kind`.
    ///
    /// Booleans accept `true` and `false` in any letter case. A float must
    /// be finite. Any text is a valid `str`.
    pub fn parse(kind: ScalarKind, text: &str) -> Option<Self> {
        match kind {
            ScalarKind::Bool if text.eq_ignore_ascii_case("true") => Some(Self::Bool(true)),
            ScalarKind::Bool if text.eq_ignore_ascii_case("false") => Some(Self::Bool(false)),
            ScalarKind::Bool => None,
            ScalarKind::Int => text.parse().ok().map(Self::Int),
            ScalarKind::Float => text.parse::<f64>().ok().filter(|f| f.is_finite()).map(Self::Float),
            ScalarKind::Str => Some(Self::Str(text.to_string())),
        }
    }

    /// The boolean, if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The integer, if this is an `Int`. Floats are not truncated.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// The float, if this is a `Float`. Integers are not widened.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// The string, if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Str(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

/// A concrete field value: either a scalar or a registered class.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A primitive literal.
    Scalar(Scalar),
    /// A class reference, persisted by qualifier.
    Class(ClassRef),
}

impl Value {
    /// Name of the value's kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Scalar(s) => s.kind().name(),
            Self::Class(_) => "class",
        }
    }

    /// The class reference, if this value is one.
    pub fn as_class(&self) -> Option<&ClassRef> {
        match self {
            Self::Class(c) => Some(c),
            Self::Scalar(_) => None,
        }
    }

    /// The scalar, if this value is one.
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::Class(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(s) => write!(f, "{s}"),
            Self::Class(c) => write!(f, "{}", c.qualifier()),
        }
    }
}

impl From<Scalar> for Value {
    fn from(v: Scalar) -> Self {
        Self::Scalar(v)
    }
}

impl From<ClassRef> for Value {
    fn from(v: ClassRef) -> Self {
        Self::Class(v)
    }
}

impl From<&ClassRef> for Value {
    fn from(v: &ClassRef) -> Self {
        Self::Class(v.clone())
    }
}

macro_rules! value_from_scalar {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Self::Scalar(Scalar::from(v))
                }
            }
        )*
    };
}

value_from_scalar!(bool, i64, i32, f64, &str, String);
