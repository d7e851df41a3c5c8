//! # Class Descriptors
//!
//! A "class" is a registered description of a constructible implementation:
//! the namespace that defines it, its name, a short documentation string and
//! its constructor signature. Descriptors replace runtime reflection: the
//! registry is the only place classes come from, and a [`ClassRef`] can only
//! be obtained from a [`ClassRegistry`](crate::registry::ClassRegistry).
//!
//! ## Identity
//!
//! Two [`ClassRef`]s denote the same class iff their qualifiers are equal.
//! The registry refuses duplicate qualifiers, so qualifier equality is class
//! identity.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::value::Scalar;

const NO_DESCRIPTION: &str = "No Description Found";

/// One constructor parameter.
///
/// Parameters without a default are required and never appear in nested
/// default mappings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name as accepted by the constructor.
    pub name: String,
    /// Declared default, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Scalar>,
}

impl Parameter {
    /// A parameter the caller must always supply.
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
        }
    }

    /// A parameter with a declared default.
    pub fn optional(name: impl Into<String>, default: impl Into<Scalar>) -> Self {
        Self {
            name: name.into(),
            default: Some(default.into()),
        }
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

/// Static description of a class: where it is defined and how it is built.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDescriptor {
    module: String,
    name: String,
    doc: Option<String>,
    params: Vec<Parameter>,
}

impl ClassDescriptor {
    /// Describe class `name` defined in namespace `module`.
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
            doc: None,
            params: Vec::new(),
        }
    }

    /// Attach documentation. Only the first line is shown in catalogs.
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Append one constructor parameter.
    pub fn with_param(mut self, param: Parameter) -> Self {
        self.params.push(param);
        self
    }

    /// Append several constructor parameters, in signature order.
    pub fn with_params(mut self, params: impl IntoIterator<Item = Parameter>) -> Self {
        self.params.extend(params);
        self
    }

    /// The defining namespace.
    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// Constructor parameters in signature order.
    pub fn parameters(&self) -> &[Parameter] {
        &self.params
    }

    /// `"<module>.<name>"`.
    pub fn qualifier(&self) -> String {
        format!("{}.{}", self.module, self.name)
    }

    /// First non-empty documentation line, or a placeholder.
    pub fn summary(&self) -> &str {
        self.doc
            .as_deref()
            .and_then(|d| d.lines().map(str::trim).find(|l| !l.is_empty()))
            .unwrap_or(NO_DESCRIPTION)
    }
}

/// Shared handle to a registered class.
#[derive(Clone)]
pub struct ClassRef(Arc<ClassDescriptor>);

impl ClassRef {
    pub(crate) fn new(descriptor: ClassDescriptor) -> Self {
        Self(Arc::new(descriptor))
    }

    pub fn descriptor(&self) -> &ClassDescriptor {
        &self.0
    }

    /// `"<defining-namespace>.<class-name>"`.
    pub fn qualifier(&self) -> String {
        self.0.qualifier()
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }

    pub fn module(&self) -> &str {
        self.0.module()
    }

    pub fn parameters(&self) -> &[Parameter] {
        self.0.parameters()
    }

    pub fn summary(&self) -> &str {
        self.0.summary()
    }
}

impl PartialEq for ClassRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
            || (self.0.module == other.0.module && self.0.name == other.0.name)
    }
}

impl Eq for ClassRef {}

impl Hash for ClassRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.module.hash(state);
        self.0.name.hash(state);
    }
}

impl fmt::Debug for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClassRef").field(&self.qualifier()).finish()
    }
}

impl fmt::Display for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.0.module, self.0.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sgd() -> ClassDescriptor {
        ClassDescriptor::new("torch.optim.sgd", "SGD")
            .with_doc("\n  Implements stochastic gradient descent.\n\n  Longer text.")
            .with_param(Parameter::required("params"))
            .with_param(Parameter::optional("lr", 0.001))
    }

    #[test]
    fn test_qualifier_joins_module_and_name() {
        assert_eq!(sgd().qualifier(), "torch.optim.sgd.SGD");
    }

    #[test]
    fn test_summary_is_first_nonempty_doc_line() {
        assert_eq!(sgd().summary(), "Implements stochastic gradient descent.");
        let bare = ClassDescriptor::new("a", "B");
        assert_eq!(bare.summary(), NO_DESCRIPTION);
    }

    #[test]
    fn test_class_ref_identity_is_qualifier_equality() {
        let a = ClassRef::new(sgd());
        let b = ClassRef::new(sgd());
        let other = ClassRef::new(ClassDescriptor::new("torch.optim.adam", "Adam"));
        assert_eq!(a, a.clone());
        assert_eq!(a, b);
        assert_ne!(a, other);
    }

    #[test]
    fn test_debug_shows_qualifier() {
        let a = ClassRef::new(sgd());
        assert_eq!(format!("{a:?}"), r#"ClassRef("torch.optim.sgd.SGD")"#);
        assert_eq!(a.to_string(), "torch.optim.sgd.SGD");
    }
}
