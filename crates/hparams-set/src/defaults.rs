//! # Nested Defaults
//!
//! When a field holds a class, reading it also yields the keyword defaults
//! of that class's constructor, so callers can instantiate it without
//! restating every argument. A constructor parameter that shares its name
//! with another field of the same parameter set takes that field's value
//! instead of the declared default: setting `lr = 0.05` on the set changes
//! the `lr` handed to the optimizer.

use std::collections::BTreeMap;

use hparams_core::{ClassRef, HparamsError, Value};

/// Defaultable constructor parameter name to the value to pass.
pub type NestedDefaults = BTreeMap<String, Value>;

/// Extracts nested defaults against the current values of a parameter set.
#[derive(Debug, Clone, Copy)]
pub struct DefaultExtractor<'a> {
    values: &'a BTreeMap<String, Value>,
}

impl<'a> DefaultExtractor<'a> {
    pub fn new(values: &'a BTreeMap<String, Value>) -> Self {
        Self { values }
    }

    /// Nested defaults for the class held by `field`.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` if `value` is not a class.
    pub fn extract(&self, field: &str, value: &Value) -> Result<NestedDefaults, HparamsError> {
        match value {
            Value::Class(class) => Ok(self.defaults_of(class)),
            Value::Scalar(scalar) => Err(HparamsError::TypeMismatch {
                field: field.to_string(),
                provided_kind: scalar.kind().name().to_string(),
            }),
        }
    }

    /// Nested defaults for `class`. Required parameters are left out.
    pub fn defaults_of(&self, class: &ClassRef) -> NestedDefaults {
        class
            .parameters()
            .iter()
            .filter_map(|param| {
                let declared = param.default.as_ref()?;
                let value = self
                    .values
                    .get(&param.name)
                    .cloned()
                    .unwrap_or_else(|| Value::Scalar(declared.clone()));
                Some((param.name.clone(), value))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hparams_core::{ClassDescriptor, ClassRegistry, Parameter};

    fn sgd() -> ClassRef {
        let mut reg = ClassRegistry::new();
        reg.register(
            ClassDescriptor::new("torch.optim.sgd", "SGD").with_params([
                Parameter::required("params"),
                Parameter::optional("lr", 0.01),
                Parameter::optional("momentum", 0.9),
            ]),
        )
        .unwrap()
    }

    #[test]
    fn test_declared_defaults() {
        let values = BTreeMap::new();
        let defaults = DefaultExtractor::new(&values)
            .extract("optimizer", &Value::from(sgd()))
            .unwrap();
        assert_eq!(defaults.len(), 2);
        assert_eq!(defaults["lr"], Value::from(0.01));
        assert_eq!(defaults["momentum"], Value::from(0.9));
        assert!(!defaults.contains_key("params"));
    }

    #[test]
    fn test_sibling_field_overrides_default() {
        let mut values = BTreeMap::new();
        values.insert("lr".to_string(), Value::from(0.05));
        // A sibling matching a required parameter does not add it.
        values.insert("params".to_string(), Value::from("ignored"));
        let defaults = DefaultExtractor::new(&values).defaults_of(&sgd());
        assert_eq!(defaults["lr"], Value::from(0.05));
        assert_eq!(defaults["momentum"], Value::from(0.9));
        assert!(!defaults.contains_key("params"));
    }

    #[test]
    fn test_scalar_is_type_mismatch() {
        let values = BTreeMap::new();
        let err = DefaultExtractor::new(&values)
            .extract("epochs", &Value::from(10))
            .unwrap_err();
        assert!(matches!(err, HparamsError::TypeMismatch { ref field, .. } if field == "epochs"));
    }
}
