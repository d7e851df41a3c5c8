//! # Hyperparameter Sets
//!
//! A [`HyperParameters`] value holds concrete field values for one named
//! configuration, scoped to a blueprint shared with other sets through a
//! [`SharedBlueprint`].
//!
//! ## Mutation Paths
//!
//! - [`HyperParameters::build`] is permissive. Values for undeclared fields
//!   and values the blueprint rejects are logged and skipped.
//! - [`HyperParameters::set_field`] is strict. A declared field rejects an
//!   invalid value with `ConstraintViolation` and keeps its prior value.
//!   Undeclared fields are stored unchecked.
//! - [`HyperParameters::set_field_updating_blueprint`] first widens the
//!   shared blueprint within the value's kind, then applies the strict
//!   path. A value of another kind is never widened in.
//!
//! The blueprint lock is only held for the duration of one lookup or one
//! widening step.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;

use hparams_core::{ClassRef, HparamsError, RecordKind, RecordStore, SaveMode, Scalar, Value};
use hparams_schema::{Blueprint, Constraint, FieldInput};

use crate::defaults::{DefaultExtractor, NestedDefaults};
use crate::record::HyperParametersRecord;

/// A blueprint shared by every parameter set built against it.
pub type SharedBlueprint = Arc<RwLock<Blueprint>>;

/// Wrap a blueprint for sharing between parameter sets.
pub fn share(blueprint: Blueprint) -> SharedBlueprint {
    Arc::new(RwLock::new(blueprint))
}

/// A field value as read back from a parameter set.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Scalar(Scalar),
    /// A class together with the defaults to construct it with.
    Class(ClassRef, NestedDefaults),
}

impl ParamValue {
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::Class(..) => None,
        }
    }

    pub fn as_class(&self) -> Option<(&ClassRef, &NestedDefaults)> {
        match self {
            Self::Class(class, defaults) => Some((class, defaults)),
            Self::Scalar(_) => None,
        }
    }
}

/// Concrete values for one named configuration.
#[derive(Debug, Clone)]
pub struct HyperParameters {
    id: String,
    blueprint: SharedBlueprint,
    values: BTreeMap<String, Value>,
}

impl HyperParameters {
    /// An empty parameter set.
    pub fn new(id: impl Into<String>, blueprint: SharedBlueprint) -> Self {
        Self {
            id: id.into(),
            blueprint,
            values: BTreeMap::new(),
        }
    }

    /// Bulk construction. Every value is checked against the blueprint;
    /// undeclared and invalid entries are reported and skipped.
    pub fn build<S: Into<String>>(
        id: impl Into<String>,
        blueprint: SharedBlueprint,
        values: impl IntoIterator<Item = (S, Value)>,
    ) -> Self {
        let mut params = Self::new(id, blueprint);
        {
            let schema = params.blueprint.read();
            for (name, value) in values {
                let name = name.into();
                match schema.check(&name, &value) {
                    Ok(true) => {
                        params.values.insert(name, value);
                    }
                    Ok(false) => tracing::warn!(
                        id = %params.id,
                        field = %name,
                        value = %value,
                        "value rejected by blueprint, skipping"
                    ),
                    Err(_) => tracing::warn!(
                        id = %params.id,
                        field = %name,
                        "field not declared in blueprint, skipping"
                    ),
                }
            }
        }
        params
    }

    /// Strict single-field assignment.
    ///
    /// # Errors
    ///
    /// Returns `ConstraintViolation` if the field is declared and `value`
    /// fails its constraint. The prior value is left untouched.
    pub fn set_field(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<(), HparamsError> {
        let name = name.into();
        let value = value.into();
        {
            let schema = self.blueprint.read();
            if let Some(constraint) = schema.constraint(&name) {
                if !constraint.check(&value) {
                    return Err(HparamsError::ConstraintViolation {
                        field: name,
                        value: value.to_string(),
                        constraint: constraint.to_string(),
                    });
                }
            } else {
                tracing::debug!(id = %self.id, field = %name, "storing undeclared field unchecked");
            }
        }
        self.values.insert(name, value);
        Ok(())
    }

    /// Widen the shared blueprint to admit `value`, then assign it strictly.
    ///
    /// Widening stays within the value's kind. A class is appended to the
    /// field's class set (or becomes a one-class set on an undeclared
    /// field), and a scalar turns a literal of the same kind into that
    /// scalar type. A value of another kind leaves the blueprint alone; the
    /// failure is logged and the strict path rejects the value.
    pub fn set_field_updating_blueprint(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<(), HparamsError> {
        let name = name.into();
        let value = value.into();
        if let Err(e) = self.widen(&name, &value) {
            tracing::warn!(id = %self.id, field = %name, error = %e, "could not widen blueprint");
        }
        self.set_field(name, value)
    }

    fn widen(&self, name: &str, value: &Value) -> Result<(), HparamsError> {
        let mut schema = self.blueprint.write();
        let input = match (value, schema.constraint(name)) {
            (_, Some(constraint)) if constraint.check(value) => return Ok(()),
            (Value::Class(class), Some(Constraint::ClassSet(classes))) => {
                let mut widened = classes.clone();
                widened.push(class.clone());
                FieldInput::classes(widened)
            }
            (Value::Scalar(scalar), Some(Constraint::ScalarValue(literal)))
                if literal.kind() == scalar.kind() =>
            {
                FieldInput::of_type(scalar.kind())
            }
            (Value::Class(class), None) => FieldInput::classes([class.clone()]),
            (Value::Scalar(scalar), None) => FieldInput::of_type(scalar.kind()),
            (_, Some(_)) => {
                return Err(HparamsError::TypeMismatch {
                    field: name.to_string(),
                    provided_kind: value.kind_name().to_string(),
                })
            }
        };
        tracing::info!(blueprint = %schema.id(), field = name, "widening blueprint field");
        schema.set_field(name, input)
    }

    /// Read a field. Class values come with their nested defaults.
    pub fn get(&self, name: &str) -> Option<ParamValue> {
        self.values.get(name).map(|value| self.param_value(value))
    }

    /// Read a field, falling back to `default` when it is absent.
    pub fn get_or(&self, name: &str, default: impl Into<Value>) -> ParamValue {
        self.get(name)
            .unwrap_or_else(|| self.param_value(&default.into()))
    }

    fn param_value(&self, value: &Value) -> ParamValue {
        match value {
            Value::Scalar(scalar) => ParamValue::Scalar(scalar.clone()),
            Value::Class(class) => ParamValue::Class(
                class.clone(),
                DefaultExtractor::new(&self.values).defaults_of(class),
            ),
        }
    }

    /// The stored value without nested defaults.
    pub fn raw(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn remove_field(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn blueprint(&self) -> &SharedBlueprint {
        &self.blueprint
    }

    pub fn to_record(&self) -> HyperParametersRecord {
        HyperParametersRecord::from_values(&self.id, &self.values)
    }

    /// Write `HyperParameters_<id>.json` into `store`.
    pub fn save(&self, store: &RecordStore, mode: SaveMode) -> Result<PathBuf, HparamsError> {
        store.write(RecordKind::HyperParameters, &self.id, &self.to_record(), mode)
    }

    /// Merge the stored record for this set's id into its values.
    ///
    /// Every class reference is resolved before anything is merged. Loaded
    /// values are not re-validated strictly: a value the current blueprint
    /// rejects is kept and reported.
    pub fn load(&mut self, store: &RecordStore) -> Result<(), HparamsError> {
        let record: HyperParametersRecord = store.read(RecordKind::HyperParameters, &self.id)?;
        let loaded = {
            let schema = self.blueprint.read();
            let loaded = record.into_values(schema.registry())?;
            for (name, value) in &loaded {
                match schema.check(name, value) {
                    Ok(true) => {}
                    Ok(false) => tracing::warn!(
                        id = %self.id,
                        field = %name,
                        value = %value,
                        "loaded value is rejected by the current blueprint"
                    ),
                    Err(_) => tracing::debug!(id = %self.id, field = %name, "loaded undeclared field"),
                }
            }
            loaded
        };
        self.values.extend(loaded);
        Ok(())
    }

    /// Load an existing parameter set by id.
    pub fn from_store(
        id: impl Into<String>,
        blueprint: SharedBlueprint,
        store: &RecordStore,
    ) -> Result<Self, HparamsError> {
        let mut params = Self::new(id, blueprint);
        params.load(store)?;
        Ok(params)
    }
}

/// Equal iff the same fields hold equal values. Id and blueprint are ignored.
impl PartialEq for HyperParameters {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl fmt::Display for HyperParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ">>> HyperParameters {} <<<", self.id)?;
        for (name, value) in &self.values {
            write!(f, "\n{name} = {value}")?;
            if let Value::Class(class) = value {
                for (param, default) in DefaultExtractor::new(&self.values).defaults_of(class) {
                    write!(f, "\n    {param} = {default}")?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hparams_core::{ClassDescriptor, ClassRegistry, Parameter, ScalarKind};

    fn registry() -> Arc<ClassRegistry> {
        let mut reg = ClassRegistry::new();
        let sgd = reg
            .register(ClassDescriptor::new("torch.optim.sgd", "SGD").with_params([
                Parameter::required("params"),
                Parameter::optional("lr", 0.01),
                Parameter::optional("momentum", 0.9),
            ]))
            .unwrap();
        reg.reexport("torch.optim", &sgd).unwrap();
        let adam = reg
            .register(ClassDescriptor::new("torch.optim.adam", "Adam").with_params([
                Parameter::required("params"),
                Parameter::optional("lr", 0.001),
            ]))
            .unwrap();
        reg.reexport("torch.optim", &adam).unwrap();
        Arc::new(reg)
    }

    fn blueprint(reg: &Arc<ClassRegistry>) -> SharedBlueprint {
        let sgd = reg.resolve("torch.optim.SGD").unwrap();
        share(
            Blueprint::build(
                "test",
                reg.clone(),
                vec![
                    ("epochs", FieldInput::of_type(ScalarKind::Int)),
                    ("lr", FieldInput::of_type(ScalarKind::Float)),
                    ("optimizer", FieldInput::classes([sgd])),
                ],
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_build_skips_undeclared_and_invalid() {
        let reg = registry();
        let params = HyperParameters::build(
            "run",
            blueprint(&reg),
            vec![
                ("epochs", Value::from(10)),
                ("lr", Value::from(1)),
                ("colour", Value::from("red")),
            ],
        );
        assert_eq!(params.len(), 1);
        assert_eq!(params.raw("epochs"), Some(&Value::from(10)));
        assert!(!params.contains("lr"));
        assert!(!params.contains("colour"));
    }

    #[test]
    fn test_strict_set_rejects_and_keeps_prior_value() {
        let reg = registry();
        let mut params = HyperParameters::new("run", blueprint(&reg));
        params.set_field("epochs", 10).unwrap();

        let err = params.set_field("epochs", 0.5).unwrap_err();
        match err {
            HparamsError::ConstraintViolation { field, value, constraint } => {
                assert_eq!(field, "epochs");
                assert_eq!(value, "0.5");
                assert_eq!(constraint, "type int");
            }
            other => panic!("Expected ConstraintViolation, got: {other}"),
        }
        assert_eq!(params.raw("epochs"), Some(&Value::from(10)));

        assert!(params.set_field("lr", 1).is_err());
        assert!(!params.contains("lr"));
    }

    #[test]
    fn test_strict_set_stores_undeclared_unchecked() {
        let reg = registry();
        let mut params = HyperParameters::new("run", blueprint(&reg));
        params.set_field("notes", "anything").unwrap();
        assert_eq!(params.raw("notes"), Some(&Value::from("anything")));
    }

    #[test]
    fn test_get_class_with_nested_defaults() {
        let reg = registry();
        let mut params = HyperParameters::new("run", blueprint(&reg));
        let sgd = reg.resolve("torch.optim.SGD").unwrap();
        params.set_field("optimizer", sgd.clone()).unwrap();

        let Some(ParamValue::Class(class, defaults)) = params.get("optimizer") else {
            panic!("optimizer should be a class");
        };
        assert_eq!(class, sgd);
        assert_eq!(defaults["lr"], Value::from(0.01));
        assert_eq!(defaults["momentum"], Value::from(0.9));

        params.set_field("lr", 0.05).unwrap();
        let Some(ParamValue::Class(_, defaults)) = params.get("optimizer") else {
            panic!("optimizer should be a class");
        };
        assert_eq!(defaults["lr"], Value::from(0.05));
        assert_eq!(defaults["momentum"], Value::from(0.9));
    }

    #[test]
    fn test_get_scalar_and_get_or() {
        let reg = registry();
        let mut params = HyperParameters::new("run", blueprint(&reg));
        params.set_field("epochs", 7).unwrap();
        assert_eq!(params.get("epochs"), Some(ParamValue::Scalar(Scalar::Int(7))));
        assert_eq!(params.get("missing"), None);
        assert_eq!(params.get_or("missing", 3), ParamValue::Scalar(Scalar::Int(3)));
        assert_eq!(params.get_or("epochs", 3), ParamValue::Scalar(Scalar::Int(7)));
    }

    #[test]
    fn test_set_field_updating_blueprint_adds_class() {
        let reg = registry();
        let shared = blueprint(&reg);
        let mut params = HyperParameters::new("run", shared.clone());
        let adam = reg.resolve("torch.optim.Adam").unwrap();

        assert!(params.set_field("optimizer", adam.clone()).is_err());
        params.set_field_updating_blueprint("optimizer", adam.clone()).unwrap();
        assert_eq!(params.raw("optimizer"), Some(&Value::from(adam.clone())));

        let schema = shared.read();
        let optimizers = schema.constraint("optimizer").unwrap().classes().unwrap();
        let names: Vec<&str> = optimizers.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["SGD", "Adam"]);
    }

    #[test]
    fn test_set_field_updating_blueprint_widens_literal_and_declares_new_field() {
        let reg = registry();
        let shared = share(
            Blueprint::build("train", reg.clone(), vec![("mode", FieldInput::literal("train"))]).unwrap(),
        );
        let other = HyperParameters::new("other", shared.clone());
        let mut params = HyperParameters::new("run", shared);

        params.set_field_updating_blueprint("mode", "eval").unwrap();
        params.set_field_updating_blueprint("batch_size", 32).unwrap();
        // The widening is visible through every set sharing the blueprint.
        let schema = other.blueprint().read();
        assert_eq!(schema.constraint("mode"), Some(&Constraint::ScalarType(ScalarKind::Str)));
        assert_eq!(schema.constraint("batch_size"), Some(&Constraint::ScalarType(ScalarKind::Int)));
    }

    #[test]
    fn test_set_field_updating_blueprint_refuses_other_kind() {
        let reg = registry();
        let shared = blueprint(&reg);
        let mut params = HyperParameters::new("run", shared.clone());
        let sgd = reg.resolve("torch.optim.SGD").unwrap();

        let err = params.set_field_updating_blueprint("epochs", "ten").unwrap_err();
        assert!(matches!(err, HparamsError::ConstraintViolation { .. }));
        let err = params.set_field_updating_blueprint("optimizer", 3).unwrap_err();
        assert!(matches!(err, HparamsError::ConstraintViolation { .. }));
        assert!(params.set_field_updating_blueprint("lr", sgd.clone()).is_err());

        let schema = shared.read();
        assert_eq!(schema.constraint("epochs"), Some(&Constraint::ScalarType(ScalarKind::Int)));
        assert_eq!(schema.constraint("lr"), Some(&Constraint::ScalarType(ScalarKind::Float)));
        assert_eq!(schema.constraint("optimizer"), Some(&Constraint::ClassSet(vec![sgd])));
        assert!(params.is_empty());
    }

    #[test]
    fn test_widening_failure_is_tolerated() {
        let reg = registry();
        let mut params = HyperParameters::new("run", blueprint(&reg));
        // An empty field name cannot be declared, but the strict path still stores it.
        params.set_field_updating_blueprint("", 1).unwrap();
        assert!(params.contains(""));
        assert!(!params.blueprint().read().contains(""));
    }

    #[test]
    fn test_equality_ignores_id() {
        let reg = registry();
        let bp = blueprint(&reg);
        let a = HyperParameters::build("a", bp.clone(), vec![("epochs", Value::from(1))]);
        let b = HyperParameters::build("b", bp.clone(), vec![("epochs", Value::from(1))]);
        let c = HyperParameters::build("a", bp, vec![("epochs", Value::from(2))]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_display_lists_nested_defaults() {
        let reg = registry();
        let mut params = HyperParameters::new("run", blueprint(&reg));
        params.set_field("optimizer", reg.resolve("torch.optim.SGD").unwrap()).unwrap();
        params.set_field("epochs", 3).unwrap();
        assert_eq!(
            params.to_string(),
            ">>> HyperParameters run <<<\nepochs = 3\noptimizer = torch.optim.sgd.SGD\n    lr = 0.01\n    momentum = 0.9"
        );
    }
}
