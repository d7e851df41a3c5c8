//! # Input Definitions
//!
//! YAML documents describing a blueprint or a hyperparameter set to create.
//!
//! ```yaml
//! # blueprint definition
//! id: train
//! fields:
//!   epochs: { type: int }
//!   dropout: { value: 0.5 }
//!   optimizer: { classes: [torch.optim.SGD, torch.optim.Adam] }
//!   scheduler: { catalog: torch.optim.lr_scheduler, exclude: [0, 2] }
//!   model: { catalog: torchvision.models, include: [resnet18, resnet50] }
//! ```
//!
//! ```yaml
//! # hyperparameter definition
//! id: run-1
//! blueprint: train
//! values:
//!   epochs: 10
//!   optimizer: { class: torch.optim.SGD }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use hparams_core::{ClassRegistry, ExcludeIndices, IncludeNames, Scalar, ScalarKind, Value};
use hparams_schema::FieldInput;

use crate::prompt::PromptCurator;

/// A blueprint to create.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlueprintDef {
    pub id: String,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldDef>,
}

/// One field declaration. Exactly one of `type`, `value`, `classes` or
/// `catalog` must be set; `include` and `exclude` only apply to catalogs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDef {
    #[serde(rename = "type")]
    pub kind: Option<ScalarKind>,
    pub value: Option<Scalar>,
    pub classes: Option<Vec<String>>,
    pub catalog: Option<String>,
    pub include: Option<Vec<String>>,
    #[serde(default)]
    pub exclude: Vec<usize>,
}

/// A hyperparameter set to create.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParamsDef {
    pub id: String,
    pub blueprint: String,
    #[serde(default)]
    pub values: BTreeMap<String, ValueDef>,
}

/// A field value: a scalar literal or `{ class: <qualifier> }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ValueDef {
    Scalar(Scalar),
    Class { class: String },
}

/// Read and parse a YAML definition file.
pub fn read_definition<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read definition: {}", path.display()))?;
    serde_yaml::from_str(&text).with_context(|| format!("failed to parse definition: {}", path.display()))
}

impl FieldDef {
    /// Turn the declaration into a field input, resolving class qualifiers.
    ///
    /// With `interactive`, catalog fields are curated on the terminal and
    /// any `include`/`exclude` lists are ignored.
    pub fn into_input(self, name: &str, registry: &ClassRegistry, interactive: bool) -> Result<FieldInput> {
        let set = [
            self.kind.is_some(),
            self.value.is_some(),
            self.classes.is_some(),
            self.catalog.is_some(),
        ]
        .into_iter()
        .filter(|&s| s)
        .count();
        if set != 1 {
            bail!("field '{name}' must set exactly one of type, value, classes or catalog");
        }
        if self.catalog.is_none() && (self.include.is_some() || !self.exclude.is_empty()) {
            bail!("field '{name}': include and exclude only apply to catalog fields");
        }

        if let Some(kind) = self.kind {
            return Ok(FieldInput::of_type(kind));
        }
        if let Some(value) = self.value {
            return Ok(FieldInput::literal(value));
        }
        if let Some(qualifiers) = self.classes {
            let classes = qualifiers
                .iter()
                .map(|q| registry.resolve(q))
                .collect::<Result<Vec<_>, _>>()
                .with_context(|| format!("field '{name}'"))?;
            return Ok(FieldInput::classes(classes));
        }
        let namespace = self.catalog.unwrap_or_default();
        Ok(match (interactive, self.include) {
            (true, _) => FieldInput::curated(namespace, PromptCurator::stdio()),
            (false, Some(names)) => FieldInput::curated(namespace, IncludeNames::new(names)),
            (false, None) if !self.exclude.is_empty() => {
                FieldInput::curated(namespace, ExcludeIndices::new(self.exclude))
            }
            (false, None) => FieldInput::catalog(namespace),
        })
    }
}

impl BlueprintDef {
    /// Field inputs in name order.
    pub fn into_inputs(
        self,
        registry: &ClassRegistry,
        interactive: bool,
    ) -> Result<Vec<(String, FieldInput)>> {
        self.fields
            .into_iter()
            .map(|(name, definition)| {
                let input = definition.into_input(&name, registry, interactive)?;
                Ok((name, input))
            })
            .collect()
    }
}

impl ValueDef {
    pub fn into_value(self, registry: &ClassRegistry) -> Result<Value> {
        match self {
            Self::Scalar(scalar) => Ok(Value::Scalar(scalar)),
            Self::Class { class } => Ok(Value::Class(registry.resolve(&class)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hparams_core::ClassDescriptor;
    use hparams_schema::Constraint;

    fn registry() -> ClassRegistry {
        let mut reg = ClassRegistry::new();
        for name in ["Adam", "SGD"] {
            let class = reg
                .register(ClassDescriptor::new(format!("torch.optim.{}", name.to_lowercase()), name))
                .unwrap();
            reg.reexport("torch.optim", &class).unwrap();
        }
        reg
    }

    #[test]
    fn test_blueprint_definition_inputs() {
        let reg = registry();
        let definition: BlueprintDef = serde_yaml::from_str(
            r#"
id: train
fields:
  epochs: { type: int }
  dropout: { value: 0.5 }
  optimizer: { classes: [torch.optim.SGD] }
  any_optimizer: { catalog: torch.optim, exclude: [1] }
"#,
        )
        .unwrap();
        assert_eq!(definition.id, "train");
        let inputs = definition.into_inputs(&reg, false).unwrap();
        let derived: Vec<(String, Constraint)> = inputs
            .into_iter()
            .map(|(name, input)| {
                let constraint = input.derive(&name, &reg).unwrap();
                (name, constraint)
            })
            .collect();

        assert_eq!(derived[0].0, "any_optimizer");
        assert_eq!(derived[0].1.classes().unwrap()[0].name(), "Adam");
        assert_eq!(derived[0].1.classes().unwrap().len(), 1);
        assert_eq!(derived[1].1, Constraint::ScalarValue(Scalar::Float(0.5)));
        assert_eq!(derived[2].1, Constraint::ScalarType(ScalarKind::Int));
        assert_eq!(derived[3].1.classes().unwrap()[0].qualifier(), "torch.optim.sgd.SGD");
    }

    #[test]
    fn test_field_definition_requires_exactly_one_shape() {
        let reg = registry();
        let both = FieldDef {
            kind: Some(ScalarKind::Int),
            value: Some(Scalar::Int(1)),
            ..FieldDef::default()
        };
        assert!(both.into_input("n", &reg, false).is_err());
        assert!(FieldDef::default().into_input("n", &reg, false).is_err());

        let stray_exclude = FieldDef {
            kind: Some(ScalarKind::Int),
            exclude: vec![0],
            ..FieldDef::default()
        };
        assert!(stray_exclude.into_input("n", &reg, false).is_err());
    }

    #[test]
    fn test_unknown_class_names_the_field() {
        let definition = FieldDef {
            classes: Some(vec!["torch.optim.Nadam".to_string()]),
            ..FieldDef::default()
        };
        let err = definition.into_input("optimizer", &registry(), false).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("optimizer"));
        assert!(msg.contains("torch.optim.Nadam"));
    }

    #[test]
    fn test_params_definition_values() {
        let reg = registry();
        let definition: ParamsDef = serde_yaml::from_str(
            r#"
id: run-1
blueprint: train
values:
  epochs: 10
  lr: 0.05
  amsgrad: true
  name: baseline
  optimizer: { class: torch.optim.Adam }
"#,
        )
        .unwrap();
        assert_eq!(definition.blueprint, "train");
        let values: BTreeMap<String, Value> = definition
            .values
            .into_iter()
            .map(|(k, v)| (k, v.into_value(&reg).unwrap()))
            .collect();
        assert_eq!(values["epochs"], Value::from(10));
        assert_eq!(values["lr"], Value::from(0.05));
        assert_eq!(values["amsgrad"], Value::from(true));
        assert_eq!(values["name"], Value::from("baseline"));
        assert_eq!(values["optimizer"].as_class().unwrap().name(), "Adam");
    }
}
