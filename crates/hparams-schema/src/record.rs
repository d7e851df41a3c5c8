//! # Blueprint Records
//!
//! The persisted form of a blueprint. Fields are split into buckets by
//! constraint variant; class references are stored as qualifiers and
//! resolved through the registry on load.
//!
//! ```json
//! {
//!   "id": "test",
//!   "scalar_types":  [["epochs", "builtins.int"]],
//!   "scalar_values": [["dropout", 0.5]],
//!   "class_lists":   [["optimizer", ["torch.optim.sgd.SGD", "torch.optim.adam.Adam"]]]
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use hparams_core::{ClassRegistry, HparamsError, Scalar, ScalarKind};

use crate::constraint::Constraint;

/// On-disk layout of `BluePrint_<id>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlueprintRecord {
    pub id: String,
    #[serde(default)]
    pub scalar_types: Vec<(String, String)>,
    #[serde(default)]
    pub scalar_values: Vec<(String, Scalar)>,
    #[serde(default)]
    pub class_lists: Vec<(String, Vec<String>)>,
}

impl BlueprintRecord {
    /// Split `fields` into buckets, each in field-name order.
    pub fn from_fields(id: &str, fields: &BTreeMap<String, Constraint>) -> Self {
        let mut record = Self {
            id: id.to_string(),
            scalar_types: Vec::new(),
            scalar_values: Vec::new(),
            class_lists: Vec::new(),
        };
        for (name, constraint) in fields {
            match constraint {
                Constraint::ScalarType(kind) => record
                    .scalar_types
                    .push((name.clone(), kind.qualifier().to_string())),
                Constraint::ScalarValue(literal) => {
                    record.scalar_values.push((name.clone(), literal.clone()))
                }
                Constraint::ClassSet(classes) => record.class_lists.push((
                    name.clone(),
                    classes.iter().map(|c| c.qualifier()).collect(),
                )),
            }
        }
        record
    }

    /// Resolve every bucket back into constraints.
    ///
    /// # Errors
    ///
    /// Fails with `Resolution` on the first qualifier that resolves at
    /// neither tier and `MalformedRecord` if a field appears more than once.
    pub fn into_fields(
        self,
        registry: &ClassRegistry,
    ) -> Result<BTreeMap<String, Constraint>, HparamsError> {
        let mut fields = BTreeMap::new();
        for (name, qualifier) in self.scalar_types {
            let kind = ScalarKind::from_qualifier(&qualifier)?;
            insert_once(&mut fields, name, Constraint::ScalarType(kind))?;
        }
        for (name, literal) in self.scalar_values {
            insert_once(&mut fields, name, Constraint::ScalarValue(literal))?;
        }
        for (name, qualifiers) in self.class_lists {
            let classes = qualifiers
                .iter()
                .map(|q| registry.resolve(q))
                .collect::<Result<Vec<_>, _>>()?;
            insert_once(&mut fields, name, Constraint::ClassSet(classes))?;
        }
        Ok(fields)
    }
}

fn insert_once(
    fields: &mut BTreeMap<String, Constraint>,
    name: String,
    constraint: Constraint,
) -> Result<(), HparamsError> {
    if fields.contains_key(&name) {
        return Err(HparamsError::MalformedRecord(format!(
            "field '{name}' appears in more than one bucket"
        )));
    }
    fields.insert(name, constraint);
    Ok(())
}
