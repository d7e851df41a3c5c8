//! # Hyperparameter Records
//!
//! On-disk layout of `HyperParameters_<id>.json`. Class values are stored
//! by qualifier, scalars as plain JSON literals.
//!
//! ```json
//! {
//!   "id": "run-1",
//!   "class_refs": [["optimizer", "torch.optim.sgd.SGD"]],
//!   "scalars":    [["epochs", 10], ["lr", 0.05]]
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use hparams_core::{ClassRegistry, HparamsError, Scalar, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HyperParametersRecord {
    pub id: String,
    #[serde(default)]
    pub class_refs: Vec<(String, String)>,
    #[serde(default)]
    pub scalars: Vec<(String, Scalar)>,
}

impl HyperParametersRecord {
    /// Split `values` into buckets in field-name order.
    ///
    /// NaN and infinite floats have no JSON literal; those fields are left
    /// out of the record with a warning.
    pub fn from_values(id: &str, values: &BTreeMap<String, Value>) -> Self {
        let mut record = Self {
            id: id.to_string(),
            class_refs: Vec::new(),
            scalars: Vec::new(),
        };
        for (name, value) in values {
            match value {
                Value::Class(class) => record.class_refs.push((name.clone(), class.qualifier())),
                Value::Scalar(scalar) if scalar.is_representable() => {
                    record.scalars.push((name.clone(), scalar.clone()))
                }
                Value::Scalar(scalar) => {
                    tracing::warn!(id, field = %name, value = %scalar, "omitting non-finite float from record");
                }
            }
        }
        record
    }

    /// Resolve every class reference and merge both buckets into values.
    ///
    /// # Errors
    ///
    /// `Resolution` on the first unresolvable qualifier and
    /// `MalformedRecord` if a field appears more than once.
    pub fn into_values(
        self,
        registry: &ClassRegistry,
    ) -> Result<BTreeMap<String, Value>, HparamsError> {
        let mut values = BTreeMap::new();
        for (name, qualifier) in self.class_refs {
            let class = registry.resolve(&qualifier)?;
            insert_once(&mut values, name, Value::Class(class))?;
        }
        for (name, scalar) in self.scalars {
            insert_once(&mut values, name, Value::Scalar(scalar))?;
        }
        Ok(values)
    }
}

fn insert_once(
    values: &mut BTreeMap<String, Value>,
    name: String,
    value: Value,
) -> Result<(), HparamsError> {
    if values.contains_key(&name) {
        return Err(HparamsError::MalformedRecord(format!(
            "field '{name}' appears more than once"
        )));
    }
    values.insert(name, value);
    Ok(())
}
