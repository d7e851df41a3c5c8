//! # Blueprints
//!
//! A [`Blueprint`] is a named schema: field name to [`Constraint`]. It is
//! built from heterogeneous [`FieldInput`]s, answers validation queries and
//! persists itself as a [`BlueprintRecord`] through a [`RecordStore`].
//!
//! Catalog-derived fields are curated once, at declaration. The curated
//! classes are what gets saved, and reloading never re-enumerates the
//! catalog.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use hparams_core::{ClassRegistry, HparamsError, RecordKind, RecordStore, SaveMode, Value};

use crate::constraint::Constraint;
use crate::input::FieldInput;
use crate::record::BlueprintRecord;

/// A named schema of constrained fields.
#[derive(Debug, Clone)]
pub struct Blueprint {
    id: String,
    registry: Arc<ClassRegistry>,
    fields: BTreeMap<String, Constraint>,
}

impl Blueprint {
    /// An empty blueprint.
    pub fn new(id: impl Into<String>, registry: Arc<ClassRegistry>) -> Self {
        Self {
            id: id.into(),
            registry,
            fields: BTreeMap::new(),
        }
    }

    /// Build a blueprint, deriving one constraint per field.
    ///
    /// # Errors
    ///
    /// - `TypeMismatch` if an input shape cannot become a constraint.
    /// - `DuplicateField` if a name is given twice.
    /// - `Resolution` if a catalog namespace is not registered.
    pub fn build<S: Into<String>>(
        id: impl Into<String>,
        registry: Arc<ClassRegistry>,
        fields: impl IntoIterator<Item = (S, FieldInput)>,
    ) -> Result<Self, HparamsError> {
        let mut blueprint = Self::new(id, registry);
        let mut seen = BTreeSet::new();
        for (name, input) in fields {
            let name = name.into();
            if !seen.insert(name.clone()) {
                return Err(HparamsError::DuplicateField { name });
            }
            blueprint.set_field(name, input)?;
        }
        tracing::debug!(id = %blueprint.id, fields = blueprint.fields.len(), "built blueprint");
        Ok(blueprint)
    }

    /// Declare or redeclare one field.
    ///
    /// On error the blueprint is unchanged.
    pub fn set_field(
        &mut self,
        name: impl Into<String>,
        input: FieldInput,
    ) -> Result<(), HparamsError> {
        let name = name.into();
        if name.is_empty() {
            return Err(HparamsError::InvalidIdentifier {
                value: name,
                reason: "field name is empty".to_string(),
            });
        }
        let constraint = input.derive(&name, &self.registry)?;
        self.fields.insert(name, constraint);
        Ok(())
    }

    /// Drop a field, returning its constraint.
    pub fn remove_field(&mut self, name: &str) -> Option<Constraint> {
        self.fields.remove(name)
    }

    /// Whether `value` satisfies the constraint of field `name`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaFieldMissing` if the field is not declared.
    pub fn check(&self, name: &str, value: &Value) -> Result<bool, HparamsError> {
        self.fields
            .get(name)
            .map(|constraint| constraint.check(value))
            .ok_or_else(|| HparamsError::SchemaFieldMissing {
                name: name.to_string(),
            })
    }

    pub fn constraint(&self, name: &str) -> Option<&Constraint> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Constraint)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn registry(&self) -> &Arc<ClassRegistry> {
        &self.registry
    }

    pub fn to_record(&self) -> BlueprintRecord {
        BlueprintRecord::from_fields(&self.id, &self.fields)
    }

    /// Write `BluePrint_<id>.json` into `store`.
    pub fn save(&self, store: &RecordStore, mode: SaveMode) -> Result<PathBuf, HparamsError> {
        store.write(RecordKind::Blueprint, &self.id, &self.to_record(), mode)
    }

    /// Merge the stored record for this blueprint's id into its fields.
    ///
    /// Every qualifier is resolved before anything is merged, so a failed
    /// load leaves the blueprint untouched.
    ///
    /// # Errors
    ///
    /// `NotFound` if no record exists, `Resolution` on an unresolvable
    /// qualifier and `MalformedRecord` on an inconsistent record.
    pub fn load(&mut self, store: &RecordStore) -> Result<(), HparamsError> {
        let record: BlueprintRecord = store.read(RecordKind::Blueprint, &self.id)?;
        if record.id != self.id {
            tracing::warn!(
                id = %self.id,
                stored_id = %record.id,
                "blueprint record carries a different id"
            );
        }
        let fields = record.into_fields(&self.registry)?;
        tracing::debug!(id = %self.id, fields = fields.len(), "merging stored blueprint");
        self.fields.extend(fields);
        Ok(())
    }

    /// Load an existing blueprint by id.
    pub fn from_store(
        id: impl Into<String>,
        registry: Arc<ClassRegistry>,
        store: &RecordStore,
    ) -> Result<Self, HparamsError> {
        let mut blueprint = Self::new(id, registry);
        blueprint.load(store)?;
        Ok(blueprint)
    }
}

/// Equal iff the same names map to equal constraints. The id is ignored.
impl PartialEq for Blueprint {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl fmt::Display for Blueprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ">>> Blueprint {} <<<", self.id)?;
        for (name, constraint) in &self.fields {
            write!(f, "\n{name} = {constraint}")?;
        }
        Ok(())
    }
}
