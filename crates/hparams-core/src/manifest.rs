//! # Class Manifests
//!
//! Declarative YAML description of a [`ClassRegistry`]: the namespaces,
//! the classes each one defines (with documentation and constructor
//! parameters) and the re-exports that make implementation classes visible
//! from shallower namespaces.
//!
//! ```yaml
//! namespaces:
//!   - name: torch.optim.sgd
//!     classes:
//!       - name: SGD
//!         doc: Implements stochastic gradient descent.
//!         params:
//!           - { name: params }
//!           - { name: lr, default: 0.001 }
//! reexports:
//!   - { namespace: torch.optim, class: torch.optim.sgd.SGD }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::class::{ClassDescriptor, Parameter};
use crate::error::{HparamsError, ResolutionError};
use crate::registry::ClassRegistry;

/// Root of a class manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassManifest {
    #[serde(default)]
    pub namespaces: Vec<NamespaceEntry>,
    #[serde(default)]
    pub reexports: Vec<ReexportEntry>,
}

/// A namespace and the classes it defines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamespaceEntry {
    pub name: String,
    #[serde(default)]
    pub classes: Vec<ClassEntry>,
}

/// One class definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    /// Constructor parameters in signature order.
    #[serde(default)]
    pub params: Vec<Parameter>,
}

/// Expose an already-defined class under another namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReexportEntry {
    pub namespace: String,
    /// Defining qualifier of the class.
    pub class: String,
}

impl ClassManifest {
    /// Parse a manifest from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self, HparamsError> {
        serde_yaml::from_str(text)
            .map_err(|e| HparamsError::Config(format!("invalid class manifest: {e}")))
    }

    /// Read and parse a manifest file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, HparamsError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            HparamsError::Config(format!("cannot read class manifest {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&text)
    }
}

impl ClassRegistry {
    /// Build a registry from a manifest.
    ///
    /// All definitions are registered before any re-export is applied, so
    /// re-exports may appear in any order relative to the namespaces.
    ///
    /// # Errors
    ///
    /// Fails on malformed identifiers, duplicate classes and re-exports of
    /// classes the manifest does not define.
    pub fn from_manifest(manifest: &ClassManifest) -> Result<Self, HparamsError> {
        let mut registry = ClassRegistry::new();
        for namespace in &manifest.namespaces {
            registry.declare_namespace(&namespace.name)?;
            for class in &namespace.classes {
                let mut descriptor = ClassDescriptor::new(&namespace.name, &class.name)
                    .with_params(class.params.iter().cloned());
                if let Some(doc) = &class.doc {
                    descriptor = descriptor.with_doc(doc);
                }
                registry.register(descriptor)?;
            }
        }
        for reexport in &manifest.reexports {
            let class = registry
                .lookup(&reexport.class)
                .ok_or_else(|| ResolutionError::new(&reexport.class))?;
            registry.reexport(&reexport.namespace, &class)?;
        }
        tracing::debug!(
            classes = registry.class_count(),
            reexports = manifest.reexports.len(),
            "built class registry from manifest"
        );
        Ok(registry)
    }

    /// Read a YAML manifest file and build a registry from it.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, HparamsError> {
        Self::from_manifest(&ClassManifest::from_yaml_file(path)?)
    }
}
