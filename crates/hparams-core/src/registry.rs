//! # Class Registry — Qualifier Resolution
//!
//! The registry is the explicit replacement for importing modules and
//! evaluating dotted names. It maps namespaces to their public members and
//! is the only whitelist of "import roots": a qualifier whose namespace was
//! never registered cannot resolve, whatever it looks like.
//!
//! ## Two-Tier Resolution
//!
//! A class is persisted under the namespace that *defines* it, but
//! libraries commonly re-export classes one level up from their
//! implementation file (`torch.optim.sgd.SGD` is public as
//! `torch.optim.SGD`). [`ClassRegistry::resolve`] therefore:
//!
//! 1. looks up the full qualifier as given;
//! 2. on failure, drops the last-but-one segment and retries.
//!
//! If both tiers fail the result is a [`ResolutionError`] naming the
//! qualifier exactly as given.

use std::collections::{BTreeMap, BTreeSet};

use crate::class::{ClassDescriptor, ClassRef};
use crate::curate::{Candidate, Catalog};
use crate::error::{HparamsError, ResolutionError};

/// Namespace tree of registered classes.
#[derive(Debug, Clone, Default)]
pub struct ClassRegistry {
    /// Namespace path -> member name -> class. Members include both classes
    /// defined in the namespace and classes re-exported into it.
    namespaces: BTreeMap<String, BTreeMap<String, ClassRef>>,
}

impl ClassRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a namespace (and all of its ancestors) without adding members.
    ///
    /// # Errors
    ///
    /// Returns `InvalidIdentifier` if any segment of `namespace` is malformed.
    pub fn declare_namespace(&mut self, namespace: &str) -> Result<(), HparamsError> {
        validate_path(namespace)?;
        let mut prefix = String::new();
        for segment in namespace.split('.') {
            if !prefix.is_empty() {
                prefix.push('.');
            }
            prefix.push_str(segment);
            self.namespaces.entry(prefix.clone()).or_default();
        }
        Ok(())
    }

    /// Register a class in its defining namespace.
    ///
    /// # Errors
    ///
    /// Returns `InvalidIdentifier` for a malformed module path or class name
    /// and `DuplicateClass` if the qualifier is already taken, either by a
    /// definition or by a re-export.
    pub fn register(&mut self, descriptor: ClassDescriptor) -> Result<ClassRef, HparamsError> {
        validate_segment(descriptor.name())?;
        let qualifier = descriptor.qualifier();
        if self.lookup(&qualifier).is_some() {
            return Err(HparamsError::DuplicateClass { qualifier });
        }
        let module = descriptor.module().to_string();
        let name = descriptor.name().to_string();
        self.declare_namespace(&module)?;

        let class = ClassRef::new(descriptor);
        self.namespaces
            .entry(module)
            .or_default()
            .insert(name, class.clone());
        Ok(class)
    }

    /// Expose `class` as a member of `namespace`.
    ///
    /// Re-exporting a class into a namespace that already exposes it is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns `Resolution` if `class` was not registered here and
    /// `DuplicateClass` if `namespace` already has a different member of the
    /// same name.
    pub fn reexport(&mut self, namespace: &str, class: &ClassRef) -> Result<(), HparamsError> {
        if self.lookup(&class.qualifier()).as_ref() != Some(class) {
            return Err(ResolutionError::new(class.qualifier()).into());
        }
        self.declare_namespace(namespace)?;
        let members = self.namespaces.entry(namespace.to_string()).or_default();
        match members.get(class.name()) {
            Some(existing) if existing == class => Ok(()),
            Some(_) => Err(HparamsError::DuplicateClass {
                qualifier: format!("{namespace}.{}", class.name()),
            }),
            None => {
                members.insert(class.name().to_string(), class.clone());
                Ok(())
            }
        }
    }

    /// Canonical qualifier of `class`: its defining namespace and name.
    pub fn qualifier(&self, class: &ClassRef) -> String {
        class.qualifier()
    }

    /// Single-tier lookup of a qualifier exactly as given.
    pub fn lookup(&self, qualifier: &str) -> Option<ClassRef> {
        let (namespace, name) = qualifier.rsplit_once('.')?;
        self.namespaces.get(namespace)?.get(name).cloned()
    }

    /// Resolve a qualifier to a class using the two-tier rule.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError`] if neither the qualifier nor its collapsed
    /// form names a registered member.
    pub fn resolve(&self, qualifier: &str) -> Result<ClassRef, ResolutionError> {
        if let Some(class) = self.lookup(qualifier) {
            return Ok(class);
        }
        if let Some(collapsed) = collapse_qualifier(qualifier) {
            if let Some(class) = self.lookup(&collapsed) {
                tracing::debug!(qualifier, resolved = %collapsed, "resolved qualifier through re-export");
                return Ok(class);
            }
        }
        Err(ResolutionError::new(qualifier))
    }

    /// Enumerate the public classes of `namespace` as a catalog.
    ///
    /// Members whose name contains `__` or starts or ends with `_` are
    /// internal and skipped. The remaining public members are numbered
    /// `0..n` in member-name order, so an index is a position among public
    /// members only and never counts a skipped name. The numbering is stable
    /// for a given registry, which is what lets [`ExcludeIndices`] curators
    /// be persisted and replayed.
    ///
    /// [`ExcludeIndices`]: crate::ExcludeIndices
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError`] naming `namespace` if it is not registered.
    pub fn catalog(&self, namespace: &str) -> Result<Catalog, ResolutionError> {
        let members = self
            .namespaces
            .get(namespace)
            .ok_or_else(|| ResolutionError::new(namespace))?;
        let candidates: Vec<Candidate> = members
            .iter()
            .filter(|(name, _)| is_public(name))
            .enumerate()
            .map(|(index, (name, class))| Candidate {
                index,
                name: name.clone(),
                class: class.clone(),
            })
            .collect();
        tracing::debug!(namespace, count = candidates.len(), "enumerated catalog");
        Ok(Catalog::new(namespace.to_string(), candidates))
    }

    /// Whether `namespace` has been declared.
    pub fn contains_namespace(&self, namespace: &str) -> bool {
        self.namespaces.contains_key(namespace)
    }

    /// All declared namespaces, sorted. Used to list what can be catalogued.
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.namespaces.keys().map(String::as_str)
    }

    /// Top-level segments of every declared namespace, for pointing a user
    /// at valid starting points after a lookup miss.
    pub fn roots(&self) -> BTreeSet<&str> {
        self.namespaces
            .keys()
            .filter_map(|ns| ns.split('.').next())
            .collect()
    }

    /// Number of classes defined (not merely re-exported) in the registry.
    pub fn class_count(&self) -> usize {
        self.namespaces
            .iter()
            .map(|(ns, members)| members.values().filter(|c| c.module() == ns).count())
            .sum()
    }
}

/// Drop the last-but-one segment: `a.b.impl.Foo` -> `a.b.Foo`.
fn collapse_qualifier(qualifier: &str) -> Option<String> {
    let parts: Vec<&str> = qualifier.split('.').collect();
    if parts.len() < 3 {
        return None;
    }
    let mut kept = parts[..parts.len() - 2].to_vec();
    kept.push(parts[parts.len() - 1]);
    Some(kept.join("."))
}

fn is_public(name: &str) -> bool {
    !name.contains("__") && !name.starts_with('_') && !name.ends_with('_')
}

fn validate_path(path: &str) -> Result<(), HparamsError> {
    path.split('.').try_for_each(validate_segment).map_err(|_| {
        HparamsError::InvalidIdentifier {
            value: path.to_string(),
            reason: "namespace segments must be non-empty identifiers".to_string(),
        }
    })
}

fn validate_segment(segment: &str) -> Result<(), HparamsError> {
    let mut chars = segment.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_alphabetic() || first == '_')
                && chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(HparamsError::InvalidIdentifier {
            value: segment.to_string(),
            reason: "expected a letter or '_' followed by letters, digits or '_'".to_string(),
        })
    }
}
