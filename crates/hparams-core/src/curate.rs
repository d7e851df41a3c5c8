//! # Catalogs and Curation
//!
//! A [`Catalog`] is the ephemeral list of public classes found in one
//! registry namespace. It is consumed exactly once, when a blueprint field is
//! declared from it: a [`Curator`] decides which candidates to retain, and the
//! retained classes are frozen (in enumeration order) into the field's
//! constraint. Catalogs are never re-enumerated when a blueprint is reloaded.
//!
//! Curation is a pure function supplied by the caller. The policies here
//! cover the non-interactive cases; terminal prompting lives with the CLI.

use std::collections::BTreeSet;
use std::fmt;

use crate::class::ClassRef;

/// One enumerated catalog entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Position in the catalog, as presented to the curator.
    pub index: usize,
    /// Member name under which the namespace exposes the class.
    pub name: String,
    /// The class itself.
    pub class: ClassRef,
}

impl Candidate {
    /// One-line description of the class.
    pub fn summary(&self) -> &str {
        self.class.summary()
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.index, self.name, self.summary())
    }
}

/// The public classes of one namespace, indexed for curation.
#[derive(Debug, Clone)]
pub struct Catalog {
    namespace: String,
    candidates: Vec<Candidate>,
}

impl Catalog {
    pub(crate) fn new(namespace: String, candidates: Vec<Candidate>) -> Self {
        Self {
            namespace,
            candidates,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Every candidate class, uncurated.
    pub fn classes(&self) -> Vec<ClassRef> {
        self.candidates.iter().map(|c| c.class.clone()).collect()
    }

    /// Run `curator` and freeze the retained classes in enumeration order.
    ///
    /// Indices outside the catalog are reported and ignored; repeated indices
    /// collapse.
    pub fn curate(&self, curator: &dyn Curator) -> Vec<ClassRef> {
        let retained: BTreeSet<usize> = curator
            .curate(&self.namespace, &self.candidates)
            .into_iter()
            .filter(|&index| {
                let in_range = index < self.candidates.len();
                if !in_range {
                    tracing::warn!(
                        namespace = %self.namespace,
                        index,
                        "curator retained an index outside the catalog, ignoring"
                    );
                }
                in_range
            })
            .collect();
        let included: Vec<ClassRef> = self
            .candidates
            .iter()
            .filter(|c| retained.contains(&c.index))
            .map(|c| c.class.clone())
            .collect();
        tracing::info!(
            namespace = %self.namespace,
            retained = included.len(),
            offered = self.candidates.len(),
            "curated catalog"
        );
        included
    }
}

/// Decides which catalog candidates a blueprint field retains.
pub trait Curator {
    /// Return the indices of the candidates to retain.
    fn curate(&self, namespace: &str, candidates: &[Candidate]) -> Vec<usize>;
}

impl<F> Curator for F
where
    F: Fn(&str, &[Candidate]) -> Vec<usize>,
{
    fn curate(&self, namespace: &str, candidates: &[Candidate]) -> Vec<usize> {
        self(namespace, candidates)
    }
}

/// Retain every candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct IncludeAll;

impl Curator for IncludeAll {
    fn curate(&self, _namespace: &str, candidates: &[Candidate]) -> Vec<usize> {
        candidates.iter().map(|c| c.index).collect()
    }
}

/// Retain everything except the listed indices.
#[derive(Debug, Clone, Default)]
pub struct ExcludeIndices(BTreeSet<usize>);

impl ExcludeIndices {
    pub fn new(indices: impl IntoIterator<Item = usize>) -> Self {
        Self(indices.into_iter().collect())
    }
}

impl Curator for ExcludeIndices {
    fn curate(&self, namespace: &str, candidates: &[Candidate]) -> Vec<usize> {
        for &index in self.0.iter().filter(|&&i| i >= candidates.len()) {
            tracing::warn!(namespace, index, "could not remove index from catalog");
        }
        candidates
            .iter()
            .map(|c| c.index)
            .filter(|i| !self.0.contains(i))
            .collect()
    }
}

/// Retain exactly the named classes: the pre-supplied final include list.
///
/// A name matches either the member name or the class qualifier.
#[derive(Debug, Clone, Default)]
pub struct IncludeNames(Vec<String>);

impl IncludeNames {
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self(names.into_iter().map(Into::into).collect())
    }
}

impl Curator for IncludeNames {
    fn curate(&self, namespace: &str, candidates: &[Candidate]) -> Vec<usize> {
        for name in &self.0 {
            if !candidates.iter().any(|c| names_candidate(name, c)) {
                tracing::warn!(namespace, name = %name, "included class not found in catalog");
            }
        }
        candidates
            .iter()
            .filter(|c| self.0.iter().any(|name| names_candidate(name, c)))
            .map(|c| c.index)
            .collect()
    }
}

fn names_candidate(name: &str, candidate: &Candidate) -> bool {
    candidate.name == name || candidate.class.qualifier() == name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::ClassDescriptor;
    use crate::registry::ClassRegistry;

    fn catalog() -> Catalog {
        let mut reg = ClassRegistry::new();
        for name in ["A", "B", "C", "D"] {
            reg.register(ClassDescriptor::new("dummy", name).with_doc(format!("Class {name}.")))
                .unwrap();
        }
        reg.catalog("dummy").unwrap()
    }

    fn names(classes: &[ClassRef]) -> Vec<&str> {
        classes.iter().map(|c| c.name()).collect()
    }

    #[test]
    fn test_include_all() {
        assert_eq!(names(&catalog().curate(&IncludeAll)), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_exclude_indices_ignores_out_of_range() {
        let kept = catalog().curate(&ExcludeIndices::new([1, 3, 17]));
        assert_eq!(names(&kept), vec!["A", "C"]);
    }

    #[test]
    fn test_include_names_keeps_enumeration_order() {
        let kept = catalog().curate(&IncludeNames::new(["D", "dummy.B", "Missing"]));
        assert_eq!(names(&kept), vec!["B", "D"]);
    }

    #[test]
    fn test_closure_curator_out_of_range_and_duplicates() {
        let curator = |_: &str, _: &[Candidate]| vec![2, 0, 2, 9];
        assert_eq!(names(&catalog().curate(&curator)), vec!["A", "C"]);
    }

    #[test]
    fn test_candidate_display() {
        let cat = catalog();
        assert_eq!(cat.candidates()[2].to_string(), "2: C (Class C.)");
        assert_eq!(cat.namespace(), "dummy");
        assert_eq!(cat.len(), 4);
    }
}
