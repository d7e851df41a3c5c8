//! # Registry Resolution Tests
//!
//! Qualifier resolution across a registry built from a manifest file, and
//! resolution properties over generated namespace trees.

use hparams_core::{ClassDescriptor, ClassRegistry, HparamsError, IncludeNames, Parameter, Scalar};
use proptest::prelude::*;

const MANIFEST: &str = r#"
namespaces:
  - name: pkgA.pkgB.implModule
    classes:
      - name: Foo
        doc: The Foo implementation.
        params:
          - { name: size, default: 3 }
      - name: _Internal
  - name: pkgA.pkgB.other
    classes:
      - name: Bar
reexports:
  - { namespace: pkgA.pkgB, class: pkgA.pkgB.implModule.Foo }
  - { namespace: pkgA.pkgB, class: pkgA.pkgB.other.Bar }
"#;

#[test]
fn test_manifest_file_registry() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("classes.yaml");
    std::fs::write(&path, MANIFEST).unwrap();

    let registry = ClassRegistry::from_yaml_file(&path).unwrap();
    assert_eq!(registry.class_count(), 3);

    let foo = registry.resolve("pkgA.pkgB.Foo").unwrap();
    assert_eq!(foo.qualifier(), "pkgA.pkgB.implModule.Foo");
    assert_eq!(foo.parameters()[0].default, Some(Scalar::Int(3)));
    assert_eq!(registry.resolve("pkgA.pkgB.implModule.Foo").unwrap(), foo);
    assert_eq!(registry.resolve("pkgA.pkgB.movedModule.Foo").unwrap(), foo);

    let err = registry.resolve("pkgA.pkgC.implModule.Foo").unwrap_err();
    assert_eq!(err.qualifier, "pkgA.pkgC.implModule.Foo");

    let catalog = registry.catalog("pkgA.pkgB").unwrap();
    let names: Vec<&str> = catalog.candidates().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Bar", "Foo"]);
    let kept = catalog.curate(&IncludeNames::new(["Foo"]));
    assert_eq!(kept, vec![foo]);
}

#[test]
fn test_missing_manifest_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = ClassRegistry::from_yaml_file(dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, HparamsError::Config(_)));
}

fn segment() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,6}"
}

proptest! {
    #[test]
    fn test_registered_classes_resolve_by_qualifier(
        path in prop::collection::vec(segment(), 1..5),
        names in prop::collection::btree_set("[A-Z][a-zA-Z]{0,6}", 1..6),
    ) {
        let module = path.join(".");
        let mut registry = ClassRegistry::new();
        for name in &names {
            registry
                .register(ClassDescriptor::new(&module, name).with_param(Parameter::optional("k", 1)))
                .unwrap();
        }
        for name in &names {
            let qualifier = format!("{module}.{name}");
            let class = registry.resolve(&qualifier).unwrap();
            prop_assert_eq!(class.qualifier(), qualifier);
            prop_assert_eq!(registry.qualifier(&class), class.qualifier());
        }
        prop_assert_eq!(registry.catalog(&module).unwrap().len(), names.len());
    }

    #[test]
    fn test_reexported_classes_resolve_after_module_rename(
        parent in prop::collection::vec(segment(), 1..4),
        module in segment(),
        renamed in segment(),
        name in "[A-Z][a-zA-Z]{0,6}",
    ) {
        let parent = parent.join(".");
        let mut registry = ClassRegistry::new();
        let class = registry
            .register(ClassDescriptor::new(format!("{parent}.{module}"), &name))
            .unwrap();
        registry.reexport(&parent, &class).unwrap();

        let stale = format!("{parent}.{renamed}.{name}");
        prop_assert_eq!(registry.resolve(&stale).unwrap(), class);
    }
}
