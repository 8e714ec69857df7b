#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use pretty_assertions::assert_eq;

#[test]
fn first_location_wins() {
    let path = LoadPath::new()
        .with(MemoryLocation::new().add("a", "first"))
        .with(
            MemoryLocation::new()
                .add("a", "second")
                .add("b", "only")
                .with_native_functions(true),
        );

    let a = path.resolve("a").unwrap();
    assert_eq!(&*a.source, "first");
    assert!(!a.allow_native_functions);

    let b = path.resolve("b").unwrap();
    assert_eq!(&*b.source, "only");
    assert!(b.allow_native_functions);
}

#[test]
fn missing_units_are_not_found() {
    let path = LoadPath::new().with(MemoryLocation::new());
    let err = path.resolve("nope").unwrap_err();
    assert!(matches!(err, LoadError::NotFound { unit } if &*unit == "nope"));
}

#[test]
fn filesystem_location_adds_the_default_extension() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("lib")).unwrap();
    std::fs::write(dir.path().join("lib/util.rill"), "library util {}").unwrap();

    let location = FilesystemLocation::new(dir.path());
    assert_eq!(location.load("lib/util").unwrap().as_deref(), Some("library util {}"));
    assert_eq!(location.load("lib/util.rill").unwrap().as_deref(), Some("library util {}"));
    assert_eq!(location.load("lib/missing").unwrap(), None);
    assert_eq!(location.load("../escape").unwrap(), None);
    assert!(!location.allow_native_functions());
}

#[test]
fn filesystem_location_custom_extension() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("main.tf"), "x").unwrap();
    let location = FilesystemLocation::new(dir.path()).extension(".tf");
    assert_eq!(location.load("main").unwrap().as_deref(), Some("x"));
}

#[test]
fn relative_imports_resolve_against_the_importer() {
    assert_eq!(&*resolve_import("app/main", "./util"), "app/util");
    assert_eq!(&*resolve_import("app/main", "../shared/util"), "shared/util");
    assert_eq!(&*resolve_import("main", "./util"), "util");
    assert_eq!(&*resolve_import("main", "../util"), "../util");
    assert_eq!(&*resolve_import("app/main", "std/strings"), "std/strings");
}

#[test]
fn native_policy_is_queryable_on_each_location() {
    let memory = MemoryLocation::new();
    assert!(!memory.allow_native_functions());
    assert!(memory.with_native_functions(true).allow_native_functions());

    let dir = tempfile::tempdir().unwrap();
    let filesystem = FilesystemLocation::new(dir.path()).with_native_functions(true);
    assert!(filesystem.allow_native_functions());
}
