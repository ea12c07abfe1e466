use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::json;
use tempfile::tempdir;

use crate::loader::error::LoaderError;
use crate::loader::module::{Export, ExportKind, FnModuleSource, ModuleLoader};

struct Marker(u32);

#[test]
fn test_export_kinds() {
    assert_eq!(Export::from(json!({"a": 1})).kind(), ExportKind::PlainValue);
    assert_eq!(Export::factory(|_| None).kind(), ExportKind::CallableFactory);
    assert_eq!(Export::constructible(Marker(1)).kind(), ExportKind::ConstructibleType);

    assert!(Export::from(json!(1)).is_primitive());
    assert!(Export::from(json!("s")).is_primitive());
    assert!(Export::from(json!(null)).is_null());
    assert!(!Export::from(json!([1])).is_primitive());
    assert!(!Export::constructible(Marker(1)).is_primitive());

    let export = Export::constructible(Marker(7));
    assert_eq!(export.downcast_type::<Marker>().map(|m| m.0), Some(7));
    assert!(export.downcast_type::<String>().is_none());
    assert!(export.as_value().is_none());
}

#[test]
fn test_data_source_loads_and_caches() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, r#"{"port": 7001}"#).unwrap();

    let loader = ModuleLoader::new();
    assert!(loader.supports(&path));
    assert!(!loader.is_cached(&path));

    let first = loader.load(&path).unwrap();
    assert_eq!(first.as_value(), Some(&json!({"port": 7001})));
    assert!(loader.is_cached(&path));

    // The cache wins over later changes on disk
    fs::write(&path, r#"{"port": 9000}"#).unwrap();
    let second = loader.load(&path).unwrap();
    assert_eq!(second.as_value(), Some(&json!({"port": 7001})));
    assert_eq!(loader.cached_count(), 1);
}

#[test]
fn test_source_called_once_per_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("job.task");
    fs::write(&path, "").unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let loader = ModuleLoader::empty().with_source(FnModuleSource::new("task", move |_: &Path| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Export::constructible(Marker(3)))
    }));

    for _ in 0..3 {
        let export = loader.load(&path).unwrap();
        assert_eq!(export.kind(), ExportKind::ConstructibleType);
    }
    // Same file through a different spelling of the path
    loader.load(&dir.path().join(".").join("job.task")).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_later_source_wins() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data.json");
    fs::write(&path, "{}").unwrap();

    let loader = ModuleLoader::new().with_source(FnModuleSource::new(".json", |_: &Path| {
        Ok(Export::factory(|_| None))
    }));
    assert_eq!(loader.load(&path).unwrap().kind(), ExportKind::CallableFactory);
}

#[test]
fn test_unsupported_and_missing_files() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("script.lua");
    fs::write(&path, "return 1").unwrap();

    let loader = ModuleLoader::new();
    assert!(!loader.supports(&path));
    assert!(matches!(loader.load(&path), Err(LoaderError::UnsupportedModule { .. })));
    assert!(matches!(
        loader.load(&dir.path().join("absent.json")),
        Err(LoaderError::Io { .. })
    ));
}

#[test]
fn test_malformed_data_is_module_load_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ nope").unwrap();

    let loader = ModuleLoader::new();
    match loader.load(&path) {
        Err(LoaderError::ModuleLoad { source, .. }) => assert!(source.is_some()),
        other => panic!("Expected ModuleLoad, got {:?}", other),
    }
    assert_eq!(loader.cached_count(), 0);
}

#[test]
fn test_default_patterns() {
    assert!(ModuleLoader::empty().default_patterns().is_empty());

    let single = ModuleLoader::empty().with_source(FnModuleSource::new("task", |_: &Path| Ok(Export::factory(|_| None))));
    assert_eq!(single.default_patterns(), vec!["**/*.task".to_string()]);

    let patterns = ModuleLoader::new().default_patterns();
    assert_eq!(patterns.len(), 1);
    assert!(patterns[0].starts_with("**/*.{json"));
}

#[test]
fn test_extensions_deduplicated() {
    let loader = ModuleLoader::new().with_source(FnModuleSource::new("json", |_: &Path| Ok(Export::factory(|_| None))));
    let extensions = loader.extensions();
    assert_eq!(extensions.iter().filter(|e| e.as_str() == "json").count(), 1);
    assert_eq!(extensions[0], "json");
}

#[test]
fn test_global_is_shared() {
    assert!(std::ptr::eq(ModuleLoader::global(), ModuleLoader::global()));
    assert!(ModuleLoader::global().extensions().contains(&"json".to_string()));
}
