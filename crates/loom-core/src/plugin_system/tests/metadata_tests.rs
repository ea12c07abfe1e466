use std::fs;
use std::path::Path;

use tempfile::tempdir;

use crate::plugin_system::descriptor::PluginDescriptor;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::metadata::merge_package_metadata;

fn plugin_at(root: &Path, name: &str) -> PluginDescriptor {
    PluginDescriptor::new(name).path(root)
}

#[test]
fn test_version_and_section_fill_empty_lists() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("package.json"),
        r#"{
            "name": "loom-session",
            "version": "2.1.0",
            "framework-plugin": {
                "name": "session",
                "dep": ["cookie"],
                "optionalDependencies": ["redis"],
                "env": ["prod"]
            }
        }"#,
    )
    .unwrap();

    let mut plugin = plugin_at(dir.path(), "session");
    merge_package_metadata(&mut plugin).unwrap();
    assert_eq!(plugin.version.as_deref(), Some("2.1.0"));
    assert_eq!(plugin.semver(), Some(semver::Version::new(2, 1, 0)));
    assert_eq!(plugin.dependencies, vec!["cookie"]);
    assert_eq!(plugin.optional_dependencies, vec!["redis"]);
    assert_eq!(plugin.env, vec!["prod"]);
}

#[test]
fn test_declared_lists_win() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("package.json"),
        r#"{"framework-plugin": {"dependencies": ["from-metadata"], "env": ["prod"]}}"#,
    )
    .unwrap();

    let mut plugin = plugin_at(dir.path(), "p").dependency("declared");
    merge_package_metadata(&mut plugin).unwrap();
    assert_eq!(plugin.dependencies, vec!["declared"]);
    assert_eq!(plugin.env, vec!["prod"]);
    assert_eq!(plugin.version, None);
}

#[test]
fn test_dependencies_preferred_over_dep() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("package.json"),
        r#"{"framework-plugin": {"dependencies": ["a"], "dep": ["b"]}}"#,
    )
    .unwrap();

    let mut plugin = plugin_at(dir.path(), "p");
    merge_package_metadata(&mut plugin).unwrap();
    assert_eq!(plugin.dependencies, vec!["a"]);
}

#[test]
fn test_missing_file_or_section_is_not_an_error() {
    let dir = tempdir().unwrap();
    let mut plugin = plugin_at(dir.path(), "bare");
    merge_package_metadata(&mut plugin).unwrap();
    assert!(plugin.dependencies.is_empty());

    fs::write(dir.path().join("package.json"), r#"{"version": "0.3.0"}"#).unwrap();
    merge_package_metadata(&mut plugin).unwrap();
    assert_eq!(plugin.version.as_deref(), Some("0.3.0"));
}

#[test]
fn test_non_semver_version_is_kept() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("package.json"), r#"{"version": "nightly"}"#).unwrap();

    let mut plugin = plugin_at(dir.path(), "p");
    merge_package_metadata(&mut plugin).unwrap();
    assert_eq!(plugin.version.as_deref(), Some("nightly"));
    assert!(plugin.semver().is_none());
}

#[cfg(feature = "toml-config")]
#[test]
fn test_toml_metadata() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("package.toml"),
        "version = \"1.0.0\"\n\n[framework-plugin]\nname = \"p\"\ndep = [\"q\"]\n",
    )
    .unwrap();

    let mut plugin = plugin_at(dir.path(), "p");
    merge_package_metadata(&mut plugin).unwrap();
    assert_eq!(plugin.dependencies, vec!["q"]);
}

#[test]
fn test_malformed_metadata() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("package.json");
    fs::write(&file, r#"{"version": ["not", "a", "string"]}"#).unwrap();

    let mut plugin = plugin_at(dir.path(), "p");
    match merge_package_metadata(&mut plugin) {
        Err(PluginSystemError::MetadataError { path, .. }) => assert_eq!(path, file),
        other => panic!("Expected MetadataError, got {:?}", other),
    }
}

#[test]
fn test_no_path_is_a_no_op() {
    let mut plugin = PluginDescriptor::new("nowhere");
    merge_package_metadata(&mut plugin).unwrap();
    assert_eq!(plugin, PluginDescriptor::new("nowhere"));
}
