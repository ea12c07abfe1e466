use std::path::PathBuf;

use crate::plugin_system::descriptor::PluginDescriptor;
use crate::plugin_system::registry::PluginRegistry;

fn registry(plugins: Vec<PluginDescriptor>) -> PluginRegistry {
    plugins.into_iter().collect()
}

#[test]
fn test_insertion_order_is_kept() {
    let mut reg = registry(vec![
        PluginDescriptor::new("zeta"),
        PluginDescriptor::new("alpha"),
        PluginDescriptor::new("mid").enable(false),
    ]);
    assert_eq!(reg.names(), vec!["zeta", "alpha", "mid"]);
    assert_eq!(reg.enabled_names(), vec!["zeta", "alpha"]);

    // Replacing keeps the original slot
    reg.insert(PluginDescriptor::new("zeta").enable(false));
    assert_eq!(reg.names(), vec!["zeta", "alpha", "mid"]);
    assert_eq!(reg.enabled_names(), vec!["alpha"]);
    assert_eq!(reg.len(), 3);
    assert!(reg.contains("mid"));
    assert!(reg.get("nope").is_none());
}

#[test]
fn test_enable_precedence_across_sources() {
    let framework = registry(vec![PluginDescriptor::new("a").enable(true)]);
    let application = registry(vec![PluginDescriptor::new("a").enable(false)]);
    let custom = registry(vec![PluginDescriptor::new("a").enable(true)]);

    let mut all = PluginRegistry::new();
    all.extend(&framework);
    all.extend(&application);
    assert!(!all.get("a").unwrap().enable);
    all.extend(&custom);
    assert!(all.get("a").unwrap().enable);
}

#[test]
fn test_empty_list_never_clears() {
    let mut all = registry(vec![PluginDescriptor::new("a").dependency("b").env("prod")]);
    all.merge(&PluginDescriptor::new("a"));
    let a = all.get("a").unwrap();
    assert_eq!(a.dependencies, vec!["b"]);
    assert_eq!(a.env, vec!["prod"]);

    all.merge(&PluginDescriptor::new("a").dependency("c"));
    assert_eq!(all.get("a").unwrap().dependencies, vec!["c"]);
}

#[test]
fn test_path_or_package_clears_both() {
    let mut all = registry(vec![PluginDescriptor::new("a").package("pkg-a")]);
    all.merge(&PluginDescriptor::new("a").path("/local/a"));
    let a = all.get("a").unwrap();
    assert_eq!(a.package, None);
    assert_eq!(a.path, Some(PathBuf::from("/local/a")));

    all.merge(&PluginDescriptor::new("a").package("pkg-b"));
    let a = all.get("a").unwrap();
    assert_eq!(a.package.as_deref(), Some("pkg-b"));
    assert_eq!(a.path, None);

    // Neither set: both survive
    all.merge(&PluginDescriptor::new("a").enable(false));
    assert_eq!(all.get("a").unwrap().package.as_deref(), Some("pkg-b"));
}

#[test]
fn test_from_and_new_names() {
    let mut all = registry(vec![PluginDescriptor::new("a").from_file("/fw/config/plugin.default.json")]);
    all.merge(&PluginDescriptor::new("a"));
    assert_eq!(all.get("a").unwrap().from, Some(PathBuf::from("/fw/config/plugin.default.json")));

    all.merge(&PluginDescriptor::new("a").from_file("/app/config/plugin.default.json"));
    all.merge(&PluginDescriptor::new("b"));
    assert_eq!(all.get("a").unwrap().from, Some(PathBuf::from("/app/config/plugin.default.json")));
    assert_eq!(all.names(), vec!["a", "b"]);
}

#[test]
fn test_duplicate_package_is_not_fatal() {
    let mut all = registry(vec![PluginDescriptor::new("a").package("same")]);
    all.merge(&PluginDescriptor::new("a").package("same").enable(false));
    let a = all.get("a").unwrap();
    assert_eq!(a.package.as_deref(), Some("same"));
    assert!(!a.enable);
}

#[test]
fn test_partition_by_env() {
    let all = registry(vec![
        PluginDescriptor::new("everywhere"),
        PluginDescriptor::new("prod_only").env("production"),
        PluginDescriptor::new("test_too").env("production").env("test"),
    ]);

    let (candidates, excluded) = all.partition_by_env("test");
    assert_eq!(candidates.names(), vec!["everywhere", "test_too"]);
    assert_eq!(excluded.len(), 1);
    assert_eq!(excluded[0].name, "prod_only");
    assert!(!excluded[0].enable);

    // The input registry is untouched
    assert!(all.get("prod_only").unwrap().enable);
}

#[test]
fn test_iter_mut_updates_in_place() {
    let mut all = registry(vec![PluginDescriptor::new("a"), PluginDescriptor::new("b")]);
    for (_, plugin) in all.iter_mut() {
        plugin.version = Some("1.0.0".into());
    }
    assert!(all.descriptors().all(|p| p.version.as_deref() == Some("1.0.0")));
    if let Some(b) = all.get_mut("b") {
        b.enable = false;
    }
    assert_eq!(all.enabled_names(), vec!["a"]);
    assert!(!all.is_empty());
}
