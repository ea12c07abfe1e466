use std::path::{Path, PathBuf};

use serde_json::json;

use crate::loader::error::LoaderError;
use crate::loader::module::Export;
use crate::loader::namespace::{NamespaceTree, Node};

fn segs(dotted: &str) -> Vec<String> {
    dotted.split('.').map(String::from).collect()
}

fn origin(name: &str) -> PathBuf {
    Path::new("/app/service").join(name)
}

#[test]
fn test_attach_creates_intermediate_namespaces() {
    let mut tree = NamespaceTree::new();
    tree.attach(&segs("group.repository"), json!({"id": 1}).into(), &origin("group/repository.json"), false)
        .unwrap();
    tree.attach(&segs("group.user"), json!({"id": 2}).into(), &origin("group/user.json"), false)
        .unwrap();

    match tree.get(&["group"]) {
        Some(Node::Namespace(ns)) => {
            assert_eq!(ns.keys().cloned().collect::<Vec<_>>(), vec!["repository", "user"]);
        }
        other => panic!("Expected namespace, got {:?}", other),
    }
    assert_eq!(tree.leaf("group.user").and_then(Export::as_value), Some(&json!({"id": 2})));
    assert!(tree.leaf("group").is_none());
    assert!(tree.leaf("group.missing").is_none());
    assert_eq!(tree.leaf_paths(), vec!["group.repository", "group.user"]);
}

#[test]
fn test_collision_without_override() {
    let mut tree = NamespaceTree::new();
    tree.attach(&segs("foo"), json!({}).into(), &origin("foo.json"), false).unwrap();

    let err = tree
        .attach(&segs("foo"), json!({}).into(), &origin("foo.yaml"), false)
        .unwrap_err();
    match &err {
        LoaderError::Collision { property, existing, incoming } => {
            assert_eq!(property, "foo");
            assert_eq!(existing.as_deref(), Some(origin("foo.json").as_path()));
            assert_eq!(incoming, &origin("foo.yaml"));
        }
        other => panic!("Expected Collision, got {:?}", other),
    }
    assert!(err.to_string().starts_with("can't overwrite property 'foo' from "));
}

#[test]
fn test_override_replaces_and_moves_provenance() {
    let mut tree = NamespaceTree::new();
    tree.attach(&segs("foo"), json!({"v": 1}).into(), &origin("foo.json"), false).unwrap();
    tree.attach(&segs("foo"), json!({"v": 2}).into(), &origin("other/foo.json"), true).unwrap();

    assert_eq!(tree.leaf("foo").and_then(Export::as_value), Some(&json!({"v": 2})));
    let provenance = tree.provenance("foo").unwrap();
    assert_eq!(provenance.origin, origin("other/foo.json"));
    assert!(provenance.loaded);
}

#[test]
fn test_primitive_leaves_have_no_provenance() {
    let mut tree = NamespaceTree::new();
    tree.attach(&segs("port"), json!({"value": 1}).into(), &origin("port.json"), false).unwrap();
    assert!(tree.provenance("port").is_some());

    // A primitive replacement drops the stale entry
    tree.attach(&segs("port"), json!(8080).into(), &origin("port.toml"), true).unwrap();
    assert!(tree.provenance("port").is_none());

    let collision = tree
        .attach(&segs("port"), json!(1).into(), &origin("port.yaml"), false)
        .unwrap_err();
    assert!(matches!(collision, LoaderError::Collision { existing: None, .. }));
    assert!(collision.to_string().contains("<namespace>"));
}

#[test]
fn test_leaf_in_non_terminal_position_always_collides() {
    let mut tree = NamespaceTree::new();
    tree.attach(&segs("a"), json!({}).into(), &origin("a.json"), false).unwrap();

    for override_existing in [false, true] {
        let err = tree
            .attach(&segs("a.b"), json!({}).into(), &origin("a/b.json"), override_existing)
            .unwrap_err();
        match err {
            LoaderError::Collision { property, existing, .. } => {
                assert_eq!(property, "a");
                assert_eq!(existing, Some(origin("a.json")));
            }
            other => panic!("Expected Collision, got {:?}", other),
        }
    }
}

#[test]
fn test_existing_namespace_at_terminal_needs_override() {
    let mut tree = NamespaceTree::new();
    tree.attach(&segs("a.b"), json!({}).into(), &origin("a/b.json"), false).unwrap();

    assert!(tree.attach(&segs("a"), json!({}).into(), &origin("a.json"), false).is_err());
    tree.attach(&segs("a"), json!({}).into(), &origin("a.json"), true).unwrap();
    assert!(tree.leaf("a").is_some());
    assert!(tree.leaf("a.b").is_none());
}

#[test]
fn test_leaf_over_namespace_drops_nested_provenance() {
    let mut tree = NamespaceTree::new();
    tree.attach(&segs("foo.bar"), json!({}).into(), &origin("foo/bar.json"), false).unwrap();
    tree.attach(&segs("foobar"), json!({}).into(), &origin("foobar.json"), false).unwrap();
    assert!(tree.provenance("foo.bar").is_some());

    tree.attach(&segs("foo"), json!({"id": 1}).into(), &origin("foo.json"), true).unwrap();

    assert!(tree.leaf("foo.bar").is_none());
    assert!(tree.provenance("foo.bar").is_none());
    assert_eq!(tree.provenance("foo").map(|p| p.origin.clone()), Some(origin("foo.json")));
    assert!(tree.provenance("foobar").is_some());
}

#[test]
fn test_empty_segments_rejected() {
    let mut tree = NamespaceTree::new();
    let err = tree.attach(&[], json!({}).into(), &origin("x.json"), false).unwrap_err();
    assert!(matches!(err, LoaderError::InvalidSegments { .. }));
    assert!(tree.is_empty());
}
