use std::collections::HashMap;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::loader::error::LoaderError;
use crate::loader::module::Export;

/// One entry of a [`Namespace`].
#[derive(Debug, Clone)]
pub enum Node {
    Namespace(Namespace),
    Leaf(Export),
}

/// A level of the namespace tree, keeping entries in attach order.
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    entries: IndexMap<String, Node>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, segment: &str) -> Option<&Node> {
        self.entries.get(segment)
    }

    pub fn contains(&self, segment: &str) -> bool {
        self.entries.contains_key(segment)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Node)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Where a leaf came from. Diagnostic only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    /// The file the leaf was loaded from.
    pub origin: PathBuf,
    /// Set for leaves produced by a convention load.
    pub loaded: bool,
}

/// The caller-owned tree that file-derived property paths are attached to.
///
/// Provenance is kept in a side table keyed by the dotted namespace path, so
/// attached values are never modified.
#[derive(Debug, Clone, Default)]
pub struct NamespaceTree {
    root: Namespace,
    provenance: HashMap<String, Provenance>,
}

impl NamespaceTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> &Namespace {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Attach `value` at `segments`, creating intermediate namespaces.
    ///
    /// An occupied terminal entry is replaced only when `override_existing`
    /// is set. A leaf in a non-terminal position is always a collision.
    pub fn attach(
        &mut self,
        segments: &[String],
        value: Export,
        origin: &Path,
        override_existing: bool,
    ) -> Result<(), LoaderError> {
        let Some((last, parents)) = segments.split_last() else {
            return Err(LoaderError::InvalidSegments { path: origin.display().to_string() });
        };

        let mut current = &mut self.root;
        for (index, segment) in parents.iter().enumerate() {
            let node = current
                .entries
                .entry(segment.clone())
                .or_insert_with(|| Node::Namespace(Namespace::new()));
            current = match node {
                Node::Namespace(ns) => ns,
                Node::Leaf(_) => {
                    let property = segments[..=index].join(".");
                    return Err(LoaderError::Collision {
                        existing: self.provenance.get(&property).map(|p| p.origin.clone()),
                        property,
                        incoming: origin.to_path_buf(),
                    });
                }
            };
        }

        let property = segments.join(".");
        if current.entries.contains_key(last) && !override_existing {
            return Err(LoaderError::Collision {
                existing: self.provenance.get(&property).map(|p| p.origin.clone()),
                property,
                incoming: origin.to_path_buf(),
            });
        }

        let primitive = value.is_primitive();
        if let Some(Node::Namespace(_)) = current.entries.insert(last.clone(), Node::Leaf(value)) {
            let prefix = format!("{}.", property);
            self.provenance.retain(|key, _| !key.starts_with(&prefix));
        }
        if primitive {
            self.provenance.remove(&property);
        } else {
            self.provenance.insert(
                property.clone(),
                Provenance { origin: origin.to_path_buf(), loaded: true },
            );
        }
        log::debug!("loaded {}", property);
        Ok(())
    }

    /// Look up a node by its segments.
    pub fn get<S: AsRef<str>>(&self, segments: &[S]) -> Option<&Node> {
        let (last, parents) = segments.split_last()?;
        let mut current = &self.root;
        for segment in parents {
            match current.get(segment.as_ref())? {
                Node::Namespace(ns) => current = ns,
                Node::Leaf(_) => return None,
            }
        }
        current.get(last.as_ref())
    }

    /// Look up a leaf by dotted path, e.g. `"group.repository"`.
    pub fn leaf(&self, dotted: &str) -> Option<&Export> {
        let segments: Vec<&str> = dotted.split('.').collect();
        match self.get(&segments)? {
            Node::Leaf(export) => Some(export),
            Node::Namespace(_) => None,
        }
    }

    pub fn provenance(&self, dotted: &str) -> Option<&Provenance> {
        self.provenance.get(dotted)
    }

    /// Dotted paths of every leaf, depth first in attach order.
    pub fn leaf_paths(&self) -> Vec<String> {
        fn walk(ns: &Namespace, prefix: &str, out: &mut Vec<String>) {
            for (key, node) in ns.iter() {
                let path = if prefix.is_empty() { key.clone() } else { format!("{}.{}", prefix, key) };
                match node {
                    Node::Leaf(_) => out.push(path),
                    Node::Namespace(child) => walk(child, &path, out),
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.root, "", &mut out);
        out
    }
}
