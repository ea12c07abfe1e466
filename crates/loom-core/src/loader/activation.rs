use std::collections::HashSet;

use crate::loader::error::LoaderError;
use crate::loader::module::Export;
use crate::loader::namespace::{NamespaceTree, Node};

/// Resolve an ordered list of unit names against the top level of a loaded
/// namespace, e.g. the configured middleware order.
///
/// Every name must be a leaf of `tree` and may appear only once.
pub fn select_units<'t, S: AsRef<str>>(
    tree: &'t NamespaceTree,
    names: &[S],
) -> Result<Vec<(String, &'t Export)>, LoaderError> {
    let mut seen = HashSet::new();
    let mut selected = Vec::with_capacity(names.len());

    for name in names {
        let name = name.as_ref();
        let export = match tree.root().get(name) {
            Some(Node::Leaf(export)) => export,
            _ => return Err(LoaderError::UnitNotFound { name: name.to_string() }),
        };
        if !seen.insert(name) {
            return Err(LoaderError::UnitRedefined { name: name.to_string() });
        }
        log::debug!("Use unit: {}", name);
        selected.push((name.to_string(), export));
    }

    Ok(selected)
}
