//! Plugin activation ordering.
//!
//! [`resolve`] turns the candidate registry and the explicitly enabled names
//! into one activation order. Hard dependencies pull plugins in and must be
//! satisfiable; optional dependencies only order plugins that are already in.
use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::plugin_system::descriptor::PluginDescriptor;
use crate::plugin_system::registry::PluginRegistry;

/// A hard dependency that is not in the candidate registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingDependency {
    /// The name that could not be found (undeclared or disabled by env)
    pub name: String,
    /// Plugins that require it, in registration order
    pub required_by: Vec<String>,
}

/// A plugin activated only because enabled plugins depend on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImplicitActivation {
    pub name: String,
    pub required_by: Vec<String>,
}

/// A successful resolution.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Descriptors in activation order, all with `enable` set
    pub order: Vec<PluginDescriptor>,
    pub implicitly_enabled: Vec<ImplicitActivation>,
}

impl Resolution {
    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(|p| p.name.as_str()).collect()
    }
}

/// Sequencing failed. Carries every missing and cyclic name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct SequencingError {
    pub missing: Vec<MissingDependency>,
    /// Plugins on a dependency cycle
    pub cyclic: Vec<String>,
    /// Plugins that only wait on a cycle
    pub blocked: Vec<String>,
}

impl SequencingError {
    pub fn missing_names(&self) -> Vec<&str> {
        self.missing.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn required_by(&self, missing: &str) -> Option<&[String]> {
        self.missing
            .iter()
            .find(|m| m.name == missing)
            .map(|m| m.required_by.as_slice())
    }
}

impl fmt::Display for SequencingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sequencify plugins has problem, missing: [{}], recursive: [{}]",
            self.missing_names().join(","),
            self.cyclic.join(",")
        )?;
        for missing in &self.missing {
            write!(
                f,
                "\n\t>> Plugin [{}] is disabled or missed, but is required by [{}]",
                missing.name,
                missing.required_by.join(",")
            )?;
        }
        if !self.blocked.is_empty() {
            write!(f, "\n\t>> Plugins [{}] wait on a dependency cycle", self.blocked.join(","))?;
        }
        Ok(())
    }
}

/// Compute the activation order.
///
/// `registry` holds the candidates (already filtered by environment);
/// `enabled` the explicitly enabled names. Neither is modified. Among plugins
/// ready at the same time the earliest registered goes first.
pub fn resolve(registry: &PluginRegistry, enabled: &[String]) -> Result<Resolution, SequencingError> {
    if enabled.is_empty() {
        return Ok(Resolution::default());
    }

    let (required, missing) = required_closure(registry, enabled);

    // Optional dependencies order plugins only when both ends are required.
    let edges: HashMap<&str, Vec<&str>> = registry
        .descriptors()
        .filter(|p| required.contains(p.name.as_str()))
        .map(|p| {
            let deps = p
                .dependencies
                .iter()
                .chain(p.optional_dependencies.iter().filter(|d| required.contains(d.as_str())))
                .map(String::as_str)
                .collect();
            (p.name.as_str(), deps)
        })
        .collect();

    let mut sequenced: HashSet<&str> = HashSet::new();
    let mut order: Vec<&PluginDescriptor> = Vec::new();
    loop {
        let next = registry.descriptors().find(|p| {
            let name = p.name.as_str();
            required.contains(name)
                && !sequenced.contains(name)
                && edges[name].iter().all(|dep| sequenced.contains(dep))
        });
        match next {
            Some(plugin) => {
                sequenced.insert(plugin.name.as_str());
                order.push(plugin);
            }
            None => break,
        }
    }

    if order.len() != required.len() || !missing.is_empty() {
        return Err(diagnose(registry, &required, &sequenced, &edges, missing));
    }

    let explicit: HashSet<&str> = enabled.iter().map(String::as_str).collect();
    let implicitly_enabled = order
        .iter()
        .filter(|p| !explicit.contains(p.name.as_str()))
        .map(|p| ImplicitActivation {
            name: p.name.clone(),
            required_by: order
                .iter()
                .filter(|other| other.dependencies.contains(&p.name))
                .map(|other| other.name.clone())
                .collect(),
        })
        .collect();

    let order = order
        .into_iter()
        .map(|p| {
            let mut p = p.clone();
            p.enable = true;
            p
        })
        .collect();

    Ok(Resolution { order, implicitly_enabled })
}

// Plugins reachable from `enabled` through hard dependencies, plus the
// hard dependencies that are not candidates at all.
fn required_closure<'r>(
    registry: &'r PluginRegistry,
    enabled: &[String],
) -> (HashSet<&'r str>, Vec<MissingDependency>) {
    let mut required: HashSet<&'r str> = HashSet::new();
    let mut missing: Vec<MissingDependency> = Vec::new();
    let mut note_missing = |name: &str, requirer: Option<&str>| {
        let index = match missing.iter().position(|m| m.name == name) {
            Some(i) => i,
            None => {
                missing.push(MissingDependency { name: name.to_string(), required_by: Vec::new() });
                missing.len() - 1
            }
        };
        let entry = &mut missing[index];
        if let Some(requirer) = requirer {
            if !entry.required_by.iter().any(|r| r == requirer) {
                entry.required_by.push(requirer.to_string());
            }
        }
    };

    let mut stack: Vec<&'r PluginDescriptor> = Vec::new();
    for name in enabled {
        match registry.get(name) {
            Some(plugin) => stack.push(plugin),
            None => note_missing(name.as_str(), None),
        }
    }
    stack.reverse();

    while let Some(plugin) = stack.pop() {
        if !required.insert(plugin.name.as_str()) {
            continue;
        }
        for dep in plugin.dependencies.iter().rev() {
            match registry.get(dep) {
                Some(dep_plugin) => stack.push(dep_plugin),
                None => note_missing(dep.as_str(), Some(plugin.name.as_str())),
            }
        }
    }

    // Requirers in registration order
    for m in &mut missing {
        m.required_by.sort_by_key(|r| registry.iter().position(|(name, _)| name == r));
    }

    (required, missing)
}

fn diagnose(
    registry: &PluginRegistry,
    required: &HashSet<&str>,
    sequenced: &HashSet<&str>,
    edges: &HashMap<&str, Vec<&str>>,
    missing: Vec<MissingDependency>,
) -> SequencingError {
    let residue: Vec<&str> = registry
        .descriptors()
        .map(|p| p.name.as_str())
        .filter(|name| required.contains(name) && !sequenced.contains(name))
        .collect();

    // Stuck behind a missing dependency, directly or transitively.
    let missing_names: HashSet<&str> = missing.iter().map(|m| m.name.as_str()).collect();
    let mut blocked_by_missing: HashSet<&str> = HashSet::new();
    loop {
        let before = blocked_by_missing.len();
        for name in &residue {
            if edges[name]
                .iter()
                .any(|dep| missing_names.contains(dep) || blocked_by_missing.contains(dep))
            {
                blocked_by_missing.insert(*name);
            }
        }
        if blocked_by_missing.len() == before {
            break;
        }
    }

    let stalled: HashSet<&str> = residue
        .iter()
        .copied()
        .filter(|name| !blocked_by_missing.contains(name))
        .collect();

    let (cyclic, blocked): (Vec<&str>, Vec<&str>) = residue
        .iter()
        .copied()
        .filter(|name| stalled.contains(name))
        .partition(|name| reaches(name, name, edges, &stalled));

    SequencingError {
        missing,
        cyclic: cyclic.into_iter().map(String::from).collect(),
        blocked: blocked.into_iter().map(String::from).collect(),
    }
}

// Whether `target` is reachable from `from` through at least one edge,
// staying inside `within`.
fn reaches(from: &str, target: &str, edges: &HashMap<&str, Vec<&str>>, within: &HashSet<&str>) -> bool {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut stack: Vec<&str> = edges.get(from).cloned().unwrap_or_default();
    while let Some(node) = stack.pop() {
        if node == target {
            return true;
        }
        if !within.contains(node) || !visited.insert(node) {
            continue;
        }
        if let Some(next) = edges.get(node) {
            stack.extend(next.iter().copied());
        }
    }
    false
}
