use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A plugin as declared in one source, or as merged across all of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginDescriptor {
    /// Plugin name, the key used in `dependencies`
    pub name: String,
    /// Module name looked up under the module roots
    pub package: Option<String>,
    /// Plugin root directory, resolved once
    pub path: Option<PathBuf>,
    pub enable: bool,
    /// Hard dependencies
    pub dependencies: Vec<String>,
    /// Dependencies that only affect ordering
    pub optional_dependencies: Vec<String>,
    /// Environments the plugin may run in. Empty means all.
    pub env: Vec<String>,
    /// The declaration file that last touched this plugin
    pub from: Option<PathBuf>,
    pub version: Option<String>,
}

impl PluginDescriptor {
    /// An enabled plugin with no dependencies.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            package: None,
            path: None,
            enable: true,
            dependencies: Vec::new(),
            optional_dependencies: Vec::new(),
            env: Vec::new(),
            from: None,
            version: None,
        }
    }

    pub fn enable(mut self, enable: bool) -> Self {
        self.enable = enable;
        self
    }

    pub fn package(mut self, package: &str) -> Self {
        self.package = Some(package.to_string());
        self
    }

    pub fn path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn dependency(mut self, name: &str) -> Self {
        push_unique(&mut self.dependencies, name);
        self
    }

    pub fn optional_dependency(mut self, name: &str) -> Self {
        push_unique(&mut self.optional_dependencies, name);
        self
    }

    pub fn env(mut self, env: &str) -> Self {
        push_unique(&mut self.env, env);
        self
    }

    pub fn from_file<P: AsRef<Path>>(mut self, from: P) -> Self {
        self.from = Some(from.as_ref().to_path_buf());
        self
    }

    /// Whether the plugin may run under `env`.
    pub fn allows_env(&self, env: &str) -> bool {
        self.env.is_empty() || self.env.iter().any(|e| e == env)
    }

    /// The module name used for path lookup.
    pub fn module_name(&self) -> &str {
        self.package.as_deref().unwrap_or(&self.name)
    }

    /// The version parsed as semver, if it is one.
    pub fn semver(&self) -> Option<semver::Version> {
        self.version.as_deref().and_then(|v| semver::Version::parse(v).ok())
    }
}

/// One entry of a declaration file: `name: true` or `name: { ... }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawPluginEntry {
    Toggle(bool),
    Spec(RawPluginSpec),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPluginSpec {
    #[serde(default)]
    pub enable: Option<bool>,
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub dependencies: Option<Vec<String>>,
    /// Legacy spelling of `dependencies`
    #[serde(default)]
    pub dep: Option<Vec<String>>,
    #[serde(default)]
    pub optional_dependencies: Option<Vec<String>>,
    #[serde(default)]
    pub env: Option<Vec<String>>,
}

/// A parsed declaration file, in document order.
pub type RawDeclarations = IndexMap<String, RawPluginEntry>;

impl RawPluginEntry {
    /// Fill defaults: `enable` is true when absent, lists are empty, the
    /// legacy `dep` list stands in for an empty `dependencies`.
    pub fn normalize(self, name: &str, from: Option<&Path>) -> PluginDescriptor {
        let mut descriptor = PluginDescriptor::new(name);
        descriptor.from = from.map(Path::to_path_buf);

        match self {
            RawPluginEntry::Toggle(enable) => {
                descriptor.enable = enable;
            }
            RawPluginEntry::Spec(spec) => {
                descriptor.enable = spec.enable.unwrap_or(true);
                descriptor.package = spec.package;
                descriptor.path = spec.path;
                let dependencies = spec.dependencies.unwrap_or_default();
                descriptor.dependencies = match spec.dep {
                    Some(dep) if dependencies.is_empty() => dedup(dep),
                    _ => dedup(dependencies),
                };
                descriptor.optional_dependencies = dedup(spec.optional_dependencies.unwrap_or_default());
                descriptor.env = dedup(spec.env.unwrap_or_default());
            }
        }
        descriptor
    }
}

pub(crate) fn dedup(list: Vec<String>) -> Vec<String> {
    let mut out = Vec::with_capacity(list.len());
    for item in list {
        push_unique(&mut out, &item);
    }
    out
}

fn push_unique(list: &mut Vec<String>, item: &str) {
    if !list.iter().any(|existing| existing == item) {
        list.push(item.to_string());
    }
}
