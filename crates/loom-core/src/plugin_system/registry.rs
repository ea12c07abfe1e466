use indexmap::IndexMap;

use crate::plugin_system::descriptor::PluginDescriptor;

/// Plugin descriptors keyed by name, in registration order.
///
/// Registration order is the first time a name was seen and is the
/// resolver's tie-break between plugins that are ready at the same time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PluginRegistry {
    plugins: IndexMap<String, PluginDescriptor>,
}

impl PluginRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a descriptor, keeping the original position on replace.
    pub fn insert(&mut self, descriptor: PluginDescriptor) {
        self.plugins.insert(descriptor.name.clone(), descriptor);
    }

    pub fn get(&self, name: &str) -> Option<&PluginDescriptor> {
        self.plugins.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut PluginDescriptor> {
        self.plugins.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PluginDescriptor)> {
        self.plugins.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut PluginDescriptor)> {
        self.plugins.iter_mut()
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &PluginDescriptor> {
        self.plugins.values()
    }

    pub fn names(&self) -> Vec<String> {
        self.plugins.keys().cloned().collect()
    }

    /// Names with `enable` set, in registration order.
    pub fn enabled_names(&self) -> Vec<String> {
        self.plugins
            .values()
            .filter(|p| p.enable)
            .map(|p| p.name.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Merge every descriptor of `other` into this registry, `other` winning.
    ///
    /// Per plugin: scalars are overwritten; an incoming `path` or `package`
    /// clears both existing ones; an empty incoming list never clears a
    /// non-empty one. Declaring the same `package` twice is logged.
    pub fn extend(&mut self, other: &PluginRegistry) {
        for incoming in other.descriptors() {
            self.merge(incoming);
        }
    }

    /// Merge a single descriptor. See [`extend`](Self::extend).
    pub fn merge(&mut self, incoming: &PluginDescriptor) {
        let Some(target) = self.plugins.get_mut(&incoming.name) else {
            self.plugins.insert(incoming.name.clone(), incoming.clone());
            return;
        };

        if target.package.is_some() && target.package == incoming.package {
            log::warn!(
                "plugin {} has been defined that is {:?}, but you define again in {}",
                incoming.name,
                target,
                incoming.from.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "<options>".into())
            );
        }

        if incoming.path.is_some() || incoming.package.is_some() {
            target.path = None;
            target.package = None;
        }
        if incoming.package.is_some() {
            target.package = incoming.package.clone();
        }
        if incoming.path.is_some() {
            target.path = incoming.path.clone();
        }
        if incoming.from.is_some() {
            target.from = incoming.from.clone();
        }
        if incoming.version.is_some() {
            target.version = incoming.version.clone();
        }
        target.enable = incoming.enable;

        merge_list(&mut target.dependencies, &incoming.dependencies);
        merge_list(&mut target.optional_dependencies, &incoming.optional_dependencies);
        merge_list(&mut target.env, &incoming.env);
    }

    /// Split off plugins that may not run under `env`.
    ///
    /// Returns the candidate registry and the excluded descriptors, which are
    /// marked disabled.
    pub fn partition_by_env(&self, env: &str) -> (PluginRegistry, Vec<PluginDescriptor>) {
        let mut candidates = PluginRegistry::new();
        let mut excluded = Vec::new();
        for plugin in self.descriptors() {
            if plugin.allows_env(env) {
                candidates.insert(plugin.clone());
            } else {
                log::info!(
                    "Plugin {} is disabled by env unmatched, require env({}) but got env is {}",
                    plugin.name,
                    plugin.env.join(", "),
                    env
                );
                let mut disabled = plugin.clone();
                disabled.enable = false;
                excluded.push(disabled);
            }
        }
        (candidates, excluded)
    }
}

impl FromIterator<PluginDescriptor> for PluginRegistry {
    fn from_iter<T: IntoIterator<Item = PluginDescriptor>>(iter: T) -> Self {
        let mut registry = PluginRegistry::new();
        for descriptor in iter {
            registry.insert(descriptor);
        }
        registry
    }
}

fn merge_list(target: &mut Vec<String>, incoming: &[String]) {
    if incoming.is_empty() && !target.is_empty() {
        return;
    }
    *target = incoming.to_vec();
}
