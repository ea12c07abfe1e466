use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::kernel::constants;
use crate::kernel::error::Result;
use crate::loader::file_loader::{FileLoader, FileLoaderOptions};
use crate::loader::module::ModuleLoader;
use crate::loader::namespace::NamespaceTree;
use crate::plugin_system::config::{PluginConfigReader, aggregate, custom_plugins, parse_env_override};
use crate::plugin_system::dependency::{ImplicitActivation, resolve};
use crate::plugin_system::descriptor::{PluginDescriptor, RawDeclarations, RawPluginEntry};
use crate::plugin_system::metadata::merge_package_metadata;
use crate::plugin_system::path::PluginPathResolver;
use crate::plugin_system::registry::PluginRegistry;

/// Startup options.
#[derive(Debug, Clone)]
pub struct BootOptions {
    /// Application root
    pub base_dir: PathBuf,
    /// Framework roots, least specific first
    pub framework_paths: Vec<PathBuf>,
    pub env: String,
    pub scope: Option<String>,
    /// Caller plugin declarations, highest precedence
    pub plugins: RawDeclarations,
    /// Raw value of the plugin override variable
    pub plugins_env: Option<String>,
    /// Last directory searched for plugin modules
    pub cwd: PathBuf,
}

impl BootOptions {
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let cwd = std::env::current_dir().unwrap_or_else(|_| base_dir.clone());
        Self {
            base_dir,
            framework_paths: Vec::new(),
            env: constants::DEFAULT_ENV.to_string(),
            scope: None,
            plugins: RawDeclarations::new(),
            plugins_env: None,
            cwd,
        }
    }

    /// Options for `base_dir` with environment, scope and plugin override
    /// taken from the process environment.
    pub fn from_env<P: AsRef<Path>>(base_dir: P) -> Self {
        Self::from_lookup(base_dir, |key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable lookup.
    pub fn from_lookup<P, F>(base_dir: P, lookup: F) -> Self
    where
        P: AsRef<Path>,
        F: Fn(&str) -> Option<String>,
    {
        let mut options = Self::new(base_dir);
        if let Some(env) = lookup(constants::ENV_VAR).filter(|e| !e.is_empty()) {
            options.env = env;
        }
        options.scope = lookup(constants::SCOPE_VAR).filter(|s| !s.is_empty());
        options.plugins_env = lookup(constants::PLUGINS_ENV_VAR);
        options
    }

    /// Add a framework root, more specific than the ones already added
    pub fn framework<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.framework_paths.push(path.as_ref().to_path_buf());
        self
    }

    pub fn env(mut self, env: &str) -> Self {
        self.env = env.to_string();
        self
    }

    pub fn scope(mut self, scope: &str) -> Self {
        self.scope = if scope.is_empty() { None } else { Some(scope.to_string()) };
        self
    }

    pub fn plugin(mut self, name: &str, entry: RawPluginEntry) -> Self {
        self.plugins.insert(name.to_string(), entry);
        self
    }

    pub fn plugins_env(mut self, raw: &str) -> Self {
        self.plugins_env = Some(raw.to_string());
        self
    }

    pub fn cwd<P: AsRef<Path>>(mut self, cwd: P) -> Self {
        self.cwd = cwd.as_ref().to_path_buf();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Plugin,
    Application,
}

/// A root directory every convention load walks, plugins first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadUnit {
    pub path: PathBuf,
    #[serde(rename = "type")]
    pub kind: UnitKind,
}

/// Runs plugin loading and convention loads for one application.
pub struct Bootstrap {
    options: BootOptions,
    modules: &'static ModuleLoader,
    plugins: Vec<PluginDescriptor>,
    all_plugins: PluginRegistry,
    excluded: Vec<PluginDescriptor>,
    implicitly_enabled: Vec<ImplicitActivation>,
    plugins_loaded: bool,
}

impl Bootstrap {
    pub fn new(options: BootOptions) -> Self {
        Self {
            options,
            modules: ModuleLoader::global(),
            plugins: Vec::new(),
            all_plugins: PluginRegistry::new(),
            excluded: Vec::new(),
            implicitly_enabled: Vec::new(),
            plugins_loaded: false,
        }
    }

    /// Use `modules` instead of the process-wide module loader.
    pub fn with_module_loader(mut self, modules: &'static ModuleLoader) -> Self {
        self.modules = modules;
        self
    }

    pub fn options(&self) -> &BootOptions {
        &self.options
    }

    /// Aggregate, locate, filter and order the plugins.
    pub fn load_plugins(&mut self) -> Result<&[PluginDescriptor]> {
        let options = &self.options;
        log::info!(
            "Loading plugins for {} at {} (env: {}, scope: {})",
            constants::APP_NAME,
            options.base_dir.display(),
            options.env,
            options.scope.as_deref().unwrap_or("-")
        );

        let reader = PluginConfigReader::new(&options.env, options.scope.as_deref());
        let custom = custom_plugins(parse_env_override(options.plugins_env.as_deref()), &options.plugins);
        let aggregated = aggregate(&reader, &options.framework_paths, &options.base_dir, custom)?;
        let mut all = aggregated.all;

        let resolver = PluginPathResolver::new(&options.base_dir, &options.framework_paths, &options.cwd);
        for (_, plugin) in all.iter_mut() {
            let path = resolver.resolve(plugin)?;
            plugin.path = Some(path);
            merge_package_metadata(plugin)?;
        }

        let (candidates, excluded) = all.partition_by_env(&options.env);
        let enabled = candidates.enabled_names();
        let resolution = resolve(&candidates, &enabled)?;
        log::debug!("Got plugins {:?} after sequencing", resolution.names());

        log_implicit_activations(&resolution.implicitly_enabled, &aggregated.application);

        for plugin in &excluded {
            if let Some(target) = all.get_mut(&plugin.name) {
                target.enable = false;
            }
        }
        for activation in &resolution.implicitly_enabled {
            if let Some(target) = all.get_mut(&activation.name) {
                target.enable = true;
            }
        }

        log::info!("Loaded plugins: {:?}", resolution.names());
        self.plugins = resolution.order;
        self.implicitly_enabled = resolution.implicitly_enabled;
        self.all_plugins = all;
        self.excluded = excluded;
        self.plugins_loaded = true;
        Ok(&self.plugins)
    }

    /// Enabled plugins in activation order.
    pub fn plugins(&self) -> &[PluginDescriptor] {
        &self.plugins
    }

    pub fn plugin(&self, name: &str) -> Option<&PluginDescriptor> {
        self.plugins.iter().find(|p| p.name == name)
    }

    /// Every declared plugin after merging, enabled or not.
    pub fn all_plugins(&self) -> &PluginRegistry {
        &self.all_plugins
    }

    /// Plugins disabled because the environment did not match.
    pub fn excluded(&self) -> &[PluginDescriptor] {
        &self.excluded
    }

    pub fn implicitly_enabled(&self) -> &[ImplicitActivation] {
        &self.implicitly_enabled
    }

    /// Plugin units in activation order, then the application.
    ///
    /// Before [`load_plugins`](Self::load_plugins) only the application unit
    /// is returned.
    pub fn load_units(&self) -> Vec<LoadUnit> {
        if !self.plugins_loaded {
            log::debug!("plugins not loaded yet, using the application unit only");
        }
        let mut units: Vec<LoadUnit> = self
            .plugins
            .iter()
            .filter_map(|p| p.path.clone())
            .map(|path| LoadUnit { path, kind: UnitKind::Plugin })
            .collect();
        units.push(LoadUnit {
            path: self.options.base_dir.clone(),
            kind: UnitKind::Application,
        });
        units
    }

    /// `<unit>/<subdir>` for every load unit, in order.
    pub fn unit_directories(&self, subdir: &str) -> Vec<PathBuf> {
        self.load_units().into_iter().map(|unit| unit.path.join(subdir)).collect()
    }

    /// Options scanning `subdir` of every unit, with later units overriding.
    pub fn convention_options(&self, subdir: &str) -> FileLoaderOptions {
        FileLoaderOptions::default()
            .directories(self.unit_directories(subdir))
            .override_existing(true)
    }

    /// Load `subdir` of every unit into one namespace.
    pub fn load_convention(&self, subdir: &str) -> Result<NamespaceTree> {
        self.load_convention_with(self.convention_options(subdir))
    }

    /// Run the convention loader with caller-built options.
    pub fn load_convention_with(&self, options: FileLoaderOptions) -> Result<NamespaceTree> {
        let tree = FileLoader::with_modules(options, self.modules).load()?;
        Ok(tree)
    }
}

fn log_implicit_activations(implicit: &[ImplicitActivation], application: &PluginRegistry) {
    if implicit.is_empty() {
        return;
    }
    let all: Vec<&ImplicitActivation> = implicit.iter().collect();
    log::info!("Following plugins will be enabled implicitly.\n{}", describe_activations(&all));

    let disabled_by_app: Vec<&ImplicitActivation> = implicit
        .iter()
        .filter(|a| application.get(&a.name).is_some_and(|p| !p.enable))
        .collect();
    if !disabled_by_app.is_empty() {
        log::warn!(
            "Following plugins will be enabled implicitly that is disabled by application.\n{}",
            describe_activations(&disabled_by_app)
        );
    }
}

fn describe_activations(activations: &[&ImplicitActivation]) -> String {
    activations
        .iter()
        .map(|a| format!("  - {} required by [{}]", a.name, a.required_by.join(",")))
        .collect::<Vec<_>>()
        .join("\n")
}
