//! Plugin declaration aggregation.
//!
//! Declarations come from three sources merged in increasing precedence:
//! the framework roots, the application root and the custom override (the
//! `LOOM_PLUGINS` environment value merged with caller options). Each root
//! contributes up to four declaration files under `config/`:
//!
//! ```text
//! plugin.default        (or plugin, when plugin.default is absent)
//! plugin.<scope>
//! plugin.<env>
//! plugin.<scope>_<env>
//! ```
use std::path::{Path, PathBuf};

use crate::kernel::constants::{CONFIG_DIR, PLUGIN_CONFIG_STEM};
use crate::plugin_system::descriptor::RawDeclarations;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::registry::PluginRegistry;
use crate::storage::config::{read_data_file, resolve_data_file};

/// The merged registry and the per-source registries it was built from.
#[derive(Debug, Clone, Default)]
pub struct AggregatedPlugins {
    /// Every declared plugin, framework < application < custom
    pub all: PluginRegistry,
    pub framework: PluginRegistry,
    pub application: PluginRegistry,
    pub custom: PluginRegistry,
}

/// Reads declaration files for one runtime environment and scope.
#[derive(Debug, Clone)]
pub struct PluginConfigReader {
    env: String,
    scope: Option<String>,
}

impl PluginConfigReader {
    pub fn new(env: &str, scope: Option<&str>) -> Self {
        Self {
            env: env.to_string(),
            scope: scope.filter(|s| !s.is_empty()).map(str::to_string),
        }
    }

    pub fn env(&self) -> &str {
        &self.env
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// File stems for `name` in precedence order, e.g. `plugin.default`,
    /// `plugin.<scope>`, `plugin.<env>`, `plugin.<scope>_<env>`.
    pub fn type_files(&self, name: &str) -> Vec<String> {
        let mut files = vec![format!("{}.default", name)];
        if let Some(scope) = &self.scope {
            files.push(format!("{}.{}", name, scope));
        }
        if self.env == "default" {
            return files;
        }
        files.push(format!("{}.{}", name, self.env));
        if let Some(scope) = &self.scope {
            files.push(format!("{}.{}_{}", name, scope, self.env));
        }
        files
    }

    /// Declaration files that exist under `roots`, in merge order.
    pub fn declaration_files<P: AsRef<Path>>(&self, roots: &[P]) -> Vec<PathBuf> {
        let default_stem = format!("{}.default", PLUGIN_CONFIG_STEM);
        let mut files = Vec::new();
        for stem in self.type_files(PLUGIN_CONFIG_STEM) {
            for root in roots {
                let config_dir = root.as_ref().join(CONFIG_DIR);
                let mut found = resolve_data_file(&config_dir.join(&stem));
                if found.is_none() && stem == default_stem {
                    found = resolve_data_file(&config_dir.join(PLUGIN_CONFIG_STEM));
                }
                match found {
                    Some(file) => files.push(file),
                    None => log::debug!("no {} declarations under {}", stem, config_dir.display()),
                }
            }
        }
        files
    }

    /// Read and merge every declaration file under `roots`.
    pub fn read_plugin_configs<P: AsRef<Path>>(&self, roots: &[P]) -> Result<PluginRegistry, PluginSystemError> {
        let mut registry = PluginRegistry::new();
        for file in self.declaration_files(roots) {
            let declarations: RawDeclarations =
                read_data_file(&file).map_err(|e| PluginSystemError::declaration(file.clone(), e))?;
            log::debug!("read {} plugin declarations from {}", declarations.len(), file.display());
            registry.extend(&normalize_declarations(declarations, Some(&file)));
        }
        Ok(registry)
    }
}

/// Normalize a declaration map into descriptors declared by `from`.
pub fn normalize_declarations(declarations: RawDeclarations, from: Option<&Path>) -> PluginRegistry {
    declarations
        .into_iter()
        .map(|(name, entry)| entry.normalize(&name, from))
        .collect()
}

/// Parse the `LOOM_PLUGINS` override. Unparsable content is logged and ignored.
pub fn parse_env_override(raw: Option<&str>) -> Option<RawDeclarations> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    match serde_json::from_str::<RawDeclarations>(raw) {
        Ok(declarations) => Some(declarations),
        Err(e) => {
            log::warn!("parse plugin override from environment failed, {}", e);
            None
        }
    }
}

/// Build the custom source: the environment override with caller entries
/// replacing same-named ones wholesale.
pub fn custom_plugins(env_override: Option<RawDeclarations>, options: &RawDeclarations) -> PluginRegistry {
    let mut declarations = env_override.unwrap_or_default();
    for (name, entry) in options {
        declarations.insert(name.clone(), entry.clone());
    }
    normalize_declarations(declarations, None)
}

/// Read every source and merge them in precedence order.
pub fn aggregate<F, A>(
    reader: &PluginConfigReader,
    framework_roots: &[F],
    app_root: A,
    custom: PluginRegistry,
) -> Result<AggregatedPlugins, PluginSystemError>
where
    F: AsRef<Path>,
    A: AsRef<Path>,
{
    let application = reader.read_plugin_configs(&[app_root.as_ref()])?;
    log::debug!("Loaded app plugins: {:?}", application.names());

    let framework = reader.read_plugin_configs(framework_roots)?;
    log::debug!("Loaded framework plugins: {:?}", framework.names());

    if !custom.is_empty() {
        log::debug!("Loaded custom plugins: {:?}", custom.names());
    }

    let mut all = PluginRegistry::new();
    all.extend(&framework);
    all.extend(&application);
    all.extend(&custom);

    Ok(AggregatedPlugins {
        all,
        framework,
        application,
        custom,
    })
}
