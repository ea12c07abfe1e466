//! Plugin package metadata.
//!
//! A plugin root may carry a `package.{json,yaml,toml}` with a `version` and a
//! `framework-plugin` section:
//!
//! ```json
//! {
//!   "version": "1.2.0",
//!   "framework-plugin": { "name": "session", "dep": ["cookie"], "env": ["prod"] }
//! }
//! ```
//!
//! The section only fills lists the declarations left empty.
use serde::Deserialize;

use crate::kernel::constants::{PACKAGE_METADATA_STEM, PLUGIN_METADATA_SECTION};
use crate::plugin_system::descriptor::{PluginDescriptor, dedup};
use crate::plugin_system::error::PluginSystemError;
use crate::storage::config::{read_data_file, resolve_data_file};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageMetadata {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default, rename = "framework-plugin")]
    pub plugin: Option<PluginSection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginSection {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub dependencies: Option<Vec<String>>,
    #[serde(default)]
    pub dep: Option<Vec<String>>,
    #[serde(default)]
    pub optional_dependencies: Option<Vec<String>>,
    #[serde(default)]
    pub env: Option<Vec<String>>,
}

impl PluginSection {
    // `dep` stands in for a missing or empty `dependencies`.
    fn dependencies(&self) -> Option<Vec<String>> {
        match (&self.dependencies, &self.dep) {
            (Some(deps), _) if !deps.is_empty() => Some(deps.clone()),
            (_, Some(dep)) => Some(dep.clone()),
            (deps, None) => deps.clone(),
        }
    }
}

/// Merge the package metadata found in the descriptor's root into it.
///
/// Does nothing for a descriptor without a resolved path. A missing metadata
/// file or section is logged, not an error.
pub fn merge_package_metadata(descriptor: &mut PluginDescriptor) -> Result<(), PluginSystemError> {
    let Some(root) = descriptor.path.clone() else {
        log::debug!("plugin {} has no path, skipping metadata", descriptor.name);
        return Ok(());
    };

    let stem = root.join(PACKAGE_METADATA_STEM);
    let metadata: PackageMetadata = match resolve_data_file(&stem) {
        Some(file) => read_data_file(&file).map_err(|e| PluginSystemError::metadata(file.clone(), e))?,
        None => PackageMetadata::default(),
    };

    if let Some(version) = &metadata.version {
        if semver::Version::parse(version).is_err() {
            log::debug!("plugin {} has a non-semver version {}", descriptor.name, version);
        }
        descriptor.version = Some(version.clone());
    }

    let Some(section) = metadata.plugin else {
        log::warn!(
            "[loom:loader] {} section is missing in {}",
            PLUGIN_METADATA_SECTION,
            stem.display()
        );
        return Ok(());
    };

    if let Some(name) = &section.name {
        if name != &descriptor.name {
            log::warn!(
                "[loom:loader] pluginName({}) is different from pluginConfigName({})",
                descriptor.name,
                name
            );
        }
    }

    fill_if_empty(&mut descriptor.dependencies, section.dependencies());
    fill_if_empty(&mut descriptor.optional_dependencies, section.optional_dependencies);
    fill_if_empty(&mut descriptor.env, section.env);
    Ok(())
}

fn fill_if_empty(target: &mut Vec<String>, incoming: Option<Vec<String>>) {
    if target.is_empty() {
        if let Some(incoming) = incoming {
            *target = dedup(incoming);
        }
    }
}
