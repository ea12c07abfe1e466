use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::storage::error::StorageSystemError;

/// Supported data file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Get the canonical file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Every extension recognised by an enabled format, in lookup order.
    pub fn known_extensions() -> Vec<&'static str> {
        let mut extensions = vec!["json"];
        #[cfg(feature = "yaml-config")]
        extensions.extend(["yaml", "yml"]);
        #[cfg(feature = "toml-config")]
        extensions.push("toml");
        extensions
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }

    /// Deserialize `data` in this format.
    ///
    /// `path` is only used to give the error some context.
    pub fn parse<T: DeserializeOwned>(&self, data: &str, path: &Path) -> Result<T, StorageSystemError> {
        let boxed = |e: Box<dyn std::error::Error + Send + Sync>| StorageSystemError::DeserializationError {
            format: self.extension().to_string(),
            path: path.to_path_buf(),
            source: e,
        };
        match self {
            ConfigFormat::Json => serde_json::from_str(data).map_err(|e| boxed(Box::new(e))),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::from_str(data).map_err(|e| boxed(Box::new(e))),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(data).map_err(|e| boxed(Box::new(e))),
        }
    }
}

/// Read and deserialize a data file, picking the format from its extension.
pub fn read_data_file<T: DeserializeOwned>(path: &Path) -> Result<T, StorageSystemError> {
    let format = ConfigFormat::from_path(path)
        .ok_or_else(|| StorageSystemError::UnsupportedConfigFormat(path.to_path_buf()))?;
    let content = std::fs::read_to_string(path)
        .map_err(|e| StorageSystemError::io(e, "read_data_file", path.to_path_buf()))?;
    format.parse(&content, path)
}

/// Resolve an extension-less stem (e.g. `config/plugin.default`) to the first
/// existing data file next to it.
pub fn resolve_data_file(stem: &Path) -> Option<PathBuf> {
    let file_name = stem.file_name()?.to_string_lossy().into_owned();
    ConfigFormat::known_extensions()
        .into_iter()
        .map(|ext| stem.with_file_name(format!("{}.{}", file_name, ext)))
        .find(|candidate| candidate.is_file())
}
