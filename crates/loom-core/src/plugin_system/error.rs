//! # Loom Core Plugin System Errors
//!
//! [`PluginSystemError`] covers everything that can abort plugin loading:
//! a plugin that cannot be located, an activation order that cannot be
//! computed, and unreadable declaration or metadata files.
use std::path::PathBuf;

use crate::plugin_system::dependency::SequencingError;
use crate::storage::error::StorageSystemError;

#[derive(Debug, thiserror::Error)]
pub enum PluginSystemError {
    #[error("Can not find plugin {name} in \"{}\"", format_paths(.searched))]
    PluginNotFound {
        name: String,
        searched: Vec<PathBuf>,
    },

    #[error("{0}")]
    Sequencing(#[from] SequencingError),

    #[error("Plugin declaration error for '{path}': {message}")]
    DeclarationError {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Plugin metadata error for '{path}': {message}")]
    MetadataError {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("I/O error during '{operation}' on '{path}': {source}")]
    Io {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },
}

impl PluginSystemError {
    /// Wrap a data-file failure raised while reading a declaration file.
    pub fn declaration(path: PathBuf, source: StorageSystemError) -> Self {
        match source {
            StorageSystemError::Io { path, operation, source } => PluginSystemError::Io { path, operation, source },
            other => PluginSystemError::DeclarationError {
                path,
                message: other.to_string(),
                source: Some(Box::new(other)),
            },
        }
    }

    /// Wrap a data-file failure raised while reading package metadata.
    pub fn metadata(path: PathBuf, source: StorageSystemError) -> Self {
        match source {
            StorageSystemError::Io { path, operation, source } => PluginSystemError::Io { path, operation, source },
            other => PluginSystemError::MetadataError {
                path,
                message: other.to_string(),
                source: Some(Box::new(other)),
            },
        }
    }
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
