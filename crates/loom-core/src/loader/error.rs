//! # Loom Core Loader Errors
//!
//! Defines [`LoaderError`], raised while mapping directory trees onto a
//! namespace: identifier grammar violations, namespace collisions, module
//! loading failures, bad glob patterns and violations of the named-unit
//! activation contract. Every variant is fatal for startup.
use std::path::PathBuf;

use thiserror::Error;

use crate::storage::error::StorageSystemError;

#[derive(Debug, Error)]
pub enum LoaderError {
    /// A path segment does not match `^[a-zA-Z][a-zA-Z0-9_-]*$`.
    #[error("{segment} is not match 'a-z0-9_-' in {path}")]
    Format { segment: String, path: String },

    /// A custom case function produced no segments.
    #[error("Case function returned no segments for '{path}'")]
    InvalidSegments { path: String },

    /// Two files map onto the same namespace entry without override permission.
    #[error(
        "can't overwrite property '{property}' from {} by {}",
        existing.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "<namespace>".into()),
        incoming.display()
    )]
    Collision {
        property: String,
        existing: Option<PathBuf>,
        incoming: PathBuf,
    },

    #[error("No module source registered for '{path}'")]
    UnsupportedModule { path: PathBuf },

    #[error("Failed to load module '{path}': {message}")]
    ModuleLoad {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("I/O error while scanning '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configured unit name has no entry in the loaded namespace.
    #[error("Unit {name} not found")]
    UnitNotFound { name: String },

    /// A unit name was listed for activation more than once.
    #[error("Unit {name} redefined")]
    UnitRedefined { name: String },
}

impl From<StorageSystemError> for LoaderError {
    fn from(err: StorageSystemError) -> Self {
        let path = match &err {
            StorageSystemError::Io { path, .. } => path.clone(),
            StorageSystemError::UnsupportedConfigFormat(path) => path.clone(),
            StorageSystemError::DeserializationError { path, .. } => path.clone(),
        };
        LoaderError::ModuleLoad {
            path,
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}
