//! # Loom Core Kernel Errors
//!
//! [`Error`] wraps the typed error of every subsystem so startup code can
//! propagate any of them with `?`.
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::loader::error::LoaderError;
use crate::plugin_system::dependency::SequencingError;
use crate::plugin_system::error::PluginSystemError;
use crate::storage::error::StorageSystemError;

#[derive(Debug, ThisError)]
pub enum Error {
    /// Convention loading error
    #[error("Loader error: {0}")]
    Loader(#[from] LoaderError),

    /// Plugin aggregation, lookup or sequencing error
    #[error("Plugin system error: {0}")]
    PluginSystem(#[from] PluginSystemError),

    #[error("Storage system error: {0}")]
    StorageSystem(#[from] StorageSystemError),

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<SequencingError> for Error {
    fn from(err: SequencingError) -> Self {
        Error::PluginSystem(PluginSystemError::Sequencing(err))
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl Error {
    /// The sequencing failure behind this error, if any.
    pub fn as_sequencing(&self) -> Option<&SequencingError> {
        match self {
            Error::PluginSystem(PluginSystemError::Sequencing(err)) => Some(err),
            _ => None,
        }
    }
}
