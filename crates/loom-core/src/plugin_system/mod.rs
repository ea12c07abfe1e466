//! # Loom Core Plugin System
//!
//! Turns plugin declarations scattered over framework roots, the application
//! root and runtime overrides into one ordered list of enabled plugins.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`descriptor`]**: The [`PluginDescriptor`] model and the raw declaration
//!   shape it is normalized from.
//! - **[`registry`]**: The insertion-ordered [`PluginRegistry`], its precedence
//!   merge and the environment filter.
//! - **[`config`]**: Reads declaration files per root, environment and scope
//!   and aggregates every source.
//! - **[`path`]**: Locates each plugin's root directory.
//! - **[`metadata`]**: Merges the `framework-plugin` section of a plugin's
//!   package metadata.
//! - **[`dependency`]**: The pure activation-order resolver.
//! - **[`error`]**: [`PluginSystemError`](error::PluginSystemError).
pub mod config;
pub mod dependency;
pub mod descriptor;
pub mod error;
pub mod metadata;
pub mod path;
pub mod registry;

pub use config::{AggregatedPlugins, PluginConfigReader, aggregate};
pub use dependency::{ImplicitActivation, MissingDependency, Resolution, SequencingError, resolve};
pub use descriptor::{PluginDescriptor, RawDeclarations, RawPluginEntry, RawPluginSpec};
pub use error::PluginSystemError;
pub use metadata::merge_package_metadata;
pub use path::PluginPathResolver;
pub use registry::PluginRegistry;

// Test module declaration
#[cfg(test)]
mod tests;
