//! # Loom Core
//!
//! Convention loading and plugin sequencing for an application host.
//!
//! - [`loader`] maps directory trees onto a nested namespace.
//! - [`plugin_system`] merges plugin declarations and orders activation.
//! - [`kernel`] ties both together at startup.
pub mod kernel;
pub mod loader;
pub mod plugin_system;
pub mod storage;
pub mod utils;

pub use kernel::error::Error as KernelError;
pub use kernel::{BootOptions, Bootstrap, LoadUnit, UnitKind};
pub use loader::{CaseStyle, Export, ExportKind, FileLoader, FileLoaderOptions, ModuleLoader, NamespaceTree};
pub use plugin_system::{PluginDescriptor, PluginRegistry, Resolution, SequencingError};
