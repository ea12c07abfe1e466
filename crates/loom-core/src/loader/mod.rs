//! # Loom Core Convention Loader
//!
//! Maps directory trees onto a nested namespace. A file's path relative to
//! its root becomes a property path (`group/repository.json` ->
//! `group.repository`), its content becomes the leaf value.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`case`]**: the case mapper, turning a relative path into namespace
//!   segments under a [`CaseStyle`](case::CaseStyle).
//! - **[`module`]**: loads one file into an [`Export`](module::Export) through
//!   extension-keyed [`ModuleSource`](module::ModuleSource)s, with a
//!   load-at-most-once cache.
//! - **[`file_loader`]**: the convention loader itself ([`FileLoader`]):
//!   discovery, include/exclude globs, initializer/call/filter handling.
//! - **[`namespace`]**: the [`NamespaceTree`] items attach to, with collision
//!   and override rules and a provenance side table.
//! - **[`activation`]**: checks an ordered list of unit names against a
//!   loaded namespace.
//! - **[`error`]**: [`LoaderError`](error::LoaderError).
pub mod activation;
pub mod case;
pub mod error;
pub mod file_loader;
pub mod module;
pub mod namespace;

pub use activation::select_units;
pub use case::{CaseStyle, derive_segments};
pub use error::LoaderError;
pub use file_loader::{FileLoader, FileLoaderOptions, ItemContext, LoadItem};
pub use module::{DataModuleSource, Export, ExportKind, FnModuleSource, ModuleLoader, ModuleSource};
pub use namespace::{Namespace, NamespaceTree, Node, Provenance};

#[cfg(test)]
mod tests;
