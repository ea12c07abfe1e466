//! # Loom Core Storage
//!
//! Data-file plumbing shared by the plugin system and the convention loader:
//! format detection ([`ConfigFormat`]), extension resolution for
//! extension-less config stems and typed deserialization.
pub mod config;
pub mod error;

/// Re-export key types
pub use config::{ConfigFormat, read_data_file, resolve_data_file};
pub use error::StorageSystemError;
