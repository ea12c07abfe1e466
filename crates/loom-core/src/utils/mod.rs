//! Small file-system helpers used by the loaders.
pub mod fs;

pub use fs::{find_files, relative_slash_path, existing_canonical};
