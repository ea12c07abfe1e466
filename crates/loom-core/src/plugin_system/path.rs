use std::path::{Path, PathBuf};

use crate::kernel::constants::MODULE_ROOT_DIR;
use crate::plugin_system::descriptor::PluginDescriptor;
use crate::plugin_system::error::PluginSystemError;
use crate::utils::fs::existing_canonical;

/// Locates plugin roots on disk.
///
/// Lookup order for a plugin without an explicit `path`:
///
/// 1. `<app>/modules/<name>`
/// 2. `<framework>/modules/<name>` for each framework root, most specific first
/// 3. `<cwd>/modules/<name>`
#[derive(Debug, Clone)]
pub struct PluginPathResolver {
    app_root: PathBuf,
    /// Least specific first
    framework_roots: Vec<PathBuf>,
    cwd: PathBuf,
}

impl PluginPathResolver {
    pub fn new<A: AsRef<Path>, C: AsRef<Path>>(app_root: A, framework_roots: &[PathBuf], cwd: C) -> Self {
        Self {
            app_root: app_root.as_ref().to_path_buf(),
            framework_roots: framework_roots.to_vec(),
            cwd: cwd.as_ref().to_path_buf(),
        }
    }

    /// The module directories searched, in order.
    pub fn lookup_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = Vec::with_capacity(self.framework_roots.len() + 2);
        dirs.push(self.app_root.join(MODULE_ROOT_DIR));
        dirs.extend(self.framework_roots.iter().rev().map(|root| root.join(MODULE_ROOT_DIR)));
        dirs.push(self.cwd.join(MODULE_ROOT_DIR));
        dirs
    }

    /// The plugin root of `descriptor`.
    ///
    /// An explicit `path` is returned unchanged. Otherwise the first
    /// existing candidate is returned with symlinks resolved.
    pub fn resolve(&self, descriptor: &PluginDescriptor) -> Result<PathBuf, PluginSystemError> {
        if let Some(path) = &descriptor.path {
            return Ok(path.clone());
        }

        let name = descriptor.module_name();
        let lookup_dirs = self.lookup_dirs();
        for dir in &lookup_dirs {
            if let Some(found) = existing_canonical(&dir.join(name)) {
                log::debug!("plugin {} found at {}", descriptor.name, found.display());
                return Ok(found);
            }
        }

        Err(PluginSystemError::PluginNotFound {
            name: name.to_string(),
            searched: lookup_dirs,
        })
    }
}
