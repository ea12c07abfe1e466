//! Loading a single file into an [`Export`].
//!
//! Files are loaded through [`ModuleSource`]s picked by file extension. The
//! built-in [`DataModuleSource`] reads json/yaml/toml data files into plain
//! values; hosts register further sources to turn files into factories or
//! opaque types. Every load goes through the [`ModuleLoader`] cache, so a file
//! is read at most once per loader.
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock, RwLock};

use serde_json::Value;

use crate::loader::error::LoaderError;
use crate::storage::config::{ConfigFormat, read_data_file};

/// Argument handed to factories when the loader invokes them.
pub type Inject = dyn Any + Send + Sync;

/// A callable factory export. Returning `None` keeps the factory itself.
pub type FactoryFn = dyn Fn(&Inject) -> Option<Export> + Send + Sync;

/// The loaded value of one file.
#[derive(Clone)]
pub enum Export {
    /// Plain data: objects, arrays and primitives.
    Value(Value),
    /// A factory that the loader may call with the injection argument.
    Factory(Arc<FactoryFn>),
    /// A constructible type handle. Never invoked by the loader.
    Type(Arc<dyn Any + Send + Sync>),
}

/// Capability tag of an [`Export`], decided once when the file is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    ConstructibleType,
    CallableFactory,
    PlainValue,
}

impl Export {
    pub fn factory<F>(f: F) -> Self
    where
        F: Fn(&Inject) -> Option<Export> + Send + Sync + 'static,
    {
        Export::Factory(Arc::new(f))
    }

    pub fn constructible<T: Any + Send + Sync>(value: T) -> Self {
        Export::Type(Arc::new(value))
    }

    pub fn kind(&self) -> ExportKind {
        match self {
            Export::Value(_) => ExportKind::PlainValue,
            Export::Factory(_) => ExportKind::CallableFactory,
            Export::Type(_) => ExportKind::ConstructibleType,
        }
    }

    /// `null`, booleans, numbers and strings. Provenance is never recorded for these.
    pub fn is_primitive(&self) -> bool {
        matches!(self, Export::Value(v) if !(v.is_object() || v.is_array()))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Export::Value(Value::Null))
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Export::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn downcast_type<T: Any>(&self) -> Option<&T> {
        match self {
            Export::Type(t) => t.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl From<Value> for Export {
    fn from(value: Value) -> Self {
        Export::Value(value)
    }
}

impl fmt::Debug for Export {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Export::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Export::Factory(_) => write!(f, "Factory(<fn>)"),
            Export::Type(_) => write!(f, "Type(<opaque>)"),
        }
    }
}

/// Turns files with particular extensions into exports.
pub trait ModuleSource: Send + Sync {
    /// Extensions handled by this source, without the leading dot.
    fn extensions(&self) -> Vec<String>;

    fn load(&self, path: &Path) -> Result<Export, LoaderError>;
}

/// Reads json/yaml/toml files as plain values.
#[derive(Debug, Default, Clone, Copy)]
pub struct DataModuleSource;

impl ModuleSource for DataModuleSource {
    fn extensions(&self) -> Vec<String> {
        ConfigFormat::known_extensions().into_iter().map(String::from).collect()
    }

    fn load(&self, path: &Path) -> Result<Export, LoaderError> {
        let value: Value = read_data_file(path)?;
        Ok(Export::Value(value))
    }
}

type LoadFn = dyn Fn(&Path) -> Result<Export, LoaderError> + Send + Sync;

/// A module source backed by a closure, for hosts that map their own file
/// kinds to factories or types.
pub struct FnModuleSource {
    extensions: Vec<String>,
    load: Box<LoadFn>,
}

impl FnModuleSource {
    pub fn new<F>(extension: &str, load: F) -> Self
    where
        F: Fn(&Path) -> Result<Export, LoaderError> + Send + Sync + 'static,
    {
        Self {
            extensions: vec![extension.trim_start_matches('.').to_string()],
            load: Box::new(load),
        }
    }
}

impl ModuleSource for FnModuleSource {
    fn extensions(&self) -> Vec<String> {
        self.extensions.clone()
    }

    fn load(&self, path: &Path) -> Result<Export, LoaderError> {
        (self.load)(path)
    }
}

/// Loads files through registered sources, caching each canonical path once.
pub struct ModuleLoader {
    sources: RwLock<Vec<Arc<dyn ModuleSource>>>,
    cache: RwLock<HashMap<PathBuf, Export>>,
}

impl ModuleLoader {
    /// A loader with the data-file source registered.
    pub fn new() -> Self {
        let loader = Self::empty();
        loader.register(Arc::new(DataModuleSource));
        loader
    }

    /// A loader without any source.
    pub fn empty() -> Self {
        Self {
            sources: RwLock::new(Vec::new()),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// The process-wide loader. Lives for the whole process and is never invalidated.
    pub fn global() -> &'static ModuleLoader {
        static GLOBAL: OnceLock<ModuleLoader> = OnceLock::new();
        GLOBAL.get_or_init(ModuleLoader::new)
    }

    /// Register a source. Later sources win for extensions already handled.
    pub fn register(&self, source: Arc<dyn ModuleSource>) {
        let mut sources = self.sources.write().unwrap_or_else(|e| e.into_inner());
        sources.push(source);
    }

    pub fn with_source(self, source: impl ModuleSource + 'static) -> Self {
        self.register(Arc::new(source));
        self
    }

    /// Every registered extension, first registration order, no duplicates.
    pub fn extensions(&self) -> Vec<String> {
        let sources = self.sources.read().unwrap_or_else(|e| e.into_inner());
        let mut extensions: Vec<String> = Vec::new();
        for ext in sources.iter().flat_map(|s| s.extensions()) {
            if !extensions.contains(&ext) {
                extensions.push(ext);
            }
        }
        extensions
    }

    /// Include globs matching every loadable file, e.g. `**/*.{json,yaml,yml,toml}`.
    pub fn default_patterns(&self) -> Vec<String> {
        match self.extensions().as_slice() {
            [] => Vec::new(),
            [single] => vec![format!("**/*.{}", single)],
            many => vec![format!("**/*.{{{}}}", many.join(","))],
        }
    }

    pub fn supports(&self, path: &Path) -> bool {
        self.source_for(path).is_some()
    }

    fn source_for(&self, path: &Path) -> Option<Arc<dyn ModuleSource>> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        let sources = self.sources.read().unwrap_or_else(|e| e.into_inner());
        sources
            .iter()
            .rev()
            .find(|s| s.extensions().iter().any(|e| e.eq_ignore_ascii_case(&ext)))
            .cloned()
    }

    /// Load `path`, returning the cached export when it was loaded before.
    pub fn load(&self, path: &Path) -> Result<Export, LoaderError> {
        let key = std::fs::canonicalize(path).map_err(|e| LoaderError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        if let Some(cached) = self.cache.read().unwrap_or_else(|e| e.into_inner()).get(&key) {
            return Ok(cached.clone());
        }

        let source = self
            .source_for(&key)
            .ok_or_else(|| LoaderError::UnsupportedModule { path: path.to_path_buf() })?;
        let export = source.load(&key)?;
        log::debug!("Loaded module {} as {:?}", key.display(), export.kind());

        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        Ok(cache.entry(key).or_insert(export).clone())
    }

    pub fn is_cached(&self, path: &Path) -> bool {
        std::fs::canonicalize(path)
            .map(|key| self.cache.read().unwrap_or_else(|e| e.into_inner()).contains_key(&key))
            .unwrap_or(false)
    }

    pub fn cached_count(&self) -> usize {
        self.cache.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl Default for ModuleLoader {
    fn default() -> Self {
        Self::new()
    }
}
