use std::any::Any;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::loader::case::{CaseStyle, derive_segments};
use crate::loader::error::LoaderError;
use crate::loader::module::{Export, ExportKind, Inject, ModuleLoader};
use crate::loader::namespace::NamespaceTree;
use crate::utils::fs::{find_files, relative_slash_path};

/// Context handed to an initializer alongside the loaded export.
#[derive(Debug, Clone)]
pub struct ItemContext<'a> {
    /// Absolute path of the file.
    pub path: &'a Path,
    /// `<root folder name>.<segments>`, e.g. `service.foo.bar`.
    pub path_name: String,
}

pub type Initializer = dyn Fn(Export, &ItemContext<'_>) -> Export + Send + Sync;
pub type ExportFilter = dyn Fn(&Export) -> bool + Send + Sync;

/// One discovered file, ready to be attached.
#[derive(Debug, Clone)]
pub struct LoadItem {
    pub full_path: PathBuf,
    pub segments: Vec<String>,
    pub value: Export,
}

/// Options for a [`FileLoader`] run.
#[derive(Clone)]
pub struct FileLoaderOptions {
    /// Roots scanned in order.
    pub directories: Vec<PathBuf>,
    /// Include globs. Empty means every file a module source can load.
    pub match_patterns: Vec<String>,
    /// Exclude globs.
    pub ignore_patterns: Vec<String>,
    pub case_style: CaseStyle,
    pub initializer: Option<Arc<Initializer>>,
    /// Invoke factory exports with `inject`.
    pub call: bool,
    /// Let later items replace earlier leaves.
    pub override_existing: bool,
    pub inject: Option<Arc<Inject>>,
    pub filter: Option<Arc<ExportFilter>>,
}

impl Default for FileLoaderOptions {
    fn default() -> Self {
        Self {
            directories: Vec::new(),
            match_patterns: Vec::new(),
            ignore_patterns: Vec::new(),
            case_style: CaseStyle::Camel,
            initializer: None,
            call: true,
            override_existing: false,
            inject: None,
            filter: None,
        }
    }
}

impl fmt::Debug for FileLoaderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileLoaderOptions")
            .field("directories", &self.directories)
            .field("match_patterns", &self.match_patterns)
            .field("ignore_patterns", &self.ignore_patterns)
            .field("case_style", &self.case_style)
            .field("initializer", &self.initializer.is_some())
            .field("call", &self.call)
            .field("override_existing", &self.override_existing)
            .field("inject", &self.inject.is_some())
            .field("filter", &self.filter.is_some())
            .finish()
    }
}

impl FileLoaderOptions {
    pub fn new<P: AsRef<Path>>(directory: P) -> Self {
        Self::default().directory(directory)
    }

    /// Add a root directory
    pub fn directory<P: AsRef<Path>>(mut self, directory: P) -> Self {
        self.directories.push(directory.as_ref().to_path_buf());
        self
    }

    /// Add several root directories
    pub fn directories<I, P>(mut self, directories: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.directories.extend(directories.into_iter().map(|d| d.as_ref().to_path_buf()));
        self
    }

    pub fn match_pattern(mut self, pattern: &str) -> Self {
        self.match_patterns.push(pattern.to_string());
        self
    }

    pub fn ignore(mut self, pattern: &str) -> Self {
        if !pattern.is_empty() {
            self.ignore_patterns.push(pattern.to_string());
        }
        self
    }

    pub fn case_style(mut self, style: CaseStyle) -> Self {
        self.case_style = style;
        self
    }

    /// Lowercase the first character of every segment.
    #[deprecated(since = "0.2.0", note = "Use `case_style(CaseStyle::Lower)` instead.")]
    pub fn lowercase_first(mut self, lowercase: bool) -> Self {
        if lowercase {
            log::warn!("lowercase_first is deprecated, use case_style instead");
            self.case_style = CaseStyle::Lower;
        }
        self
    }

    pub fn initializer<F>(mut self, f: F) -> Self
    where
        F: Fn(Export, &ItemContext<'_>) -> Export + Send + Sync + 'static,
    {
        self.initializer = Some(Arc::new(f));
        self
    }

    pub fn call(mut self, call: bool) -> Self {
        self.call = call;
        self
    }

    pub fn override_existing(mut self, override_existing: bool) -> Self {
        self.override_existing = override_existing;
        self
    }

    pub fn inject<T: Any + Send + Sync>(mut self, inject: T) -> Self {
        self.inject = Some(Arc::new(inject));
        self
    }

    pub fn filter<F>(mut self, f: F) -> Self
    where
        F: Fn(&Export) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(f));
        self
    }
}

/// Maps one or more directory trees onto a [`NamespaceTree`].
///
/// `app/controller/group/repository.json` under root `app/controller`
/// becomes `group.repository`.
pub struct FileLoader<'m> {
    options: FileLoaderOptions,
    modules: &'m ModuleLoader,
}

impl FileLoader<'static> {
    /// A loader backed by the process-wide module cache.
    pub fn new(options: FileLoaderOptions) -> Self {
        Self::with_modules(options, ModuleLoader::global())
    }
}

impl<'m> FileLoader<'m> {
    pub fn with_modules(options: FileLoaderOptions, modules: &'m ModuleLoader) -> Self {
        Self { options, modules }
    }

    pub fn options(&self) -> &FileLoaderOptions {
        &self.options
    }

    /// Parse and attach every item to a fresh tree.
    pub fn load(&self) -> Result<NamespaceTree, LoaderError> {
        let mut tree = NamespaceTree::new();
        self.load_into(&mut tree)?;
        Ok(tree)
    }

    /// Parse and attach every item to `target`, which is returned for chaining.
    pub fn load_into<'t>(&self, target: &'t mut NamespaceTree) -> Result<&'t mut NamespaceTree, LoaderError> {
        for item in self.parse()? {
            log::debug!("loading item {} as {:?}", item.full_path.display(), item.segments);
            target.attach(&item.segments, item.value, &item.full_path, self.options.override_existing)?;
        }
        Ok(target)
    }

    /// Discover files and produce their items without attaching them.
    pub fn parse(&self) -> Result<Vec<LoadItem>, LoaderError> {
        let include_patterns = if self.options.match_patterns.is_empty() {
            self.modules.default_patterns()
        } else {
            self.options.match_patterns.clone()
        };
        let include = build_globset(&include_patterns)?;
        let exclude = build_globset(&self.options.ignore_patterns)?;

        let mut items = Vec::new();
        log::debug!("parsing {:?}", self.options.directories);
        for directory in &self.options.directories {
            if !directory.is_dir() {
                log::debug!("skipping missing directory {}", directory.display());
                continue;
            }

            let files = find_files(directory, &|_: &Path| true)
                .map_err(|e| LoaderError::Io { path: directory.clone(), source: e })?;
            let root_name = directory
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            for full_path in files {
                let Some(relative) = relative_slash_path(directory, &full_path) else {
                    continue;
                };
                if is_hidden(&relative) {
                    log::debug!("skipping hidden file {}", full_path.display());
                    continue;
                }
                if !include.is_match(&relative) || exclude.is_match(&relative) {
                    continue;
                }

                let segments = derive_segments(&relative, &self.options.case_style)?;
                let path_name = format!("{}.{}", root_name, segments.join("."));
                let Some(value) = self.produce(&full_path, path_name)? else {
                    continue;
                };

                log::debug!("parse {}, properties {:?}", full_path.display(), segments);
                items.push(LoadItem { full_path, segments, value });
            }
        }
        Ok(items)
    }

    // None means the item is dropped.
    fn produce(&self, full_path: &Path, path_name: String) -> Result<Option<Export>, LoaderError> {
        let mut export = self.modules.load(full_path)?;

        if let Some(initializer) = &self.options.initializer {
            let context = ItemContext { path: full_path, path_name };
            export = initializer(export, &context);
        }

        export = match export.kind() {
            ExportKind::CallableFactory if self.options.call => self.invoke(export),
            _ => export,
        };

        if export.is_null() {
            return Ok(None);
        }
        if let Some(filter) = &self.options.filter {
            if !filter(&export) {
                return Ok(None);
            }
        }
        Ok(Some(export))
    }

    fn invoke(&self, export: Export) -> Export {
        let factory = match &export {
            Export::Factory(factory) => Arc::clone(factory),
            _ => return export,
        };
        let unit = ();
        let inject: &Inject = match &self.options.inject {
            Some(inject) => inject.as_ref(),
            None => &unit,
        };
        match factory(inject) {
            Some(result) if !result.is_null() => result,
            _ => export,
        }
    }
}

// Any component starting with `.`, file or directory.
fn is_hidden(relative: &str) -> bool {
    relative.split('/').any(|component| component.starts_with('.'))
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, LoaderError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        // `*` stays within one directory level, only `**` crosses `/`.
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| LoaderError::Pattern {
                pattern: pattern.clone(),
                source: e,
            })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| LoaderError::Pattern {
        pattern: patterns.join(", "),
        source: e,
    })
}
