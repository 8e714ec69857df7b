//! Finding unit source text.
//!
//! A [`LoadPath`] is an ordered list of [`LoadLocation`]s. A unit name is
//! looked up in each location in turn and the first one that has it wins.
//! The location that supplied a unit also decides whether the unit may
//! declare native (`via`) functions.
//!
//! Unit names are `/`-separated. An import path starting with `./` or
//! `../` is resolved against the directory of the importing unit; any
//! other path is used as written.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rill_diagnostic::LoadError;
use rustc_hash::FxHashMap;

/// The source of one unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadedUnit {
    pub name: Arc<str>,
    pub source: Arc<str>,
    pub allow_native_functions: bool,
}

/// A place units can be loaded from.
pub trait LoadLocation: Send + Sync {
    /// Source text of `name`, or `None` when this location does not have it.
    fn load(&self, name: &str) -> Result<Option<Arc<str>>, LoadError>;

    /// Whether units from this location may use native functions.
    fn allow_native_functions(&self) -> bool;
}

#[derive(Default)]
pub struct LoadPath {
    locations: Vec<Box<dyn LoadLocation>>,
}

impl LoadPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a location, searched after the ones already present.
    #[must_use]
    pub fn with(mut self, location: impl LoadLocation + 'static) -> Self {
        self.push(location);
        self
    }

    pub fn push(&mut self, location: impl LoadLocation + 'static) {
        self.locations.push(Box::new(location));
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Load `name` from the first location that has it.
    pub fn resolve(&self, name: &str) -> Result<LoadedUnit, LoadError> {
        for location in &self.locations {
            if let Some(source) = location.load(name)? {
                return Ok(LoadedUnit {
                    name: Arc::from(name),
                    source,
                    allow_native_functions: location.allow_native_functions(),
                });
            }
        }
        Err(LoadError::NotFound {
            unit: Arc::from(name),
        })
    }
}

impl fmt::Debug for LoadPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadPath")
            .field("locations", &self.locations.len())
            .finish()
    }
}

/// Units held in memory, keyed by name.
#[derive(Clone, Debug, Default)]
pub struct MemoryLocation {
    units: FxHashMap<Arc<str>, Arc<str>>,
    allow_native_functions: bool,
}

impl MemoryLocation {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn add(mut self, name: &str, source: &str) -> Self {
        self.insert(name, source);
        self
    }

    pub fn insert(&mut self, name: &str, source: &str) {
        self.units.insert(Arc::from(name), Arc::from(source));
    }

    #[must_use]
    pub fn with_native_functions(mut self, allow: bool) -> Self {
        self.allow_native_functions = allow;
        self
    }
}

impl LoadLocation for MemoryLocation {
    fn load(&self, name: &str) -> Result<Option<Arc<str>>, LoadError> {
        Ok(self.units.get(name).cloned())
    }

    fn allow_native_functions(&self) -> bool {
        self.allow_native_functions
    }
}

/// Units stored as files below a root directory. A name without an
/// extension gets the location's default one (`.rill`).
#[derive(Clone, Debug)]
pub struct FilesystemLocation {
    root: PathBuf,
    extension: String,
    allow_native_functions: bool,
}

impl FilesystemLocation {
    pub const DEFAULT_EXTENSION: &'static str = "rill";

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: Self::DEFAULT_EXTENSION.to_string(),
            allow_native_functions: false,
        }
    }

    #[must_use]
    pub fn extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    #[must_use]
    pub fn with_native_functions(mut self, allow: bool) -> Self {
        self.allow_native_functions = allow;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_of(&self, name: &str) -> Option<PathBuf> {
        // Names never escape the root.
        if name.split('/').any(|part| part == "..") || name.starts_with('/') {
            return None;
        }
        let mut path = self.root.join(name);
        if path.extension().is_none() {
            path.set_extension(&self.extension);
        }
        Some(path)
    }
}

impl LoadLocation for FilesystemLocation {
    fn load(&self, name: &str) -> Result<Option<Arc<str>>, LoadError> {
        let Some(path) = self.path_of(name) else {
            return Ok(None);
        };
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                tracing::debug!(unit = name, path = %path.display(), "loaded");
                Ok(Some(Arc::from(text)))
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(LoadError::Io {
                unit: Arc::from(name),
                source,
            }),
        }
    }

    fn allow_native_functions(&self) -> bool {
        self.allow_native_functions
    }
}

/// Canonical name of the unit `path` imported from `importer`.
pub fn resolve_import(importer: &str, path: &str) -> Arc<str> {
    if !(path.starts_with("./") || path.starts_with("../")) {
        return Arc::from(path);
    }
    let mut parts: Vec<&str> = importer.split('/').collect();
    parts.pop();
    for part in path.split('/') {
        match part {
            "." | "" => {}
            ".." => {
                // Leading `..` beyond the root are kept so the lookup fails
                // instead of silently aliasing another unit.
                if matches!(parts.last(), None | Some(&"..")) {
                    parts.push("..");
                } else {
                    parts.pop();
                }
            }
            part => parts.push(part),
        }
    }
    Arc::from(parts.join("/"))
}

#[cfg(test)]
mod tests;
