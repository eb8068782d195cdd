//! # Language Loader Registry
//!
//! Loaders are made known through a [`LoaderCatalog`]: a registration table of
//! factory functions assembled by the host at build time (the `launchpad`
//! binary registers the bundled loaders in `main.rs`). A plain-text
//! [`ServicesManifest`] can narrow and reorder that table at startup without a
//! rebuild.
//!
//! [`LoaderRegistry::discover_services`] instantiates every catalog entry in
//! order. Names are unique and the **first registration wins**: later entries
//! with a name that is already taken are logged and dropped.
use std::collections::HashSet;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

use log::{error, info, warn};

use crate::plugin_system::environment::Environment;
use crate::plugin_system::error::{panic_message, PluginSystemError};
use crate::plugin_system::traits::LanguageLoader;

/// Builds a fresh loader instance.
pub type LoaderFactory = Arc<dyn Fn() -> Box<dyn LanguageLoader> + Send + Sync>;

/// One row of the registration table.
#[derive(Clone)]
pub struct LoaderEntry {
    pub name: String,
    pub factory: LoaderFactory,
}

impl fmt::Debug for LoaderEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoaderEntry")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Ordered registration table of loader factories.
#[derive(Debug, Clone, Default)]
pub struct LoaderCatalog {
    entries: Vec<LoaderEntry>,
}

impl LoaderCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a factory under `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Box<dyn LanguageLoader> + Send + Sync + 'static,
    {
        self.entries.push(LoaderEntry {
            name: name.into(),
            factory: Arc::new(factory),
        });
        self
    }

    /// Builder-style [`register`](Self::register).
    pub fn with<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Box<dyn LanguageLoader> + Send + Sync + 'static,
    {
        self.register(name, factory);
        self
    }

    pub fn entries(&self) -> &[LoaderEntry] {
        &self.entries
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Catalog containing only the entries listed in `manifest`, in manifest order.
    /// Listed names with no matching entry are logged.
    pub fn restrict_to(&self, manifest: &ServicesManifest) -> LoaderCatalog {
        let mut entries = Vec::new();
        for name in manifest.names() {
            match self.entries.iter().find(|e| e.name == *name) {
                Some(entry) => entries.push(entry.clone()),
                None => warn!("Services manifest lists unknown language loader '{}'", name),
            }
        }
        LoaderCatalog { entries }
    }
}

/// Declarative list of loader names, one per line. `#` starts a comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServicesManifest {
    names: Vec<String>,
}

impl ServicesManifest {
    pub fn parse(text: &str) -> Self {
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        for line in text.lines() {
            let entry = line.split('#').next().unwrap_or_default().trim();
            if entry.is_empty() {
                continue;
            }
            if seen.insert(entry.to_string()) {
                names.push(entry.to_string());
            }
        }
        Self { names }
    }

    pub fn load(path: &Path) -> Result<Self, PluginSystemError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| PluginSystemError::io(e, "read_services_manifest", path.to_path_buf()))?;
        Ok(Self::parse(&text))
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Lifecycle of a registered loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderStatus {
    /// Discovered, `initialize` not yet called
    Pending,
    Ready,
    /// `initialize` failed; excluded from claiming and container creation
    Failed,
}

impl fmt::Display for LoaderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoaderStatus::Pending => write!(f, "pending"),
            LoaderStatus::Ready => write!(f, "ready"),
            LoaderStatus::Failed => write!(f, "failed"),
        }
    }
}

struct RegisteredLoader {
    name: String,
    loader: Box<dyn LanguageLoader>,
    status: LoaderStatus,
}

/// Owns the discovered language loaders, in discovery order.
#[derive(Default)]
pub struct LoaderRegistry {
    loaders: Vec<RegisteredLoader>,
}

impl LoaderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Instantiate every catalog entry, replacing the current content.
    /// Returns the number of loaders registered.
    pub fn discover_services(&mut self, catalog: &LoaderCatalog) -> usize {
        self.loaders.clear();
        for entry in catalog.entries() {
            let loader = (entry.factory)();
            let name = loader.name().to_string();
            if name != entry.name {
                warn!(
                    "Language loader registered as '{}' reports the name '{}'; using '{}'",
                    entry.name, name, name
                );
            }
            if self.contains(&name) {
                warn!("Duplicate language loader '{}' ignored; the first registration wins", name);
                continue;
            }
            self.loaders.push(RegisteredLoader {
                name,
                loader,
                status: LoaderStatus::Pending,
            });
        }
        self.loaders.len()
    }

    /// Initialize every pending loader once, in discovery order.
    ///
    /// Failing or panicking loaders are marked [`LoaderStatus::Failed`] and
    /// their errors returned; the others are unaffected.
    pub fn initialize_all(&mut self, environment: &Environment) -> Vec<PluginSystemError> {
        let mut failures = Vec::new();
        for entry in self.loaders.iter_mut().filter(|e| e.status == LoaderStatus::Pending) {
            let loader = &mut entry.loader;
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| loader.initialize(environment)))
                .unwrap_or_else(|payload| {
                    Err(PluginSystemError::LoaderInitialization {
                        loader: entry.name.clone(),
                        message: format!("panic: {}", panic_message(payload.as_ref())),
                    })
                });
            match outcome {
                Ok(()) => {
                    info!("Language loader '{}' initialized", entry.name);
                    entry.status = LoaderStatus::Ready;
                }
                Err(e) => {
                    let failure = match e {
                        e @ PluginSystemError::LoaderInitialization { .. } => e,
                        other => PluginSystemError::LoaderInitialization {
                            loader: entry.name.clone(),
                            message: other.to_string(),
                        },
                    };
                    error!("{}; loader excluded", failure);
                    entry.status = LoaderStatus::Failed;
                    failures.push(failure);
                }
            }
        }
        failures
    }

    pub fn contains(&self, name: &str) -> bool {
        self.loaders.iter().any(|e| e.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&dyn LanguageLoader> {
        self.loaders
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.loader.as_ref())
    }

    pub fn status(&self, name: &str) -> Option<LoaderStatus> {
        self.loaders.iter().find(|e| e.name == name).map(|e| e.status)
    }

    /// Loader names in discovery order
    pub fn names(&self) -> Vec<&str> {
        self.loaders.iter().map(|e| e.name.as_str()).collect()
    }

    /// Names and statuses in discovery order
    pub fn iter(&self) -> impl Iterator<Item = (&str, LoaderStatus)> {
        self.loaders.iter().map(|e| (e.name.as_str(), e.status))
    }

    /// Initialized loaders in discovery order
    pub fn active(&self) -> impl Iterator<Item = &dyn LanguageLoader> {
        self.loaders
            .iter()
            .filter(|e| e.status == LoaderStatus::Ready)
            .map(|e| e.loader.as_ref())
    }

    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }
}

impl fmt::Debug for LoaderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
