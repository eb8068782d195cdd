//! Shared, read-only context handed to every language loader.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Property holding the game directory override.
pub const GAME_DIRECTORY_PROPERTY: &str = "gamedir";

/// Default `log` target used by the core and handed to loaders.
pub const DEFAULT_LOG_TARGET: &str = "launchpad";

/// Context for one discovery run.
///
/// Built by the host and never mutated by the core: the orchestrator swaps in
/// a fresh value (see [`with_root_directory`](Self::with_root_directory)) when
/// it is pointed at a new game directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    root_directory: PathBuf,
    log_target: String,
    properties: BTreeMap<String, String>,
}

impl Environment {
    pub fn new(root_directory: impl Into<PathBuf>) -> Self {
        Self {
            root_directory: root_directory.into(),
            log_target: DEFAULT_LOG_TARGET.to_string(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_log_target(mut self, target: impl Into<String>) -> Self {
        self.log_target = target.into();
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_properties<I, K, V>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.properties
            .extend(properties.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Copy of this environment rooted at `root_directory`.
    pub fn with_root_directory(&self, root_directory: impl Into<PathBuf>) -> Self {
        Self {
            root_directory: root_directory.into(),
            ..self.clone()
        }
    }

    pub fn root_directory(&self) -> &Path {
        &self.root_directory
    }

    /// Target for `log` macros, e.g. `log::info!(target: env.log_target(), ...)`.
    pub fn log_target(&self) -> &str {
        &self.log_target
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(".")
    }
}
