//! # Launchpad Core
//!
//! Plugin discovery and loading for the Launchpad bootstrap. A run scans a
//! game directory for plugin artifacts, reads their manifests and hands each
//! artifact to the first registered language loader that claims it.
pub mod config;
pub mod kernel;
pub mod plugin_system;
pub mod utils;

pub use config::{ConfigError, LaunchConfig};
pub use kernel::error::Error as KernelError;
pub use kernel::{Launcher, LoadReport};
pub use plugin_system::{
    Environment, LanguageLoader, LoaderCatalog, PluginCandidate, PluginContainer, PluginLoader, PluginResource,
    PluginSystemError,
};

#[cfg(test)]
mod tests;
