//! Adapter between the host runtime's service lifecycle and [`PluginLoader`].
//!
//! The host calls `on_load` when it learns about the service, then
//! `initialize`, `begin_scanning` and `run_scan`. `run_scan` reports the
//! artifacts the host itself has to put on its launch path: those whose
//! manifest carries the launch attribute (`MixinConfigs` by default).
use std::path::{Path, PathBuf};

use log::info;

use crate::plugin_system::environment::{Environment, GAME_DIRECTORY_PROPERTY};
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::loader::PluginLoader;
use crate::plugin_system::manifest::attributes;
use crate::plugin_system::resource::PluginResource;

/// An artifact handed back to the host, named after its file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchResource {
    pub name: String,
    pub path: PathBuf,
}

pub struct DiscovererService {
    loader: PluginLoader,
    launch_attribute: String,
}

impl DiscovererService {
    pub const NAME: &'static str = "plugin_discoverer";

    pub fn new(loader: PluginLoader) -> Self {
        Self {
            loader,
            launch_attribute: attributes::MIXIN_CONFIGS.to_string(),
        }
    }

    /// Use a different manifest attribute to select launch resources.
    pub fn with_launch_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.launch_attribute = attribute.into();
        self
    }

    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    /// Discover the available language loaders.
    pub fn on_load(&mut self) -> usize {
        self.loader.discover_services()
    }

    /// Initialize the loader at the environment's `gamedir` property, or `.`.
    pub fn initialize(&mut self, environment: &Environment) -> Result<(), PluginSystemError> {
        let game_directory = environment
            .property(GAME_DIRECTORY_PROPERTY)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        self.loader.initialize(game_directory)
    }

    pub fn begin_scanning(&mut self) {}

    /// Discover resources and return the launch resources among them, in path order.
    pub fn run_scan(&mut self) -> Result<Vec<LaunchResource>, PluginSystemError> {
        self.loader.discover_resources()?;
        let launch: Vec<LaunchResource> = self
            .loader
            .all_resources()
            .iter()
            .filter(|resource| carries_attribute(resource, &self.launch_attribute))
            .map(|resource| LaunchResource {
                name: resource.file_name(),
                path: resource.root_path().to_path_buf(),
            })
            .collect();
        info!(
            target: self.loader.environment().log_target(),
            "{} launch resource(s) carry '{}'",
            launch.len(),
            self.launch_attribute
        );
        Ok(launch)
    }

    pub fn loader(&self) -> &PluginLoader {
        &self.loader
    }

    pub fn loader_mut(&mut self) -> &mut PluginLoader {
        &mut self.loader
    }

    /// Hand the loader back to the bootstrap for the remaining phases.
    pub fn into_loader(self) -> PluginLoader {
        self.loader
    }

    pub fn root_directory(&self) -> &Path {
        self.loader.environment().root_directory()
    }
}

fn carries_attribute(resource: &PluginResource, attribute: &str) -> bool {
    resource
        .manifest()
        .and_then(|manifest| manifest.attribute(attribute))
        .is_some()
}
