use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::config::LaunchConfig;
use crate::kernel::constants;
use crate::kernel::error::Result;
use crate::plugin_system::environment::{Environment, GAME_DIRECTORY_PROPERTY};
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::loader::PluginLoader;
use crate::plugin_system::registry::{LoaderCatalog, LoaderStatus, ServicesManifest};
use crate::plugin_system::resource::PluginResource;
use crate::plugin_system::scanner::ResourceMap;
use crate::plugin_system::service::{DiscovererService, LaunchResource};
use crate::plugin_system::traits::LoadedPlugin;

/// Outcome of a full discovery run.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Every discovered loader and its status after initialization, in registry order
    pub loaders: Vec<(String, LoaderStatus)>,
    /// Every discovered resource in path order
    pub resources: Vec<PluginResource>,
    pub containers: Vec<LoadedPlugin>,
    /// Resources no loader claimed
    pub unclaimed: Vec<PluginResource>,
    /// Loader initialization and container creation failures
    pub failures: Vec<PluginSystemError>,
}

impl LoadReport {
    /// True when no loader or container failed.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Bootstrap context for one host process.
///
/// Owns the configuration and the loader registration table; every run gets
/// a fresh [`PluginLoader`], so a `Launcher` can be reused for several
/// directories.
pub struct Launcher {
    config: LaunchConfig,
    catalog: LoaderCatalog,
    environment: Environment,
}

impl Launcher {
    /// Build a launcher. When the configuration names a services manifest, the
    /// catalog is narrowed and reordered by it.
    pub fn new(config: LaunchConfig, catalog: LoaderCatalog) -> Result<Self> {
        info!(target: constants::LOG_TARGET, "Initializing {} v{}", constants::APP_NAME, constants::APP_VERSION);

        let catalog = match &config.services_manifest {
            Some(path) => {
                let manifest = ServicesManifest::load(path)?;
                debug!(target: constants::LOG_TARGET, "Services manifest {} lists {:?}", path.display(), manifest.names());
                catalog.restrict_to(&manifest)
            }
            None => catalog,
        };
        if catalog.is_empty() {
            warn!(target: constants::LOG_TARGET, "No language loaders are registered; nothing will be loaded");
        }

        let environment = config.environment();
        Ok(Self {
            config,
            catalog,
            environment,
        })
    }

    pub fn config(&self) -> &LaunchConfig {
        &self.config
    }

    pub fn catalog(&self) -> &LoaderCatalog {
        &self.catalog
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Game directory to use: `game_dir` if given, else the configured one.
    pub fn game_directory(&self, game_dir: Option<&Path>) -> PathBuf {
        game_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.config.game_directory.clone())
    }

    /// A fresh orchestrator over this launcher's catalog, with the environment
    /// rooted at `game_dir` so loaders see it during their initialization.
    pub fn new_loader(&self, game_dir: &Path) -> PluginLoader {
        PluginLoader::new(self.environment.with_root_directory(game_dir), self.catalog.clone())
            .with_extra_resources(self.config.extra_resources.clone())
    }

    /// Discover and initialize the language loaders, reporting their status.
    pub fn loaders(&self) -> Vec<(String, LoaderStatus)> {
        let mut loader = self.new_loader(&self.config.game_directory);
        loader.discover_services();
        loader.initialize_services();
        loader_statuses(&loader)
    }

    /// Scan `game_dir` and return the resources grouped by affinity key.
    pub fn scan(&self, game_dir: Option<&Path>) -> Result<ResourceMap> {
        let game_dir = self.game_directory(game_dir);
        let mut loader = self.new_loader(&game_dir);
        loader.initialize(&game_dir)?;
        loader.discover_resources()?;
        Ok(loader.resources().clone())
    }

    /// Run the host runtime adapter up to its scan and return the launch resources.
    pub fn launch_resources(&self, game_dir: Option<&Path>) -> Result<Vec<LaunchResource>> {
        let game_dir = self.game_directory(game_dir);
        let environment = self
            .environment
            .with_root_directory(&game_dir)
            .with_property(GAME_DIRECTORY_PROPERTY, game_dir.display().to_string());

        let mut service = DiscovererService::new(self.new_loader(&game_dir))
            .with_launch_attribute(self.config.launch_attribute.clone());
        debug!(target: constants::LOG_TARGET, "Starting service '{}'", service.name());
        service.on_load();
        service.initialize(&environment)?;
        service.begin_scanning();
        Ok(service.run_scan()?)
    }

    /// Run the whole pipeline against `game_dir` (or the configured directory).
    ///
    /// Only an unusable game directory fails the call; loader and container
    /// failures end up in [`LoadReport::failures`].
    pub fn load_plugins(&self, game_dir: Option<&Path>) -> Result<LoadReport> {
        let game_dir = self.game_directory(game_dir);
        let mut loader = self.new_loader(&game_dir);

        loader.discover_services();
        let mut failures = loader.initialize_services();
        loader.initialize(&game_dir)?;
        loader.discover_resources()?;
        loader.determine_candidates()?;
        let created = loader.create_containers()?;

        let loaders = loader_statuses(&loader);
        let resources = loader.all_resources();
        let unclaimed = loader.unclaimed().to_vec();
        let (containers, container_failures) = loader.into_results();
        failures.extend(container_failures);

        info!(
            target: constants::LOG_TARGET,
            "Loaded {} plugin(s) from {} ({} unclaimed, {} failure(s))",
            created,
            game_dir.display(),
            unclaimed.len(),
            failures.len()
        );

        Ok(LoadReport {
            loaders,
            resources,
            containers,
            unclaimed,
            failures,
        })
    }
}

fn loader_statuses(loader: &PluginLoader) -> Vec<(String, LoaderStatus)> {
    loader
        .services()
        .iter()
        .map(|(name, status)| (name.to_string(), status))
        .collect()
}
