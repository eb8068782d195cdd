//! # Plugin Loader
//!
//! [`PluginLoader`] coordinates one discovery run. The host drives it through
//! a fixed sequence of phases:
//!
//! ```text
//! Created -> Initialized -> ResourcesDiscovered -> CandidatesDetermined -> ContainersCreated
//! ```
//!
//! `discover_services` and `initialize_services` can run at any time (the host
//! adapter calls them before `initialize`). Every other phase checks the
//! current [`LoaderState`] and fails with
//! [`PluginSystemError::InvalidState`] when called out of order.
//!
//! Claiming is **first-claim-wins**: loaders are asked in registry order and
//! each one only sees the resources no earlier loader took.
use std::collections::HashSet;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};

use crate::plugin_system::environment::Environment;
use crate::plugin_system::error::{panic_message, PluginSystemError};
use crate::plugin_system::registry::{LoaderCatalog, LoaderRegistry, LoaderStatus};
use crate::plugin_system::resource::PluginResource;
use crate::plugin_system::scanner::{group_by_affinity, ResourceMap, ResourceScanner};
use crate::plugin_system::traits::{LoadedPlugin, PluginCandidate};
use crate::utils::fs::identity_key;

/// Pipeline phase of a [`PluginLoader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LoaderState {
    Created,
    Initialized,
    ResourcesDiscovered,
    CandidatesDetermined,
    ContainersCreated,
}

impl fmt::Display for LoaderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoaderState::Created => "CREATED",
            LoaderState::Initialized => "INITIALIZED",
            LoaderState::ResourcesDiscovered => "RESOURCES_DISCOVERED",
            LoaderState::CandidatesDetermined => "CANDIDATES_DETERMINED",
            LoaderState::ContainersCreated => "CONTAINERS_CREATED",
        };
        f.write_str(name)
    }
}

/// Discovers plugin resources and turns them into containers via the
/// registered language loaders.
pub struct PluginLoader {
    environment: Environment,
    catalog: LoaderCatalog,
    registry: LoaderRegistry,
    scanner: ResourceScanner,
    /// Artifacts outside the root that are scanned alongside it
    extra_resources: Vec<PathBuf>,
    state: LoaderState,
    resources: ResourceMap,
    /// Claimed candidates per loader, in registry order
    candidates: Vec<(String, Vec<PluginCandidate>)>,
    unclaimed: Vec<PluginResource>,
    containers: Vec<LoadedPlugin>,
    failures: Vec<PluginSystemError>,
}

impl PluginLoader {
    /// Create a loader over `catalog`. No loader is instantiated until
    /// [`discover_services`](Self::discover_services).
    pub fn new(environment: Environment, catalog: LoaderCatalog) -> Self {
        Self {
            environment,
            catalog,
            registry: LoaderRegistry::new(),
            scanner: ResourceScanner::new(),
            extra_resources: Vec::new(),
            state: LoaderState::Created,
            resources: ResourceMap::new(),
            candidates: Vec::new(),
            unclaimed: Vec::new(),
            containers: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Additional artifacts to scan next to the root directory.
    pub fn with_extra_resources(mut self, paths: Vec<PathBuf>) -> Self {
        self.extra_resources = paths;
        self
    }

    /// Populate the loader registry from the catalog. Allowed in any state.
    pub fn discover_services(&mut self) -> usize {
        let count = self.registry.discover_services(&self.catalog);
        for name in self.registry.names() {
            info!(target: self.environment.log_target(), "Plugin language loader '{}' found.", name);
        }
        count
    }

    /// Initialize every discovered loader that has not been initialized yet.
    /// Returns the loaders that failed; they are excluded from later phases.
    pub fn initialize_services(&mut self) -> Vec<PluginSystemError> {
        self.registry.initialize_all(&self.environment)
    }

    /// Point the loader at `game_directory` and drop any earlier discovery results.
    ///
    /// Fails with [`PluginSystemError::NotFound`] without touching any state if
    /// the directory does not exist.
    pub fn initialize<P: AsRef<Path>>(&mut self, game_directory: P) -> Result<(), PluginSystemError> {
        let game_directory = game_directory.as_ref();
        if !game_directory.is_dir() {
            return Err(PluginSystemError::NotFound {
                path: game_directory.to_path_buf(),
            });
        }

        self.environment = self.environment.with_root_directory(game_directory);
        self.resources.clear();
        self.clear_pipeline_results();
        self.state = LoaderState::Initialized;
        info!(target: self.environment.log_target(), "Plugin loader initialized at {}", game_directory.display());
        Ok(())
    }

    /// Scan the root directory (and any extra resources). Re-running replaces
    /// the previous results and everything derived from them.
    pub fn discover_resources(&mut self) -> Result<&ResourceMap, PluginSystemError> {
        if self.state < LoaderState::Initialized {
            return Err(self.invalid_state("discover resources", LoaderState::Initialized));
        }

        let mut resources = self.scanner.discover_resources(self.environment.root_directory())?;
        if !self.extra_resources.is_empty() {
            let mut all = ResourceScanner::flatten(&resources);
            let mut seen: HashSet<PathBuf> = all.iter().map(|r| identity_key(r.root_path())).collect();
            for extra in self.scanner.scan_paths(&self.extra_resources) {
                if !seen.insert(identity_key(extra.root_path())) {
                    debug!(
                        target: self.environment.log_target(),
                        "Extra resource {} is already part of the scan",
                        extra.root_path().display()
                    );
                    continue;
                }
                all.push(extra);
            }
            all.sort_by(|a, b| a.root_path().cmp(b.root_path()));
            resources = group_by_affinity(all);
        }

        let total: usize = resources.values().map(Vec::len).sum();
        info!(target: self.environment.log_target(), "Discovered {} plugin resource(s)", total);

        self.resources = resources;
        self.clear_pipeline_results();
        self.state = LoaderState::ResourcesDiscovered;
        Ok(&self.resources)
    }

    /// Offer the discovered resources to each active loader in registry order.
    pub fn determine_candidates(&mut self) -> Result<(), PluginSystemError> {
        self.require(LoaderState::ResourcesDiscovered, "determine candidates")?;

        for (name, status) in self.registry.iter() {
            if status == LoaderStatus::Pending {
                warn!(target: self.environment.log_target(), "Language loader '{}' was never initialized; skipping it", name);
            }
        }

        let mut pool = ResourceScanner::flatten(&self.resources);
        let mut assignments = Vec::new();

        for loader in self.registry.active() {
            let name = loader.name().to_string();
            let claims = if pool.is_empty() {
                Vec::new()
            } else {
                let environment = &self.environment;
                let offered = &pool;
                match panic::catch_unwind(AssertUnwindSafe(|| loader.claim_resources(environment, offered))) {
                    Ok(claims) => claims,
                    Err(payload) => {
                        error!(
                            target: self.environment.log_target(),
                            "Language loader '{}' panicked while claiming resources: {}; it claims nothing",
                            name,
                            panic_message(payload.as_ref())
                        );
                        Vec::new()
                    }
                }
            };

            let mut accepted = Vec::new();
            for claim in claims {
                let path = claim.resource().root_path();
                match pool.iter().position(|r| r.root_path() == path) {
                    Some(idx) => {
                        // Rebuild from the pooled resource so the candidate carries
                        // the scanned metadata and the claiming loader's name.
                        let resource = pool.remove(idx);
                        accepted.push(PluginCandidate::new(resource, name.as_str()));
                    }
                    None => warn!(
                        target: self.environment.log_target(),
                        "Language loader '{}' claimed {} which is not available to it; ignoring the claim",
                        name,
                        path.display()
                    ),
                }
            }
            accepted.sort_by(|a, b| a.resource().root_path().cmp(b.resource().root_path()));

            debug!(target: self.environment.log_target(), "Language loader '{}' claimed {} resource(s)", name, accepted.len());
            assignments.push((name, accepted));
        }

        for resource in &pool {
            info!(
                target: self.environment.log_target(),
                "No language loader claimed {}; it will not be loaded",
                resource.root_path().display()
            );
        }

        self.candidates = assignments;
        self.unclaimed = pool;
        self.containers.clear();
        self.failures.clear();
        self.state = LoaderState::CandidatesDetermined;
        Ok(())
    }

    /// Ask each loader to build containers for its candidates. A failing or
    /// panicking candidate is logged and recorded in [`failures`](Self::failures);
    /// its siblings and the other loaders carry on. Returns the number of
    /// containers created.
    pub fn create_containers(&mut self) -> Result<usize, PluginSystemError> {
        self.require(LoaderState::CandidatesDetermined, "create containers")?;

        let mut containers = Vec::new();
        let mut failures = Vec::new();

        for (loader_name, candidates) in &self.candidates {
            if candidates.is_empty() {
                continue;
            }
            let Some(loader) = self.registry.get(loader_name) else {
                continue;
            };

            for candidate in candidates {
                let resource = candidate.resource().root_path();
                let environment = &self.environment;
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| loader.create_container(environment, candidate)))
                    .unwrap_or_else(|payload| {
                        Err(PluginSystemError::ContainerCreation {
                            loader: loader_name.clone(),
                            resource: resource.to_path_buf(),
                            message: format!("panic: {}", panic_message(payload.as_ref())),
                        })
                    });
                match outcome {
                    Ok(container) => {
                        info!(
                            target: self.environment.log_target(),
                            "Loaded plugin '{}' v{} from {} with '{}'",
                            container.id(),
                            container.version(),
                            resource.display(),
                            loader_name
                        );
                        containers.push(LoadedPlugin {
                            loader: loader_name.clone(),
                            container,
                        });
                    }
                    Err(e) => {
                        let failure = container_failure(loader_name, resource, e);
                        error!(target: self.environment.log_target(), "{}", failure);
                        failures.push(failure);
                    }
                }
            }
        }

        let created = containers.len();
        self.containers = containers;
        self.failures = failures;
        self.state = LoaderState::ContainersCreated;
        Ok(created)
    }

    pub fn state(&self) -> LoaderState {
        self.state
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// The language loader registry
    pub fn services(&self) -> &LoaderRegistry {
        &self.registry
    }

    /// Discovered resources grouped by affinity key
    pub fn resources(&self) -> &ResourceMap {
        &self.resources
    }

    /// Every discovered resource in path order
    pub fn all_resources(&self) -> Vec<PluginResource> {
        ResourceScanner::flatten(&self.resources)
    }

    /// Candidates per loader, in registry order
    pub fn candidates(&self) -> &[(String, Vec<PluginCandidate>)] {
        &self.candidates
    }

    pub fn candidates_for(&self, loader: &str) -> &[PluginCandidate] {
        self.candidates
            .iter()
            .find(|(name, _)| name == loader)
            .map(|(_, candidates)| candidates.as_slice())
            .unwrap_or_default()
    }

    /// Resources no loader claimed
    pub fn unclaimed(&self) -> &[PluginResource] {
        &self.unclaimed
    }

    pub fn containers(&self) -> &[LoadedPlugin] {
        &self.containers
    }

    /// Container creation failures of the last run
    pub fn failures(&self) -> &[PluginSystemError] {
        &self.failures
    }

    /// Consume the loader, keeping only the containers and failures of the last run.
    pub fn into_results(self) -> (Vec<LoadedPlugin>, Vec<PluginSystemError>) {
        (self.containers, self.failures)
    }

    fn require(&self, expected: LoaderState, operation: &'static str) -> Result<(), PluginSystemError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(self.invalid_state(operation, expected))
        }
    }

    fn invalid_state(&self, operation: &'static str, expected: LoaderState) -> PluginSystemError {
        PluginSystemError::InvalidState {
            operation,
            expected,
            actual: self.state,
        }
    }

    fn clear_pipeline_results(&mut self) {
        self.candidates.clear();
        self.unclaimed.clear();
        self.containers.clear();
        self.failures.clear();
    }
}

impl fmt::Debug for PluginLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginLoader")
            .field("state", &self.state)
            .field("root_directory", &self.environment.root_directory())
            .field("services", &self.registry)
            .finish_non_exhaustive()
    }
}

fn container_failure(loader: &str, resource: &Path, e: PluginSystemError) -> PluginSystemError {
    match e {
        e @ PluginSystemError::ContainerCreation { .. } => e,
        other => PluginSystemError::ContainerCreation {
            loader: loader.to_string(),
            resource: resource.to_path_buf(),
            message: other.to_string(),
        },
    }
}
