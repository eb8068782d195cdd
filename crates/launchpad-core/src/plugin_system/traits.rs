use std::any::Any;
use std::fmt;
use std::path::Path;

use crate::plugin_system::environment::Environment;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::resource::PluginResource;

/// A resource claimed by exactly one language loader, waiting for its container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginCandidate {
    resource: PluginResource,
    loader: String,
}

impl PluginCandidate {
    pub fn new(resource: PluginResource, loader: impl Into<String>) -> Self {
        Self {
            resource,
            loader: loader.into(),
        }
    }

    pub fn resource(&self) -> &PluginResource {
        &self.resource
    }

    /// Name of the loader that claimed the resource.
    pub fn loader(&self) -> &str {
        &self.loader
    }
}

/// The loaded representation of one plugin. Its shape belongs to the loader
/// that built it; the core only reads these accessors.
pub trait PluginContainer: fmt::Debug + Send + Sync {
    /// Plugin identifier
    fn id(&self) -> &str;

    /// Human-readable name, defaults to the id
    fn name(&self) -> &str {
        self.id()
    }

    fn version(&self) -> &str;

    /// Artifact the container was built from
    fn source(&self) -> &Path;

    /// Access to the concrete type for loader-specific consumers
    fn as_any(&self) -> &dyn Any;
}

/// A language loader understands one plugin-authoring convention.
///
/// Loaders are created by the factories of a
/// [`LoaderCatalog`](crate::plugin_system::registry::LoaderCatalog) and owned
/// by the [`LoaderRegistry`](crate::plugin_system::registry::LoaderRegistry).
/// They must not load or run plugin code; they only read descriptors.
pub trait LanguageLoader: Send + Sync {
    /// Unique loader name, used as the registry key
    fn name(&self) -> &str;

    /// Called exactly once, before any resource is offered.
    fn initialize(&mut self, _environment: &Environment) -> Result<(), PluginSystemError> {
        Ok(())
    }

    /// Pick the resources this loader accepts out of `resources`.
    ///
    /// Only resources not yet claimed by an earlier loader are offered.
    fn claim_resources(&self, environment: &Environment, resources: &[PluginResource]) -> Vec<PluginCandidate>;

    /// Build the container for one claimed candidate. The orchestrator calls
    /// this once per candidate and contains panics to that candidate.
    fn create_container(
        &self,
        environment: &Environment,
        candidate: &PluginCandidate,
    ) -> Result<Box<dyn PluginContainer>, PluginSystemError>;
}

impl fmt::Debug for dyn LanguageLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LanguageLoader")
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

/// A container together with the loader that produced it.
#[derive(Debug)]
pub struct LoadedPlugin {
    pub loader: String,
    pub container: Box<dyn PluginContainer>,
}
