//! Language loader for artifacts that describe themselves entirely through
//! `META-INF/MANIFEST.MF` attributes.
//!
//! A resource is claimed when its manifest says `Plugin-Loader: manifest`.
//! The container is built from `Plugin-Id`, `Plugin-Version` and the optional
//! `Plugin-Name`, `Plugin-Entry` and `Plugin-Api` attributes.
use std::any::Any;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use launchpad_core::kernel::constants::API_VERSION;
use launchpad_core::plugin_system::{
    environment::Environment,
    error::PluginSystemError,
    manifest::{attributes, Manifest},
    resource::{PluginResource, ResourceKind},
    traits::{LanguageLoader, PluginCandidate, PluginContainer},
    version::{ApiVersion, VersionRange},
};
use log::{debug, info};
use semver::Version;

/// Registry name of this loader, matched against `Plugin-Loader`.
pub const LOADER_NAME: &str = "manifest";

/// A plugin described by manifest attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestPluginContainer {
    id: String,
    name: Option<String>,
    version: Version,
    version_text: String,
    entry: Option<String>,
    api: Option<String>,
    source: PathBuf,
    kind: ResourceKind,
}

impl ManifestPluginContainer {
    /// Parsed `Plugin-Version`
    pub fn semver(&self) -> &Version {
        &self.version
    }

    /// `Plugin-Entry`, the entry point named by the artifact
    pub fn entry(&self) -> Option<&str> {
        self.entry.as_deref()
    }

    /// `Plugin-Api` requirement, if the artifact declares one
    pub fn api_requirement(&self) -> Option<&str> {
        self.api.as_deref()
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }
}

impl PluginContainer for ManifestPluginContainer {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    fn version(&self) -> &str {
        &self.version_text
    }

    fn source(&self) -> &Path {
        &self.source
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// The `manifest` language loader.
#[derive(Debug, Default)]
pub struct ManifestLoader {
    api_version: Option<ApiVersion>,
}

impl ManifestLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory for a [`LoaderCatalog`](launchpad_core::plugin_system::registry::LoaderCatalog) entry.
    pub fn boxed() -> Box<dyn LanguageLoader> {
        Box::new(Self::new())
    }

    fn build(&self, candidate: &PluginCandidate) -> Result<ManifestPluginContainer, String> {
        let resource = candidate.resource();
        let manifest = resource
            .manifest()
            .ok_or_else(|| "resource has no manifest".to_string())?;

        let id = required(manifest, attributes::PLUGIN_ID)?;
        if !is_valid_id(id) {
            return Err(format!(
                "'{}' is not a valid {} (use lowercase letters, digits, '-' and '_')",
                id,
                attributes::PLUGIN_ID
            ));
        }

        let version_text = required(manifest, attributes::PLUGIN_VERSION)?;
        let version = Version::parse(version_text)
            .map_err(|e| format!("invalid {} '{}': {}", attributes::PLUGIN_VERSION, version_text, e))?;

        let api = manifest.attribute(attributes::PLUGIN_API);
        if let Some(requirement) = api {
            let range = VersionRange::from_str(requirement).map_err(|e| e.to_string())?;
            let core = self
                .api_version
                .as_ref()
                .ok_or_else(|| format!("loader '{}' was not initialized", LOADER_NAME))?;
            if !range.includes_api(core) {
                return Err(format!("requires loader API {} but the core provides {}", range, core));
            }
        }

        Ok(ManifestPluginContainer {
            id: id.to_string(),
            name: manifest.attribute(attributes::PLUGIN_NAME).map(str::to_string),
            version,
            version_text: version_text.to_string(),
            entry: manifest.attribute(attributes::PLUGIN_ENTRY).map(str::to_string),
            api: api.map(str::to_string),
            source: resource.root_path().to_path_buf(),
            kind: resource.kind(),
        })
    }
}

impl LanguageLoader for ManifestLoader {
    fn name(&self) -> &str {
        LOADER_NAME
    }

    fn initialize(&mut self, environment: &Environment) -> Result<(), PluginSystemError> {
        let root = environment.root_directory();
        if !root.is_dir() {
            return Err(init_error(format!("plugin root {} is not a directory", root.display())));
        }
        let api_version = ApiVersion::from_str(API_VERSION)?;
        info!(target: environment.log_target(), "Manifest loader ready (loader API {})", api_version);
        self.api_version = Some(api_version);
        Ok(())
    }

    fn claim_resources(&self, environment: &Environment, resources: &[PluginResource]) -> Vec<PluginCandidate> {
        resources
            .iter()
            .filter(|resource| resource.declares_loader(LOADER_NAME))
            .inspect(|resource| {
                debug!(target: environment.log_target(), "Manifest loader claims {}", resource.root_path().display())
            })
            .map(|resource| PluginCandidate::new(resource.clone(), LOADER_NAME))
            .collect()
    }

    fn create_container(
        &self,
        _environment: &Environment,
        candidate: &PluginCandidate,
    ) -> Result<Box<dyn PluginContainer>, PluginSystemError> {
        self.build(candidate)
            .map(|container| Box::new(container) as Box<dyn PluginContainer>)
            .map_err(|message| PluginSystemError::ContainerCreation {
                loader: LOADER_NAME.to_string(),
                resource: candidate.resource().root_path().to_path_buf(),
                message,
            })
    }
}

fn init_error(message: String) -> PluginSystemError {
    PluginSystemError::LoaderInitialization {
        loader: LOADER_NAME.to_string(),
        message,
    }
}

fn required<'a>(manifest: &'a Manifest, name: &str) -> Result<&'a str, String> {
    manifest
        .attribute(name)
        .ok_or_else(|| format!("missing required attribute {}", name))
}

fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}
