//! Language loader for script plugins laid out by directory convention.
//!
//! A script plugin is a directory holding a `plugin.toml` descriptor next to
//! its scripts:
//!
//! ```toml
//! id = "hello"
//! version = "1.0.0"
//! name = "Hello"      # optional
//! main = "init.lua"   # optional, defaults to main.lua
//! ```
//!
//! Resources whose manifest says `Plugin-Loader: script` are claimed too; for
//! those the manifest's `Plugin-Id`, `Plugin-Version`, `Plugin-Name` and
//! `Plugin-Entry` stand in for the descriptor when no `plugin.toml` exists.
use std::any::Any;
use std::fs;
use std::path::{Component, Path, PathBuf};

use launchpad_core::plugin_system::{
    environment::Environment,
    error::PluginSystemError,
    manifest::attributes,
    resource::{PluginResource, ResourceKind},
    traits::{LanguageLoader, PluginCandidate, PluginContainer},
};
use log::{debug, info};
use serde::Deserialize;

/// Registry name of this loader.
pub const LOADER_NAME: &str = "script";

/// Descriptor file looked up in plugin directories.
pub const DESCRIPTOR_FILE: &str = "plugin.toml";

/// Script run when the descriptor names none.
pub const DEFAULT_MAIN: &str = "main.lua";

/// Contents of `plugin.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScriptDescriptor {
    pub id: String,
    pub version: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub main: Option<String>,
}

impl ScriptDescriptor {
    pub fn parse(text: &str) -> Result<Self, String> {
        toml::from_str(text).map_err(|e| format!("invalid {}: {}", DESCRIPTOR_FILE, e))
    }

    /// `main`, or [`DEFAULT_MAIN`].
    pub fn main_script(&self) -> &str {
        self.main.as_deref().unwrap_or(DEFAULT_MAIN)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptPluginContainer {
    descriptor: ScriptDescriptor,
    /// Entry script, relative to `source`
    main: PathBuf,
    source: PathBuf,
}

impl ScriptPluginContainer {
    pub fn descriptor(&self) -> &ScriptDescriptor {
        &self.descriptor
    }

    /// Entry script relative to the plugin root
    pub fn main(&self) -> &Path {
        &self.main
    }

    /// Entry script joined onto the plugin root
    pub fn main_path(&self) -> PathBuf {
        self.source.join(&self.main)
    }
}

impl PluginContainer for ScriptPluginContainer {
    fn id(&self) -> &str {
        &self.descriptor.id
    }

    fn name(&self) -> &str {
        self.descriptor.name.as_deref().unwrap_or(&self.descriptor.id)
    }

    fn version(&self) -> &str {
        &self.descriptor.version
    }

    fn source(&self) -> &Path {
        &self.source
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// The `script` language loader.
#[derive(Debug, Default)]
pub struct ScriptLoader;

impl ScriptLoader {
    pub fn new() -> Self {
        Self
    }

    /// Factory for a [`LoaderCatalog`](launchpad_core::plugin_system::registry::LoaderCatalog) entry.
    pub fn boxed() -> Box<dyn LanguageLoader> {
        Box::new(Self::new())
    }

    fn accepts(resource: &PluginResource) -> bool {
        resource.declares_loader(LOADER_NAME) || has_descriptor(resource)
    }

    fn build(&self, resource: &PluginResource) -> Result<ScriptPluginContainer, String> {
        let descriptor = if has_descriptor(resource) {
            let path = resource.root_path().join(DESCRIPTOR_FILE);
            let text = fs::read_to_string(&path).map_err(|e| format!("cannot read {}: {}", DESCRIPTOR_FILE, e))?;
            ScriptDescriptor::parse(&text)?
        } else {
            descriptor_from_manifest(resource)?
        };

        if descriptor.id.trim().is_empty() {
            return Err("descriptor has an empty id".to_string());
        }

        let main = PathBuf::from(descriptor.main_script());
        if !stays_inside(&main) {
            return Err(format!("main script '{}' escapes the plugin directory", main.display()));
        }
        // Archive contents are not inspected here.
        if resource.kind() == ResourceKind::Directory && !resource.root_path().join(&main).is_file() {
            return Err(format!("main script '{}' does not exist", main.display()));
        }

        Ok(ScriptPluginContainer {
            descriptor,
            main,
            source: resource.root_path().to_path_buf(),
        })
    }
}

impl LanguageLoader for ScriptLoader {
    fn name(&self) -> &str {
        LOADER_NAME
    }

    fn initialize(&mut self, environment: &Environment) -> Result<(), PluginSystemError> {
        info!(target: environment.log_target(), "Script loader ready; looking for {}", DESCRIPTOR_FILE);
        Ok(())
    }

    fn claim_resources(&self, environment: &Environment, resources: &[PluginResource]) -> Vec<PluginCandidate> {
        resources
            .iter()
            .filter(|resource| Self::accepts(resource))
            .inspect(|resource| {
                debug!(target: environment.log_target(), "Script loader claims {}", resource.root_path().display())
            })
            .map(|resource| PluginCandidate::new(resource.clone(), LOADER_NAME))
            .collect()
    }

    fn create_container(
        &self,
        _environment: &Environment,
        candidate: &PluginCandidate,
    ) -> Result<Box<dyn PluginContainer>, PluginSystemError> {
        let resource = candidate.resource();
        self.build(resource)
            .map(|container| Box::new(container) as Box<dyn PluginContainer>)
            .map_err(|message| PluginSystemError::ContainerCreation {
                loader: LOADER_NAME.to_string(),
                resource: resource.root_path().to_path_buf(),
                message,
            })
    }
}

fn has_descriptor(resource: &PluginResource) -> bool {
    resource.kind() == ResourceKind::Directory && resource.root_path().join(DESCRIPTOR_FILE).is_file()
}

fn descriptor_from_manifest(resource: &PluginResource) -> Result<ScriptDescriptor, String> {
    let manifest = resource
        .manifest()
        .ok_or_else(|| format!("no {} and no manifest", DESCRIPTOR_FILE))?;
    let required = |name: &str| {
        manifest
            .attribute(name)
            .map(str::to_string)
            .ok_or_else(|| format!("missing required attribute {}", name))
    };
    Ok(ScriptDescriptor {
        id: required(attributes::PLUGIN_ID)?,
        version: required(attributes::PLUGIN_VERSION)?,
        name: manifest.attribute(attributes::PLUGIN_NAME).map(str::to_string),
        main: manifest.attribute(attributes::PLUGIN_ENTRY).map(str::to_string),
    })
}

/// Relative, with no `..`, root or prefix components.
fn stays_inside(path: &Path) -> bool {
    path.components().all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        && path.components().any(|c| matches!(c, Component::Normal(_)))
}
