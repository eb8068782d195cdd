//! # Launchpad Configuration
//!
//! [`LaunchConfig`] holds the host-side settings for one discovery run: where
//! the game directory is, which extra artifacts to scan, which services
//! manifest narrows the loader table, and the properties exposed to loaders
//! through the [`Environment`].
//!
//! Files are read as JSON, YAML (`yaml-config` feature) or TOML
//! (`toml-config` feature), picked by extension.
pub mod error;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use error::ConfigError;

use crate::kernel::constants;
use crate::plugin_system::environment::{Environment, GAME_DIRECTORY_PROPERTY};
use crate::plugin_system::manifest::attributes;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }
}

fn default_game_directory() -> PathBuf {
    PathBuf::from(".")
}

fn default_launch_attribute() -> String {
    attributes::MIXIN_CONFIGS.to_string()
}

/// Host settings for a discovery run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LaunchConfig {
    /// Directory scanned for plugin resources
    #[serde(default = "default_game_directory")]
    pub game_directory: PathBuf,
    /// Artifacts outside the game directory to scan as well
    pub extra_resources: Vec<PathBuf>,
    /// Plain-text list of language loaders to enable, in order
    pub services_manifest: Option<PathBuf>,
    /// Manifest attribute selecting launch resources
    #[serde(default = "default_launch_attribute")]
    pub launch_attribute: String,
    /// Extra properties visible to language loaders
    pub properties: BTreeMap<String, String>,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            game_directory: default_game_directory(),
            extra_resources: Vec::new(),
            services_manifest: None,
            launch_attribute: default_launch_attribute(),
            properties: BTreeMap::new(),
        }
    }
}

impl LaunchConfig {
    /// Load a configuration file, picking the format from its extension.
    /// Relative paths inside the file are resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let format = ConfigFormat::from_path(path)
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))?;
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::io(e, "read_config", path.to_path_buf()))?;

        let config = Self::deserialize(&content, format)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(config.resolved_against(base_dir))
    }

    /// Deserialize from string based on format
    pub fn deserialize(data: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        match format {
            ConfigFormat::Json => serde_json::from_str(data).map_err(|e| ConfigError::Deserialization {
                format: "json".to_string(),
                source: Box::new(e),
            }),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::from_str(data).map_err(|e| ConfigError::Deserialization {
                format: "yaml".to_string(),
                source: Box::new(e),
            }),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(data).map_err(|e| ConfigError::Deserialization {
                format: "toml".to_string(),
                source: Box::new(e),
            }),
        }
    }

    /// Serialize to string based on format
    pub fn serialize(&self, format: ConfigFormat) -> Result<String, ConfigError> {
        match format {
            ConfigFormat::Json => serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialization {
                format: "json".to_string(),
                source: Box::new(e),
            }),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::to_string(self).map_err(|e| ConfigError::Serialization {
                format: "yaml".to_string(),
                source: Box::new(e),
            }),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::to_string_pretty(self).map_err(|e| ConfigError::Serialization {
                format: "toml".to_string(),
                source: Box::new(e),
            }),
        }
    }

    /// Make relative paths absolute with respect to `base_dir`.
    pub fn resolved_against(mut self, base_dir: &Path) -> Self {
        let resolve = |p: &Path| if p.is_relative() { base_dir.join(p) } else { p.to_path_buf() };
        self.game_directory = resolve(self.game_directory.as_path());
        self.extra_resources = self.extra_resources.iter().map(|p| resolve(p.as_path())).collect();
        self.services_manifest = self.services_manifest.as_deref().map(resolve);
        self
    }

    /// Build the environment handed to language loaders.
    pub fn environment(&self) -> Environment {
        Environment::new(&self.game_directory)
            .with_log_target(constants::LOG_TARGET)
            .with_properties(self.properties.clone())
            .with_property(GAME_DIRECTORY_PROPERTY, self.game_directory.display().to_string())
    }
}
