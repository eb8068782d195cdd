//! # Launchpad Plugin System
//!
//! Finds plugin artifacts under a game directory and hands them to the
//! language loaders that understand them. Nothing here runs plugin code: the
//! result of a run is one [`PluginContainer`] per accepted artifact.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`resource`]**: [`PluginResource`], a directory or archive plus its
//!   optional manifest.
//! - **[`manifest`]**: Parser for `META-INF/MANIFEST.MF` style attribute files.
//! - **[`extractor`]**: [`MetadataExtractor`] reads the manifest out of a resource.
//! - **[`scanner`]**: [`ResourceScanner`] enumerates resources and groups them
//!   by affinity key.
//! - **[`traits`]**: The [`LanguageLoader`] and [`PluginContainer`] contracts.
//! - **[`registry`]**: The [`LoaderCatalog`] registration table and the
//!   [`LoaderRegistry`] that owns live loaders.
//! - **[`loader`]**: [`PluginLoader`], the phase-checked orchestrator.
//! - **[`service`]**: [`DiscovererService`], the host runtime adapter.
//! - **[`environment`]**: Read-only [`Environment`] shared with loaders.
//! - **[`version`]**: API version helpers used by loaders for compatibility checks.
//! - **[`error`]**: [`PluginSystemError`].
pub mod environment;
pub mod error;
pub mod extractor;
pub mod loader;
pub mod manifest;
pub mod registry;
pub mod resource;
pub mod scanner;
pub mod service;
pub mod traits;
pub mod version;

pub use environment::Environment;
pub use error::PluginSystemError;
pub use extractor::MetadataExtractor;
pub use loader::{LoaderState, PluginLoader};
pub use manifest::Manifest;
pub use registry::{LoaderCatalog, LoaderRegistry, LoaderStatus, ServicesManifest};
pub use resource::{PluginResource, ResourceKind, ResourceMetadata};
pub use scanner::{ResourceMap, ResourceScanner};
pub use service::{DiscovererService, LaunchResource};
pub use traits::{LanguageLoader, LoadedPlugin, PluginCandidate, PluginContainer};
pub use version::{ApiVersion, VersionRange};

#[cfg(test)]
mod tests;
