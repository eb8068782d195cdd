//! # Plugin Resources
//!
//! A [`PluginResource`] is one artifact found under the plugin root: a
//! directory or an archive, plus whatever manifest could be read from it.
use std::fmt;
use std::path::{Path, PathBuf};

use crate::plugin_system::manifest::Manifest;

/// Affinity key for resources whose manifest does not name a loader.
pub const UNASSIGNED_AFFINITY: &str = "unassigned";

/// What kind of filesystem entry a resource is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Directory,
    /// A zip-format archive (`.jar` / `.zip`)
    Archive,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Directory => write!(f, "directory"),
            ResourceKind::Archive => write!(f, "archive"),
        }
    }
}

/// Manifest state of a resource. Either fully parsed or absent, never partial.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ResourceMetadata {
    Present(Manifest),
    #[default]
    Absent,
}

impl ResourceMetadata {
    pub fn is_present(&self) -> bool {
        matches!(self, ResourceMetadata::Present(_))
    }

    pub fn manifest(&self) -> Option<&Manifest> {
        match self {
            ResourceMetadata::Present(manifest) => Some(manifest),
            ResourceMetadata::Absent => None,
        }
    }
}

/// One discovered artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginResource {
    root_path: PathBuf,
    kind: ResourceKind,
    metadata: ResourceMetadata,
}

impl PluginResource {
    /// Create a resource without metadata. The scanner only calls this for
    /// entries it has just enumerated.
    pub fn new(root_path: impl Into<PathBuf>, kind: ResourceKind) -> Self {
        Self {
            root_path: root_path.into(),
            kind,
            metadata: ResourceMetadata::Absent,
        }
    }

    /// Attach extracted metadata. Consumes the resource so metadata can only
    /// be set while the value is still being built.
    pub fn with_metadata(mut self, metadata: ResourceMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn metadata(&self) -> &ResourceMetadata {
        &self.metadata
    }

    pub fn manifest(&self) -> Option<&Manifest> {
        self.metadata.manifest()
    }

    /// Last path component, lossily converted.
    pub fn file_name(&self) -> String {
        self.root_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.root_path.display().to_string())
    }

    /// The loader the manifest asks for in ASCII lowercase, or [`UNASSIGNED_AFFINITY`].
    pub fn affinity_key(&self) -> String {
        self.manifest()
            .and_then(Manifest::plugin_loader)
            .map(str::to_ascii_lowercase)
            .unwrap_or_else(|| UNASSIGNED_AFFINITY.to_string())
    }

    /// Whether the manifest names `loader` (ASCII case-insensitive).
    pub fn declares_loader(&self, loader: &str) -> bool {
        self.manifest()
            .and_then(Manifest::plugin_loader)
            .is_some_and(|declared| declared.eq_ignore_ascii_case(loader))
    }
}
