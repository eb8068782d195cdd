//! Reads the embedded [`Manifest`] of a resource.
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use log::{debug, warn};

use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::manifest::{Manifest, MANIFEST_PATH};
use crate::plugin_system::resource::{PluginResource, ResourceKind, ResourceMetadata};

/// Manifests larger than this are treated as malformed.
pub const MAX_MANIFEST_BYTES: u64 = 1024 * 1024;

/// Extracts manifests from directory and archive resources.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataExtractor;

impl MetadataExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Read the manifest of `resource`.
    ///
    /// A missing manifest is `Ok(Absent)`. Unreadable or unparsable content is
    /// a [`PluginSystemError::MalformedResource`].
    pub fn extract(&self, resource: &PluginResource) -> Result<ResourceMetadata, PluginSystemError> {
        let path = resource.root_path();
        let bytes = match resource.kind() {
            ResourceKind::Directory => read_directory_manifest(path)?,
            ResourceKind::Archive => read_archive_manifest(path)?,
        };

        let Some(bytes) = bytes else {
            debug!("No manifest in {}", path.display());
            return Ok(ResourceMetadata::Absent);
        };

        Manifest::from_bytes(&bytes)
            .map(ResourceMetadata::Present)
            .map_err(|e| malformed(path, format!("invalid {}: {}", MANIFEST_PATH, e)))
    }

    /// Like [`extract`](Self::extract) but downgrades malformed manifests to a
    /// warning and `Absent`, keeping the resource in play.
    pub fn extract_or_absent(&self, resource: &PluginResource) -> ResourceMetadata {
        match self.extract(resource) {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("{}; continuing without metadata", e);
                ResourceMetadata::Absent
            }
        }
    }

    /// Returns `resource` enriched with its metadata.
    pub fn enrich(&self, resource: PluginResource) -> PluginResource {
        let metadata = self.extract_or_absent(&resource);
        resource.with_metadata(metadata)
    }
}

fn malformed(path: &Path, message: String) -> PluginSystemError {
    PluginSystemError::MalformedResource {
        path: path.to_path_buf(),
        message,
    }
}

fn read_directory_manifest(dir: &Path) -> Result<Option<Vec<u8>>, PluginSystemError> {
    let manifest_path = dir.join(MANIFEST_PATH);
    let file = match File::open(&manifest_path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(malformed(dir, format!("cannot open {}: {}", MANIFEST_PATH, e))),
    };
    read_limited(file, dir).map(Some)
}

fn read_archive_manifest(archive_path: &Path) -> Result<Option<Vec<u8>>, PluginSystemError> {
    let file = File::open(archive_path)
        .map_err(|e| malformed(archive_path, format!("cannot open archive: {}", e)))?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| malformed(archive_path, format!("not a readable archive: {}", e)))?;

    let entry = match archive.by_name(MANIFEST_PATH) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(malformed(archive_path, format!("cannot read {}: {}", MANIFEST_PATH, e))),
    };
    read_limited(entry, archive_path).map(Some)
}

fn read_limited<R: Read>(reader: R, resource: &Path) -> Result<Vec<u8>, PluginSystemError> {
    let mut bytes = Vec::new();
    reader
        .take(MAX_MANIFEST_BYTES + 1)
        .read_to_end(&mut bytes)
        .map_err(|e| malformed(resource, format!("cannot read {}: {}", MANIFEST_PATH, e)))?;
    if bytes.len() as u64 > MAX_MANIFEST_BYTES {
        return Err(malformed(
            resource,
            format!("{} exceeds {} bytes", MANIFEST_PATH, MAX_MANIFEST_BYTES),
        ));
    }
    Ok(bytes)
}
