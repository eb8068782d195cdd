//! # Resource Scanner
//!
//! Walks the immediate children of a plugin root and turns every directory and
//! zip-format archive into a [`PluginResource`]. Entries are visited in path
//! order so repeated scans of the same tree produce the same sequence.
//!
//! A single bad artifact (corrupt archive, permission problem) is skipped with
//! a warning. Only an unusable root fails the scan.
use std::collections::{BTreeMap, HashSet};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::extractor::MetadataExtractor;
use crate::plugin_system::resource::{PluginResource, ResourceKind};
use crate::utils::fs::{has_extension, identity_key, is_hidden, sorted_entries};

/// Extensions treated as zip-format archives.
pub const ARCHIVE_EXTENSIONS: &[&str] = &["jar", "zip"];

/// Discovered resources grouped by affinity key, each group sorted by path.
pub type ResourceMap = BTreeMap<String, Vec<PluginResource>>;

/// Finds plugin resources on disk.
#[derive(Debug, Clone, Default)]
pub struct ResourceScanner {
    extractor: MetadataExtractor,
}

impl ResourceScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan `root` and return its resources grouped by
    /// [`affinity_key`](PluginResource::affinity_key).
    pub fn discover_resources(&self, root: &Path) -> Result<ResourceMap, PluginSystemError> {
        let resources = self.scan_root(root)?;
        Ok(group_by_affinity(resources))
    }

    /// Scan the immediate children of `root`, returning enriched resources in path order.
    pub fn scan_root(&self, root: &Path) -> Result<Vec<PluginResource>, PluginSystemError> {
        if !root.is_dir() {
            return Err(PluginSystemError::NotFound {
                path: root.to_path_buf(),
            });
        }

        let entries = sorted_entries(root)
            .map_err(|e| PluginSystemError::io(e, "read_dir", root.to_path_buf()))?;

        Ok(entries
            .into_iter()
            .filter(|path| {
                let hidden = is_hidden(path);
                if hidden {
                    debug!("Skipping hidden entry {}", path.display());
                }
                !hidden
            })
            .filter_map(|path| self.inspect(&path))
            .collect())
    }

    /// Scan an explicitly supplied set of artifacts. Missing or unreadable
    /// entries are skipped with a warning. Paths naming the same file are
    /// scanned once. Output is sorted by path.
    pub fn scan_paths(&self, paths: &[PathBuf]) -> Vec<PluginResource> {
        let mut paths: Vec<&PathBuf> = paths.iter().collect();
        paths.sort();
        let mut seen = HashSet::new();
        paths
            .into_iter()
            .filter(|path| seen.insert(identity_key(path)))
            .filter_map(|path| {
                if !path.exists() {
                    warn!("Configured resource {} does not exist; skipping", path.display());
                    return None;
                }
                self.inspect(path)
            })
            .collect()
    }

    /// All resources of a map, sorted by path.
    pub fn flatten(map: &ResourceMap) -> Vec<PluginResource> {
        let mut all: Vec<PluginResource> = map.values().flatten().cloned().collect();
        all.sort_by(|a, b| a.root_path().cmp(b.root_path()));
        all
    }

    /// Classify one entry and read its manifest.
    fn inspect(&self, path: &Path) -> Option<PluginResource> {
        let metadata = match fs::metadata(path) {
            Ok(meta) => meta,
            Err(e) => {
                warn!("Failed to read metadata for {}: {}; skipping", path.display(), e);
                return None;
            }
        };

        let kind = if metadata.is_dir() {
            ResourceKind::Directory
        } else if metadata.is_file() && has_extension(path, ARCHIVE_EXTENSIONS) {
            if let Err(message) = probe_archive(path) {
                warn!("Skipping unreadable archive {}: {}", path.display(), message);
                return None;
            }
            ResourceKind::Archive
        } else {
            debug!("Ignoring non-plugin entry {}", path.display());
            return None;
        };

        let resource = PluginResource::new(path, kind);
        Some(self.extractor.enrich(resource))
    }
}

/// Group resources by affinity key. Input order is kept within each group.
pub fn group_by_affinity(resources: Vec<PluginResource>) -> ResourceMap {
    let mut map = ResourceMap::new();
    for resource in resources {
        map.entry(resource.affinity_key())
            .or_default()
            .push(resource);
    }
    map
}

fn probe_archive(path: &Path) -> Result<(), String> {
    let file = File::open(path).map_err(|e| e.to_string())?;
    zip::ZipArchive::new(file).map(|_| ()).map_err(|e| e.to_string())
}
