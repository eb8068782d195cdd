use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::warn;

/// List the immediate children of `dir`, sorted by path.
///
/// `read_dir` order differs between platforms and filesystems; sorting keeps
/// every caller deterministic. Only failing to open `dir` is an error; an
/// entry that cannot be read is logged and left out.
pub fn sorted_entries<P: AsRef<Path>>(dir: P) -> io::Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.path()),
            Err(e) => {
                warn!("Failed to read an entry of {}: {}; skipping", dir.display(), e);
                None
            }
        })
        .collect();
    entries.sort();
    Ok(entries)
}

/// Key identifying the filesystem object behind `path`: the canonical path,
/// or `path` itself when it cannot be canonicalized.
pub fn identity_key(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Dot-files and dot-directories
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}

/// Case-insensitive extension check against a list of candidates (without the dot)
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => extensions.iter().any(|candidate| candidate.eq_ignore_ascii_case(ext)),
        None => false,
    }
}
