//! In-memory index over a zip bundle.

use anyhow::{Context, Result};
use axum::body::Bytes;
use std::collections::HashMap;
use std::io::{Read, Seek};
use std::path::Path;

/// Index resource read for directory-like paths (empty or ending in `/`).
pub const INDEX_RESOURCE: &str = "index.html";

/// A bundle loaded fully into memory, keyed by logical path.
///
/// Keys use forward slashes and carry no leading `/`.
#[derive(Debug, Clone, Default)]
pub struct ArchiveIndex {
    entries: HashMap<String, Bytes>,
}

impl ArchiveIndex {
    pub fn open(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open bundle: {}", path.display()))?;
        Self::from_reader(file)
            .with_context(|| format!("Failed to read bundle: {}", path.display()))
    }

    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = zip::ZipArchive::new(reader)?;
        let mut entries = HashMap::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = normalize_entry_name(file.name());
            let mut data = Vec::with_capacity(usize::try_from(file.size()).unwrap_or(0));
            file.read_to_end(&mut data)
                .with_context(|| format!("Failed to decompress bundle entry: {}", name))?;
            entries.insert(name, Bytes::from(data));
        }
        Ok(Self { entries })
    }

    /// Resolves a logical path to its entry name, mapping directory-like paths to
    /// their index resource.
    pub fn entry_name(logical_path: &str) -> String {
        let path = logical_path.trim_start_matches('/');
        if path.is_empty() || path.ends_with('/') {
            format!("{}{}", path, INDEX_RESOURCE)
        } else {
            path.to_string()
        }
    }

    pub fn read(&self, logical_path: &str) -> Option<&Bytes> {
        self.entries.get(&Self::entry_name(logical_path))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize_entry_name(raw: &str) -> String {
    raw.replace('\\', "/").trim_start_matches('/').to_string()
}

#[cfg(test)]
#[path = "tests/archive_tests.rs"]
mod tests;
