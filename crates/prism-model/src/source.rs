//! Virtual file access.
//!
//! Models, materials and companions are addressed by virtual `/`-separated
//! paths (`/vehicle/truck/cab`). An [`AssetSource`] maps those paths onto
//! bytes.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Read-only access to game assets by virtual path.
pub trait AssetSource: Sync {
    /// Whether a file exists at the virtual path.
    fn exists(&self, path: &str) -> bool;

    /// Read a whole file.
    fn read(&self, path: &str) -> io::Result<Vec<u8>>;
}

/// Assets stored under a directory on disk.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a virtual path onto the filesystem.
    pub fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

impl AssetSource for DirectorySource {
    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_file()
    }

    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        fs::read(self.resolve(path))
    }
}

/// Assets held in memory, keyed by virtual path.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file.
    pub fn insert(&mut self, path: &str, data: impl Into<Vec<u8>>) {
        self.files.insert(normalize(path), data.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_file(mut self, path: &str, data: impl Into<Vec<u8>>) -> Self {
        self.insert(path, data);
        self
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl AssetSource for MemorySource {
    fn exists(&self, path: &str) -> bool {
        self.files.contains_key(&normalize(path))
    }

    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        self.files.get(&normalize(path)).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no such asset: {path}"))
        })
    }
}

fn normalize(path: &str) -> String {
    format!("/{}", path.trim_start_matches('/'))
}

/// Directory part of a virtual path, without the trailing separator.
///
/// Returns an empty string for a bare file name.
pub fn directory_of(path: &str) -> &str {
    path.rfind('/').map_or("", |slash| &path[..slash])
}

/// File name part of a virtual path.
pub fn file_name_of(path: &str) -> &str {
    path.rfind('/').map_or(path, |slash| &path[slash + 1..])
}

/// Resolve `path` against `directory`. Paths starting with `/` are absolute.
pub fn resolve_relative(directory: &str, path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("{directory}/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_helpers() {
        assert_eq!(directory_of("/vehicle/truck/cab"), "/vehicle/truck");
        assert_eq!(file_name_of("/vehicle/truck/cab"), "cab");
        assert_eq!(directory_of("cab"), "");
        assert_eq!(file_name_of("cab"), "cab");
        assert_eq!(directory_of("/cab"), "");
    }

    #[test]
    fn test_resolve_relative() {
        assert_eq!(
            resolve_relative("/vehicle/truck", "paint.mat"),
            "/vehicle/truck/paint.mat"
        );
        assert_eq!(
            resolve_relative("/vehicle/truck", "/material/glass.mat"),
            "/material/glass.mat"
        );
    }

    #[test]
    fn test_memory_source() {
        let source = MemorySource::new().with_file("/a/b.pmd", vec![1, 2, 3]);

        assert!(source.exists("/a/b.pmd"));
        assert!(source.exists("a/b.pmd"));
        assert!(!source.exists("/a/c.pmd"));
        assert_eq!(source.read("/a/b.pmd").unwrap(), vec![1, 2, 3]);
        assert_eq!(
            source.read("/missing").unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
    }

    #[test]
    fn test_directory_source() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("model")).unwrap();
        fs::write(dir.path().join("model/box.pmg"), b"data").unwrap();

        let source = DirectorySource::new(dir.path());
        assert!(source.exists("/model/box.pmg"));
        assert!(!source.exists("/model/box.pmd"));
        assert_eq!(source.read("/model/box.pmg").unwrap(), b"data");
    }
}
