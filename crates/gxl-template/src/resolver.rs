/*
 * resolver.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Loading imported template files.
//!
//! The renderer never touches the filesystem directly: imported templates
//! are read through a [`SourceLoader`], so tests and embedders can serve
//! templates from memory.

use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Reads template bytes for an import.
pub trait SourceLoader {
    /// Read the file at `path` (already absolute and normalized).
    ///
    /// A missing file must be reported as [`io::ErrorKind::NotFound`].
    fn load(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// Loader that reads from the filesystem.
#[derive(Debug, Clone, Default)]
pub struct FileSystemLoader;

impl SourceLoader for FileSystemLoader {
    fn load(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}

/// Loader that serves templates from an in-memory map.
///
/// Keys are normalized with [`normalize_path`] on insertion, so lookups
/// match however the import path was spelled.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    files: HashMap<PathBuf, Vec<u8>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self {
            files: HashMap::new(),
        }
    }

    pub fn add(&mut self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) -> &mut Self {
        self.files
            .insert(normalize_path(path.as_ref()), content.into());
        self
    }

    pub fn with_files(
        files: impl IntoIterator<Item = (impl AsRef<Path>, impl Into<Vec<u8>>)>,
    ) -> Self {
        let mut loader = Self::new();
        for (path, content) in files {
            loader.add(path, content);
        }
        loader
    }
}

impl SourceLoader for MemoryLoader {
    fn load(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.files.get(&normalize_path(path)).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is not loaded", path.display()),
            )
        })
    }
}

/// Make `path` absolute (against the working directory) and lexically clean
/// it: `.` segments are dropped and `..` pops the previous segment. Symlinks
/// are not resolved and the file need not exist.
pub fn normalize_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("/"))
            .join(path)
    };

    let mut cleaned = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                cleaned.pop();
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}

/// Resolve an import `src` against the importing file's directory.
pub fn resolve_import_path(src: &str, base_dir: &Path) -> PathBuf {
    let src = Path::new(src.trim());
    if src.is_absolute() {
        normalize_path(src)
    } else {
        normalize_path(&base_dir.join(src))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_path_is_lexical() {
        assert_eq!(
            normalize_path(Path::new("/a/b/../c/./d.gxl")),
            PathBuf::from("/a/c/d.gxl")
        );
        assert_eq!(normalize_path(Path::new("/../x")), PathBuf::from("/x"));
    }

    #[test]
    fn test_relative_paths_become_absolute() {
        assert!(normalize_path(Path::new("x.gxl")).is_absolute());
    }

    #[test]
    fn test_resolve_import_path() {
        let base = Path::new("/templates/reports");
        assert_eq!(
            resolve_import_path("../shared/legend.gxl", base),
            PathBuf::from("/templates/shared/legend.gxl")
        );
        assert_eq!(
            resolve_import_path("/abs/x.gxl", base),
            PathBuf::from("/abs/x.gxl")
        );
    }

    #[test]
    fn test_memory_loader_normalizes_keys() {
        let loader = MemoryLoader::with_files([("/t/a/../b.gxl", "<GXL/>")]);
        assert_eq!(loader.load(Path::new("/t/b.gxl")).unwrap(), b"<GXL/>".to_vec());
        let err = loader.load(Path::new("/t/missing.gxl")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
