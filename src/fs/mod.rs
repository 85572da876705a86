// src/fs/mod.rs

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};

pub mod mock;

/// Abstract view of the filesystem that holds build artifacts.
///
/// Target names are interpreted as paths relative to the implementation's
/// root.
pub trait FileSystem: Send + Sync + Debug {
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn exists(&self, path: &Path) -> bool;
    /// Last modification time of an existing artifact.
    fn modified(&self, path: &Path) -> Result<SystemTime>;
}

/// Implementation that uses `std::fs`, resolving relative paths against a
/// root directory.
#[derive(Debug, Clone)]
pub struct RealFileSystem {
    root: PathBuf,
}

impl Default for RealFileSystem {
    fn default() -> Self {
        Self::rooted(".")
    }
}

impl RealFileSystem {
    pub fn rooted(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let path = self.resolve(path);
        fs::read_to_string(&path).with_context(|| format!("reading file {:?}", path))
    }

    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).exists()
    }

    fn modified(&self, path: &Path) -> Result<SystemTime> {
        let path = self.resolve(path);
        fs::metadata(&path)
            .and_then(|meta| meta.modified())
            .with_context(|| format!("reading modification time of {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rooted_fs_resolves_relative_names() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("out.o"), b"obj").unwrap();

        let rfs = RealFileSystem::rooted(dir.path());
        assert!(rfs.exists(Path::new("out.o")));
        assert!(!rfs.exists(Path::new("missing.o")));
        assert!(rfs.modified(Path::new("out.o")).is_ok());
        assert!(rfs.modified(Path::new("missing.o")).is_err());
        assert_eq!(rfs.read_to_string(Path::new("out.o")).unwrap(), "obj");
    }
}
