// src/fs/mock.rs

use super::FileSystem;
use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime};

#[derive(Debug, Clone)]
pub struct MockEntry {
    pub content: Vec<u8>,
    /// `None` simulates a file whose metadata cannot be read.
    pub modified: Option<SystemTime>,
}

#[derive(Debug, Default)]
struct MockState {
    files: HashMap<PathBuf, MockEntry>,
    /// Seconds since the epoch handed out by the next `touch`.
    clock: u64,
}

/// In-memory filesystem with a logical clock.
///
/// Every write or touch without an explicit time gets a modification time
/// strictly later than all previous ones, so tests can order artifacts
/// without sleeping. Clones share the same files.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn tick(state: &mut MockState) -> SystemTime {
        state.clock += 1;
        SystemTime::UNIX_EPOCH + Duration::from_secs(state.clock)
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let mut state = self.lock();
        let modified = Self::tick(&mut state);
        state.files.insert(
            path.as_ref().to_path_buf(),
            MockEntry {
                content: content.into(),
                modified: Some(modified),
            },
        );
    }

    /// Create the file if needed and bump its modification time.
    pub fn touch(&self, path: impl AsRef<Path>) {
        let mut state = self.lock();
        let modified = Self::tick(&mut state);
        state
            .files
            .entry(path.as_ref().to_path_buf())
            .and_modify(|e| e.modified = Some(modified))
            .or_insert(MockEntry {
                content: Vec::new(),
                modified: Some(modified),
            });
    }

    /// Create or update a file with an explicit modification time, given in
    /// seconds since the epoch.
    pub fn touch_at(&self, path: impl AsRef<Path>, secs: u64) {
        let modified = SystemTime::UNIX_EPOCH + Duration::from_secs(secs);
        let mut state = self.lock();
        state.clock = state.clock.max(secs);
        state
            .files
            .entry(path.as_ref().to_path_buf())
            .and_modify(|e| e.modified = Some(modified))
            .or_insert(MockEntry {
                content: Vec::new(),
                modified: Some(modified),
            });
    }

    /// Add a file that exists but whose metadata cannot be read.
    pub fn add_unreadable(&self, path: impl AsRef<Path>) {
        self.lock().files.insert(
            path.as_ref().to_path_buf(),
            MockEntry {
                content: Vec::new(),
                modified: None,
            },
        );
    }

    pub fn remove(&self, path: impl AsRef<Path>) -> bool {
        self.lock().files.remove(path.as_ref()).is_some()
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let state = self.lock();
        match state.files.get(path) {
            Some(entry) => String::from_utf8(entry.content.clone())
                .map_err(|e| anyhow!("Invalid UTF-8: {}", e)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        self.lock().files.contains_key(path)
    }

    fn modified(&self, path: &Path) -> Result<SystemTime> {
        match self.lock().files.get(path) {
            Some(MockEntry {
                modified: Some(t), ..
            }) => Ok(*t),
            Some(_) => Err(anyhow!("Permission denied: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }
}
