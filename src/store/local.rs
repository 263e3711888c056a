//! File-per-key store under the platform cache directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::{CacheStore, StoreError};

/// File extension for stored entries.
const ENTRY_EXTENSION: &str = "json";

/// Persistent store keeping one JSON file per key.
///
/// When no usable root directory exists the store runs detached: reads
/// return `None` and writes are dropped, so callers on a medium-less host
/// (CI, containers without a home directory) behave as if the cache were
/// always empty.
pub struct LocalStore {
    root: Option<PathBuf>,
}

impl LocalStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create store directory: {}", dir.display()))?;
        Ok(Self {
            root: Some(dir.to_path_buf()),
        })
    }

    /// Open a store under the platform cache directory, degrading to a
    /// detached no-op store when no medium is available.
    pub fn open_default(app_name: &str) -> Self {
        let dir = dirs::cache_dir().map(|base| base.join(app_name));
        match dir {
            Some(dir) => match Self::open(&dir) {
                Ok(store) => store,
                Err(e) => {
                    warn!(error = %e, "Cache store unavailable, running detached");
                    Self { root: None }
                }
            },
            None => {
                warn!("No cache directory on this platform, running detached");
                Self { root: None }
            }
        }
    }

    fn entry_path(&self, key: &str) -> Option<PathBuf> {
        let root = self.root.as_ref()?;
        Some(root.join(format!("{}.{}", sanitize_key(key), ENTRY_EXTENSION)))
    }
}

/// Map a cache key to a safe file stem.
///
/// Keys are program-generated (prefix + category + scope suffix), so this
/// only has to defend against separators leaking in through scope ids.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

impl CacheStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.entry_path(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Some(contents),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                debug!(key, error = %e, "Failed to read store entry");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let Some(path) = self.entry_path(key) else {
            return Ok(()); // detached store drops writes
        };

        // Write via temp file so readers never observe a partial entry
        let temp_path = path.with_extension("tmp");
        let write = fs::write(&temp_path, value).and_then(|_| fs::rename(&temp_path, &path));

        match write {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::StorageFull => Err(StoreError::Full),
            Err(e) => Err(StoreError::Io(e.to_string())),
        }
    }

    fn remove(&self, key: &str) {
        let Some(path) = self.entry_path(key) else {
            return;
        };
        if let Err(e) = fs::remove_file(&path) {
            if e.kind() != io::ErrorKind::NotFound {
                debug!(key, error = %e, "Failed to remove store entry");
            }
        }
    }

    fn keys(&self) -> Vec<String> {
        let Some(root) = self.root.as_ref() else {
            return Vec::new();
        };
        let Ok(dir) = fs::read_dir(root) else {
            return Vec::new();
        };

        dir.filter_map(|entry| {
            let path = entry.ok()?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(ENTRY_EXTENSION) {
                return None;
            }
            path.file_stem()
                .and_then(|stem| stem.to_str())
                .map(|stem| stem.to_string())
        })
        .collect()
    }
}
