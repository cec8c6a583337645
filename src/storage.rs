// src/storage.rs
//! Durable client-side key/value storage.
//!
//! Mirrors the browser `localStorage` contract: string keys and values, and
//! operations that never fail from the caller's point of view. Persistence
//! problems are logged and the in-memory view stays authoritative for the
//! rest of the run.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, error, info};

pub const TOKEN_KEY: &str = "token";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
pub const SELECTED_ROLE_KEY: &str = "selectedRole";

/// Storage backend for session data
pub trait LocalStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;

    fn set_item(&self, key: &str, value: &str);

    fn remove_item(&self, key: &str);
}

/// Volatile storage, used by tests and embedders that persist elsewhere
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        lock(&self.items).get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        lock(&self.items).insert(key.to_string(), value.to_string());
    }

    fn remove_item(&self, key: &str) {
        lock(&self.items).remove(key);
    }
}

/// JSON file-backed storage, rewritten on every mutation
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    items: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open (or lazily create) the storage file at `path`
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let items = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read storage file: {}", path.display()))?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content)
                    .with_context(|| format!("Failed to parse storage file: {}", path.display()))?
            }
        } else {
            BTreeMap::new()
        };

        info!(
            "Opened local storage at {} ({} entries)",
            path.display(),
            items.len()
        );

        Ok(Self {
            path,
            items: Mutex::new(items),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, items: &BTreeMap<String, String>) {
        if let Err(e) = write_atomically(&self.path, items) {
            error!("Failed to persist local storage: {:#}", e);
        }
    }
}

impl LocalStorage for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        lock(&self.items).get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        let mut items = lock(&self.items);
        items.insert(key.to_string(), value.to_string());
        self.persist(&items);
        debug!("Stored key: {}", key);
    }

    fn remove_item(&self, key: &str) {
        let mut items = lock(&self.items);
        if items.remove(key).is_some() {
            self.persist(&items);
            debug!("Removed key: {}", key);
        }
    }
}

fn write_atomically(path: &Path, items: &BTreeMap<String, String>) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let content = serde_json::to_string_pretty(items).context("Failed to serialize storage")?;
    let tmp_path = path.with_extension("json.tmp");

    write_private(&tmp_path, content.as_bytes())
        .with_context(|| format!("Failed to write file: {}", tmp_path.display()))?;
    std::fs::rename(&tmp_path, path)
        .with_context(|| format!("Failed to replace file: {}", path.display()))?;

    Ok(())
}

/// Write `content` readable by the owner only; the file holds session tokens
#[cfg(unix)]
fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // A leftover temp file keeps its old mode
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    file.write_all(content)?;
    file.sync_all()
}

#[cfg(not(unix))]
fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, content)
}

// A poisoned lock only means another thread panicked mid-update of a plain map
fn lock(items: &Mutex<BTreeMap<String, String>>) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
    items.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
