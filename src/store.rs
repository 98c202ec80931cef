//! In-memory state store with a JSON snapshot on disk.

use std::collections::{BTreeMap, HashMap};
use std::io::ErrorKind;
use std::path::Path;
use std::sync::{Arc, RwLock};

use anyhow::{Context, Result, anyhow};
use gps_upload::StateStore;
use tracing::debug;

/// `StateStore` backed by a shared map.
///
/// Clones share the same entries. Values are expected to be UTF-8 (the
/// upload workflow only writes JSON) so the snapshot stays readable.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a snapshot written by [`MemoryStore::save`]. A missing file
    /// yields an empty store.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a snapshot.
    pub async fn load(path: &Path) -> Result<Self> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no snapshot; starting empty");
                return Ok(Self::new());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("reading {}", path.display()));
            }
        };

        let snapshot: BTreeMap<String, String> = serde_json::from_slice(&bytes)
            .with_context(|| format!("parsing snapshot {}", path.display()))?;
        let entries = snapshot.into_iter().map(|(key, value)| (key, value.into_bytes())).collect();

        Ok(Self { entries: Arc::new(RwLock::new(entries)) })
    }

    /// Writes every entry to `path` as a JSON object, keys sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if a value is not UTF-8 or the file cannot be
    /// written.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let json = {
            let entries = self.entries.read().map_err(|err| anyhow!("reading store: {err}"))?;
            let snapshot = entries
                .iter()
                .map(|(key, value)| {
                    let value = std::str::from_utf8(value)
                        .with_context(|| format!("value of {key} is not UTF-8"))?;
                    Ok((key.as_str(), value))
                })
                .collect::<Result<BTreeMap<_, _>>>()?;
            serde_json::to_vec_pretty(&snapshot).context("serializing snapshot")?
        };

        tokio::fs::write(path, json).await.with_context(|| format!("writing {}", path.display()))
    }

    /// Number of stored keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lock is poisoned.
    pub fn len(&self) -> Result<usize> {
        let entries = self.entries.read().map_err(|err| anyhow!("reading store: {err}"))?;
        Ok(entries.len())
    }

    /// Whether the store holds no keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lock is poisoned.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl StateStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.read().map_err(|err| anyhow!("reading store: {err}"))?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<Option<Vec<u8>>> {
        let mut entries = self.entries.write().map_err(|err| anyhow!("writing store: {err}"))?;
        Ok(entries.insert(key.to_string(), value.to_vec()))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|err| anyhow!("writing store: {err}"))?;
        entries.remove(key);
        Ok(())
    }
}
