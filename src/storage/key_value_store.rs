//! File-backed key-value store
//!
//! Each key is one JSON file under
//! `{storage_dir}/key_value_stores/{name}/{KEY}.json`. Writes go through a
//! temp file in the same directory followed by an atomic rename, so a
//! reboot mid-write never leaves a torn value behind.

use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// A named key-value store rooted in the storage directory
#[derive(Debug, Clone)]
pub struct KeyValueStore {
    dir: PathBuf,
}

impl KeyValueStore {
    /// Open (creating if necessary) the store with the given name
    pub async fn open(storage_dir: &Path, name: &str) -> Result<Self> {
        let dir = storage_dir.join("key_value_stores").join(name);
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create key-value store at {}", dir.display()))?;
        Ok(Self { dir })
    }

    /// Directory backing this store
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty()
            || !key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return Err(anyhow!(
                "Invalid key '{key}': keys may only contain ASCII alphanumerics, '-', '_' and '.'"
            ));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }

    /// Read and deserialize the value stored under `key`
    ///
    /// Returns `Ok(None)` when the key has never been written.
    pub async fn get_value<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = self.key_path(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let value = serde_json::from_slice(&bytes)
                    .with_context(|| format!("Corrupt value for key '{key}'"))?;
                Ok(Some(value))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read key '{key}'")),
        }
    }

    /// Serialize and durably store `value` under `key`
    pub async fn set_value<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let path = self.key_path(key)?;
        let json = serde_json::to_string_pretty(value)
            .with_context(|| format!("Failed to serialize value for key '{key}'"))?;

        // Atomic write pattern: temp file in the target directory, then rename
        let mut temp_file = NamedTempFile::new_in(&self.dir)
            .with_context(|| format!("Failed to create temp file in {}", self.dir.display()))?;
        temp_file.write_all(json.as_bytes())?;
        temp_file
            .persist(&path)
            .with_context(|| format!("Failed to persist key '{key}'"))?;

        log::debug!("Persisted key '{key}' ({} bytes)", json.len());
        Ok(())
    }

    /// Check whether a value exists for `key` without reading it
    pub async fn has_value(&self, key: &str) -> Result<bool> {
        let path = self.key_path(key)?;
        Ok(tokio::fs::try_exists(&path).await.unwrap_or(false))
    }
}
