//! Append-only dataset of scraped records
//!
//! Each pushed item becomes one JSON file named by a zero-padded sequence
//! number under `{storage_dir}/datasets/{name}/`. Opening an existing
//! dataset resumes numbering from the highest index on disk, so a rebooted
//! run keeps appending where the previous one stopped.

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::NamedTempFile;

/// A named append-only dataset rooted in the storage directory
#[derive(Debug)]
pub struct Dataset {
    dir: PathBuf,
    next_index: AtomicUsize,
}

impl Dataset {
    /// Open (creating if necessary) the dataset with the given name
    pub async fn open(storage_dir: &Path, name: &str) -> Result<Self> {
        let dir = storage_dir.join("datasets").join(name);
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create dataset at {}", dir.display()))?;

        let highest = highest_existing_index(&dir).await?;
        Ok(Self {
            dir,
            next_index: AtomicUsize::new(highest),
        })
    }

    /// Directory backing this dataset
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Append one record, returning its 1-based sequence number
    pub async fn push_data<T: Serialize + ?Sized>(&self, item: &T) -> Result<usize> {
        let index = self.next_index.fetch_add(1, Ordering::SeqCst) + 1;
        let path = self.dir.join(format!("{index:09}.json"));

        let json = serde_json::to_string_pretty(item)
            .with_context(|| format!("Failed to serialize dataset item {index}"))?;

        // Same atomic temp-file + rename pattern as the key-value store
        let mut temp_file = NamedTempFile::new_in(&self.dir)
            .with_context(|| format!("Failed to create temp file in {}", self.dir.display()))?;
        temp_file.write_all(json.as_bytes())?;
        temp_file
            .persist(&path)
            .with_context(|| format!("Failed to persist dataset item {index}"))?;

        log::debug!("Pushed dataset item {index:09}");
        Ok(index)
    }

    /// Number of records stored so far (including any from previous runs)
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.next_index.load(Ordering::SeqCst)
    }
}

/// Scan a dataset directory for the highest existing item index
async fn highest_existing_index(dir: &Path) -> Result<usize> {
    let mut highest = 0;
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("Failed to scan dataset at {}", dir.display()))?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        let Some(stem) = name.strip_suffix(".json") else {
            continue;
        };
        if let Ok(index) = stem.parse::<usize>() {
            highest = highest.max(index);
        }
    }
    Ok(highest)
}
