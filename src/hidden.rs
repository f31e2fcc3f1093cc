//! Hidden-marker side index (`{user_dir}/__assets_plus/hidden.json`).
//!
//! A marker records the `(mtime, size)` a file had when it was hidden. The
//! file stays out of listings only while both still match, so regenerating
//! an image under the same name makes it visible again.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{Mutex, MutexGuard};

use crate::error::AppResult;
use crate::types::Root;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiddenEntry {
    pub mtime: i64,
    pub size: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HiddenIndex {
    entries: BTreeMap<String, HiddenEntry>,
}

impl HiddenIndex {
    /// Output keys are bare relpaths; input keys carry an `input/` prefix.
    pub fn key(root: Root, relpath: &str) -> String {
        match root {
            Root::Output => relpath.to_string(),
            Root::Input => format!("input/{}", relpath),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn insert(&mut self, root: Root, relpath: &str, entry: HiddenEntry) {
        self.entries.insert(Self::key(root, relpath), entry);
    }

    pub fn get(&self, root: Root, relpath: &str) -> Option<HiddenEntry> {
        self.entries.get(&Self::key(root, relpath)).copied()
    }

    pub fn hides(&self, root: Root, relpath: &str, mtime: i64, size: u64) -> bool {
        self.get(root, relpath).is_some_and(|e| e.mtime == mtime && e.size == size)
    }

    /// Parses the on-disk JSON. Entries whose payload is not an object are
    /// skipped; unreadable numbers become 0.
    pub fn from_json(text: &str) -> Self {
        let raw: BTreeMap<String, Value> = match serde_json::from_str(text) {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!("hidden.json is invalid ({}); starting with an empty index", e);
                return Self::default();
            }
        };
        let entries = raw
            .into_iter()
            .filter_map(|(relpath, payload)| {
                let obj = payload.as_object()?;
                let mtime = obj.get("mtime").and_then(Value::as_i64).unwrap_or(0);
                let size = obj.get("size").and_then(Value::as_u64).unwrap_or(0);
                Some((relpath, HiddenEntry { mtime, size }))
            })
            .collect();
        Self { entries }
    }

    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string_pretty(&self.entries).map_err(anyhow::Error::from)?)
    }
}

/// Serializes read-modify-write cycles on `hidden.json`.
#[derive(Debug)]
pub struct HiddenStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl HiddenStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path, lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current index without holding the lock afterwards.
    pub async fn snapshot(&self) -> HiddenIndex {
        let _guard = self.lock.lock().await;
        self.read().await
    }

    /// Locks the store and loads the index. Pair with [`HiddenStore::save`]
    /// while the guard is alive.
    pub async fn lock(&self) -> (MutexGuard<'_, ()>, HiddenIndex) {
        let guard = self.lock.lock().await;
        let index = self.read().await;
        (guard, index)
    }

    pub async fn save(&self, _guard: &MutexGuard<'_, ()>, index: &HiddenIndex) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, index.to_json()?).await?;
        Ok(())
    }

    async fn read(&self) -> HiddenIndex {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => HiddenIndex::from_json(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HiddenIndex::default(),
            Err(e) => {
                tracing::warn!("Cannot read {}: {}", self.path.display(), e);
                HiddenIndex::default()
            }
        }
    }
}
