//! Flat-File JSON Storage
//! Mission: Whole-collection snapshots with a serialized read-modify-write cycle

use crate::error::ApiError;
use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing::warn;

/// One JSON-backed collection of records.
///
/// The whole collection is loaded and rewritten on every mutation; there is
/// no append log and no indexing. A per-store mutex serializes the
/// read-modify-write cycle so concurrent requests cannot compute stale ids
/// or overwrite each other's updates. Stores for different entity types are
/// independently guarded; no operation mutates two stores in one cycle.
pub struct JsonStore<T> {
    path: PathBuf,
    write_guard: Mutex<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Serialize + DeserializeOwned> JsonStore<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_guard: Mutex::new(()),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full collection.
    ///
    /// Fail-soft: a missing file, an unreadable file, or corrupt JSON all
    /// degrade to an empty collection instead of an error. The backing file
    /// is auto-initialized on the first successful `save_all`.
    pub fn load_all(&self) -> Vec<T> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(_) => return Vec::new(),
        };

        match serde_json::from_slice(&bytes) {
            Ok(items) => items,
            Err(e) => {
                warn!(path = %self.path.display(), "Corrupt collection file, treating as empty: {e}");
                Vec::new()
            }
        }
    }

    /// Replace the full collection on disk.
    ///
    /// Writes to a sibling temp file and renames over the target, so readers
    /// never observe a partially written snapshot.
    pub fn save_all(&self, items: &[T]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }

        let json = serde_json::to_vec_pretty(items).context("Failed to serialize collection")?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        Ok(())
    }

    /// Run one serialized read-modify-write cycle.
    ///
    /// Takes the store's mutex, loads the collection, applies `f`, and
    /// persists only when `f` succeeds. A failed validation inside `f`
    /// aborts the operation before any write happens.
    pub fn update<R>(
        &self,
        f: impl FnOnce(&mut Vec<T>) -> Result<R, ApiError>,
    ) -> Result<R, ApiError> {
        let _guard = self.write_guard.lock();

        let mut items = self.load_all();
        let out = f(&mut items)?;

        self.save_all(&items).map_err(|e| {
            warn!(path = %self.path.display(), "Failed to persist collection: {e:#}");
            ApiError::Internal("Failed to persist changes".to_string())
        })?;

        Ok(out)
    }
}

/// Generate the next id for a prefix-counter namespace.
///
/// Scans the existing ids carrying `prefix`, parses each numeric suffix
/// (ids that do not parse are ignored), and returns `prefix` + (max + 1).
/// With no matching id the counter starts at 1. Ids increase strictly past
/// the surviving maximum; gaps left by deletions below it are never
/// refilled.
pub fn next_id<'a>(prefix: &str, ids: impl IntoIterator<Item = &'a str>) -> String {
    let max_seen = ids
        .into_iter()
        .filter_map(|id| id.strip_prefix(prefix))
        .filter_map(|suffix| suffix.parse::<u64>().ok())
        .max()
        .unwrap_or(0);

    format!("{}{}", prefix, max_seen + 1)
}
