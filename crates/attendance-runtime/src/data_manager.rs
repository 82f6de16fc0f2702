//! Memoized dataset loading.
//!
//! [`LoadCache`] holds at most one loaded [`Dataset`], keyed by the pair of
//! source paths it was read from.  Asking for the same key again returns the
//! cached dataset without touching the files; a different key, an explicit
//! [`LoadCache::invalidate`] or a forced refresh reads the sources again.
//! Failed loads are never cached.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use attendance_core::error::Result;
use attendance_data::dataset::Dataset;
use attendance_data::reader::load_dataset;
use serde::{Deserialize, Serialize};

/// Identity of a load: the attendance and master file paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceKey {
    pub attendance: PathBuf,
    pub master: PathBuf,
}

impl SourceKey {
    pub fn new(attendance: impl Into<PathBuf>, master: impl Into<PathBuf>) -> Self {
        Self {
            attendance: attendance.into(),
            master: master.into(),
        }
    }
}

type Loader = fn(&Path, &Path) -> Result<Dataset>;

// ── LoadCache ─────────────────────────────────────────────────────────────────

/// Single-entry cache around [`load_dataset`].
///
/// # Example
/// ```no_run
/// use attendance_runtime::data_manager::{LoadCache, SourceKey};
///
/// let mut cache = LoadCache::new();
/// let key = SourceKey::new("attendance.xlsx", "master.xlsx");
/// match cache.get_or_load(&key) {
///     Ok(dataset) => println!("{} records", dataset.records().len()),
///     Err(e) => eprintln!("{e}"),
/// }
/// ```
pub struct LoadCache {
    loader: Loader,
    /// Key and dataset of the last successful load.
    entry: Option<(SourceKey, Arc<Dataset>)>,
    /// When `entry` was populated.
    loaded_at: Option<Instant>,
    /// Message of the most recent failed load, cleared on success.
    last_error: Option<String>,
    /// Number of times the sources were actually read.
    loads: usize,
}

impl Default for LoadCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadCache {
    pub fn new() -> Self {
        Self::with_loader(load_dataset)
    }

    /// Cache that reads through `loader` instead of [`load_dataset`].
    pub fn with_loader(loader: Loader) -> Self {
        Self {
            loader,
            entry: None,
            loaded_at: None,
            last_error: None,
            loads: 0,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Return the dataset for `key`, reading the sources only when the cache
    /// holds nothing or holds a different key.
    pub fn get_or_load(&mut self, key: &SourceKey) -> Result<Arc<Dataset>> {
        if let Some((cached_key, dataset)) = &self.entry {
            if cached_key == key {
                tracing::debug!(
                    attendance = %key.attendance.display(),
                    "load cache hit"
                );
                return Ok(Arc::clone(dataset));
            }
            tracing::debug!("source changed; discarding cached dataset");
        }
        self.load(key)
    }

    /// Read the sources for `key` regardless of what is cached.
    ///
    /// On failure the previous entry is kept, so a later
    /// [`get_or_load`](Self::get_or_load) for the old key still hits.
    pub fn force_refresh(&mut self, key: &SourceKey) -> Result<Arc<Dataset>> {
        self.load(key)
    }

    /// Drop the cached dataset.
    pub fn invalidate(&mut self) {
        self.entry = None;
        self.loaded_at = None;
        tracing::debug!("load cache invalidated");
    }

    /// Key of the cached dataset, if any.
    pub fn cached_key(&self) -> Option<&SourceKey> {
        self.entry.as_ref().map(|(key, _)| key)
    }

    /// Age of the cached dataset, or `None` if nothing is cached.
    pub fn cache_age(&self) -> Option<Duration> {
        self.loaded_at.map(|ts| ts.elapsed())
    }

    /// Message of the last failed load, or `None`.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// How many times the sources have been read.
    pub fn load_count(&self) -> usize {
        self.loads
    }

    // ── Private helpers ───────────────────────────────────────────────────

    fn load(&mut self, key: &SourceKey) -> Result<Arc<Dataset>> {
        let started = Instant::now();
        self.loads += 1;

        match (self.loader)(&key.attendance, &key.master) {
            Ok(dataset) => {
                let dataset = Arc::new(dataset);
                tracing::debug!(
                    records = dataset.records().len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "load cache miss; dataset loaded"
                );
                self.entry = Some((key.clone(), Arc::clone(&dataset)));
                self.loaded_at = Some(Instant::now());
                self.last_error = None;
                Ok(dataset)
            }
            Err(e) => {
                tracing::warn!(error = %e, "loading attendance data failed");
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
