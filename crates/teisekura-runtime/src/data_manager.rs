//! TTL-cached data manager.
//!
//! Memoises [`RecordSource::load`] per cutoff date through an injected
//! [`TtlCache`]. Callers use [`DataManager::get_data`] to obtain a
//! fresh-or-cached [`RecordTable`]; fetch failures are handed back to the
//! caller and remembered for display.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use teisekura_core::models::RecordTable;
use teisekura_core::settings::DEFAULT_CACHE_TTL_HOURS;
use teisekura_data::{FetchError, RecordSource};

use crate::cache::TtlCache;

// ── Defaults ──────────────────────────────────────────────────────────────────

/// Default lifetime of a cached load.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(DEFAULT_CACHE_TTL_HOURS * 3600);

// ── DataManager ───────────────────────────────────────────────────────────────

/// TTL-cached wrapper around a [`RecordSource`].
///
/// # Example
/// ```no_run
/// use chrono::NaiveDate;
/// use teisekura_core::models::CutoffRule;
/// use teisekura_data::RegistrySource;
/// use teisekura_runtime::data_manager::DataManager;
///
/// let source = RegistrySource::new("https://example.test/csv", CutoffRule::Raw).unwrap();
/// let mut mgr = DataManager::new(source);
/// let cutoff = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// if let Ok(table) = mgr.get_data(cutoff, false) {
///     println!("statutes: {}", table.len());
/// }
/// ```
pub struct DataManager<S> {
    source: S,
    cache: TtlCache<NaiveDate, Arc<RecordTable>>,
    /// Human-readable description of the last error encountered.
    last_error: Option<String>,
}

impl<S: RecordSource> DataManager<S> {
    /// Manager with a fresh cache using [`DEFAULT_CACHE_TTL`].
    pub fn new(source: S) -> Self {
        Self::with_cache(source, TtlCache::new(DEFAULT_CACHE_TTL))
    }

    /// Manager over an explicitly provided cache.
    pub fn with_cache(source: S, cache: TtlCache<NaiveDate, Arc<RecordTable>>) -> Self {
        Self {
            source,
            cache,
            last_error: None,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Return the table for `cutoff`, using the cache when it is still valid.
    ///
    /// When `force_refresh` is `true` the cache is bypassed. On failure the
    /// error is returned and the cached entry, if any, is left untouched.
    pub fn get_data(
        &mut self,
        cutoff: NaiveDate,
        force_refresh: bool,
    ) -> Result<Arc<RecordTable>, FetchError> {
        if !force_refresh {
            if let Some(table) = self.cache.get(&cutoff) {
                tracing::debug!(%cutoff, "returning cached record table");
                return Ok(Arc::clone(table));
            }
        }

        match self.source.load(cutoff) {
            Ok(table) => {
                tracing::debug!(%cutoff, records = table.len(), "record cache updated");
                let table = Arc::new(table);
                self.cache.insert(cutoff, Arc::clone(&table));
                self.last_error = None;
                Ok(table)
            }
            Err(e) => {
                tracing::warn!(%cutoff, error = %e, "registry load failed");
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Discard every cached table, forcing the next [`get_data`] call to load.
    ///
    /// [`get_data`]: DataManager::get_data
    pub fn invalidate_cache(&mut self) {
        self.cache.clear();
        tracing::debug!("cache invalidated");
    }

    /// Age of the cached table for `cutoff`, or `None` if nothing valid is held.
    pub fn cache_age(&self, cutoff: NaiveDate) -> Option<Duration> {
        self.cache.age(&cutoff)
    }

    /// Human-readable description of the last load error, or `None`.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Description of where the data comes from.
    pub fn source_description(&self) -> String {
        self.source.describe()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
