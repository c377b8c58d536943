//! One-shot data manager for the dashboard runtime.
//!
//! Fetches raw rows from a [`RecordSource`] exactly once, normalizes them
//! through the column mapping and keeps the resulting [`RecordSet`] behind an
//! `Arc` so every dashboard session can share it read-only.  A failed load is
//! fatal: there is no retry and no fallback data.

use std::sync::Arc;
use std::time::{Duration, Instant};

use shelf_core::error::{Result, ShelfError};
use shelf_data::pipeline::{normalize, RecordSet};
use shelf_data::reader::RecordSource;
use shelf_data::schema::ColumnMapping;

/// Fetch and normalize in one synchronous step.
pub fn load_records(source: &dyn RecordSource, mapping: &ColumnMapping) -> Result<RecordSet> {
    let rows = source.fetch_records()?;
    tracing::debug!(rows = rows.len(), source = %source.describe(), "fetched raw rows");
    normalize(&rows, mapping)
}

// ── DataManager ───────────────────────────────────────────────────────────────

/// Owns the record source and the record set loaded from it.
///
/// # Example
/// ```no_run
/// use shelf_data::reader::CsvFileSource;
/// use shelf_data::schema::ColumnMapping;
/// use shelf_runtime::data_manager::DataManager;
///
/// let mut mgr = DataManager::new(Box::new(CsvFileSource::new("log.csv")), ColumnMapping::default());
/// let records = mgr.load().unwrap();
/// println!("{} records", records.len());
/// ```
pub struct DataManager {
    source: Arc<dyn RecordSource>,
    mapping: ColumnMapping,
    /// Set once the first load succeeds.
    records: Option<Arc<RecordSet>>,
    /// Wall-clock time of the successful load.
    load_time: Option<Duration>,
}

impl DataManager {
    pub fn new(source: Box<dyn RecordSource>, mapping: ColumnMapping) -> Self {
        Self {
            source: Arc::from(source),
            mapping,
            records: None,
            load_time: None,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Load the record set on the current thread.
    ///
    /// The first successful call fetches; later calls return the same `Arc`.
    pub fn load(&mut self) -> Result<Arc<RecordSet>> {
        if let Some(records) = &self.records {
            return Ok(Arc::clone(records));
        }
        let start = Instant::now();
        let result = load_records(self.source.as_ref(), &self.mapping);
        self.finish(result, start.elapsed())
    }

    /// Load the record set on tokio's blocking pool.
    ///
    /// Record sources are synchronous and may block on network I/O, so the
    /// async runtime hands the fetch to a blocking thread.
    pub async fn load_async(&mut self) -> Result<Arc<RecordSet>> {
        if let Some(records) = &self.records {
            return Ok(Arc::clone(records));
        }
        let source = Arc::clone(&self.source);
        let mapping = self.mapping.clone();
        let start = Instant::now();
        let result = tokio::task::spawn_blocking(move || load_records(source.as_ref(), &mapping))
            .await
            .map_err(|e| ShelfError::Other(anyhow::Error::new(e).context("record load task failed")))?;
        self.finish(result, start.elapsed())
    }

    /// The loaded record set, or `None` before a successful load.
    pub fn records(&self) -> Option<Arc<RecordSet>> {
        self.records.clone()
    }

    /// How long the successful load took.
    pub fn load_time(&self) -> Option<Duration> {
        self.load_time
    }

    pub fn describe_source(&self) -> String {
        self.source.describe()
    }

    // ── Private helpers ───────────────────────────────────────────────────

    fn finish(&mut self, result: Result<RecordSet>, elapsed: Duration) -> Result<Arc<RecordSet>> {
        match result {
            Ok(records) => {
                tracing::info!(
                    records = records.len(),
                    source = %self.source.describe(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "record set loaded"
                );
                let records = Arc::new(records);
                self.records = Some(Arc::clone(&records));
                self.load_time = Some(elapsed);
                Ok(records)
            }
            Err(e) => {
                tracing::error!(error = %e, source = %self.source.describe(), "record load failed");
                Err(e)
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
