//! Dashboard analysis entry point.
//!
//! Runs filter → aggregate for one [`FilterSelection`] and returns every view
//! the dashboard draws, each computed over the record set its
//! [`ViewKind::scope`] names.

use std::time::Instant;

use chrono::Utc;
use serde::Serialize;
use shelf_core::models::{AggregateView, FilterSelection, ViewKind};
use tracing::debug;

use crate::aggregator::ViewAggregator;
use crate::pipeline::{apply_filter, Filtered, RecordSet};

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the views.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisMetadata {
    /// RFC-3339 timestamp when this analysis was generated.
    pub generated_at: String,
    /// Records in the full set.
    pub records_processed: usize,
    /// Records left after the filter; zero on no data.
    pub records_matched: usize,
    /// Label of the month selector at analysis time.
    pub month: String,
    /// Label of the genre selector at analysis time.
    pub genre: String,
    /// Wall-clock seconds spent filtering and aggregating.
    pub compute_time_seconds: f64,
}

/// The views that follow the filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilteredViews {
    /// The selection matched nothing; filtered charts are not drawn.
    NoData,
    Views {
        record_count: usize,
        genre_counts: AggregateView,
        top_books: AggregateView,
    },
}

impl FilteredViews {
    pub fn is_no_data(&self) -> bool {
        matches!(self, FilteredViews::NoData)
    }
}

/// The views computed over every loaded record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllTimeViews {
    pub reader_genre_matrix: AggregateView,
    pub monthly_counts: AggregateView,
    pub top_readers: AggregateView,
}

/// Everything one dashboard pass needs to render.
#[derive(Debug, Clone)]
pub struct DashboardAnalysis {
    pub selection: FilterSelection,
    pub filtered: FilteredViews,
    pub all_time: AllTimeViews,
    pub metadata: AnalysisMetadata,
}

impl DashboardAnalysis {
    /// Look up a view by kind.  Filtered kinds return `None` on no data.
    pub fn view(&self, kind: ViewKind) -> Option<&AggregateView> {
        match (kind, &self.filtered) {
            (ViewKind::GenreCounts, FilteredViews::Views { genre_counts, .. }) => {
                Some(genre_counts)
            }
            (ViewKind::TopBooks, FilteredViews::Views { top_books, .. }) => Some(top_books),
            (ViewKind::GenreCounts | ViewKind::TopBooks, FilteredViews::NoData) => None,
            (ViewKind::ReaderGenreMatrix, _) => Some(&self.all_time.reader_genre_matrix),
            (ViewKind::MonthlyCounts, _) => Some(&self.all_time.monthly_counts),
            (ViewKind::TopReaders, _) => Some(&self.all_time.top_readers),
        }
    }
}

// ── Public function ───────────────────────────────────────────────────────────

/// Run one full pass for `selection` over `records`.
///
/// Genre counts and top books use the filtered records; the reader/genre
/// matrix, monthly counts and top readers always use the full set.
pub fn analyze_dashboard(records: &RecordSet, selection: &FilterSelection) -> DashboardAnalysis {
    let start = Instant::now();

    let (filtered, records_matched) = match apply_filter(records, selection) {
        Filtered::Empty => (FilteredViews::NoData, 0),
        Filtered::Records(matching) => {
            let count = matching.len();
            let views = FilteredViews::Views {
                record_count: count,
                genre_counts: ViewAggregator::compute(
                    ViewKind::GenreCounts,
                    matching.iter().copied(),
                ),
                top_books: ViewAggregator::compute(ViewKind::TopBooks, matching.iter().copied()),
            };
            (views, count)
        }
    };

    let all_time = AllTimeViews {
        reader_genre_matrix: ViewAggregator::compute(ViewKind::ReaderGenreMatrix, records),
        monthly_counts: ViewAggregator::compute(ViewKind::MonthlyCounts, records),
        top_readers: ViewAggregator::compute(ViewKind::TopReaders, records),
    };

    let metadata = AnalysisMetadata {
        generated_at: Utc::now().to_rfc3339(),
        records_processed: records.len(),
        records_matched,
        month: selection.month.label().to_string(),
        genre: selection.genre.label().to_string(),
        compute_time_seconds: start.elapsed().as_secs_f64(),
    };
    debug!(
        records = metadata.records_processed,
        matched = metadata.records_matched,
        month = %metadata.month,
        genre = %metadata.genre,
        "dashboard analysis complete"
    );

    DashboardAnalysis {
        selection: selection.clone(),
        filtered,
        all_time,
        metadata,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
