use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::time_utils;

/// Label shown for the synthetic "no filter" option in both selectors.
pub const ALL_LABEL: &str = "All";

/// One row as delivered by a record source: column name → raw cell text.
pub type RawRow = BTreeMap<String, String>;

/// A single reading-completion event after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingRecord {
    /// Book title.
    pub title: String,
    /// Literary genre label.
    pub genre: String,
    /// Who finished the book.
    pub reader: String,
    /// Day the reading was completed.
    pub completion_date: NaiveDate,
}

impl ReadingRecord {
    /// Calendar-month bucket of the completion date, formatted `MM/YYYY`.
    ///
    /// Always derived from `completion_date`; never stored.
    pub fn month_key(&self) -> String {
        time_utils::month_key(self.completion_date)
    }
}

// ── Filter selection ──────────────────────────────────────────────────────────

/// One selector's value: either the `All` sentinel or a concrete value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Choice {
    #[default]
    All,
    Only(String),
}

impl Choice {
    /// Build a choice from a user-facing label.  `"All"` (any case) and the
    /// empty string map to [`Choice::All`].
    pub fn from_label(label: &str) -> Self {
        let trimmed = label.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL_LABEL) {
            Choice::All
        } else {
            Choice::Only(trimmed.to_string())
        }
    }

    /// `true` when `value` passes this choice.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Choice::All => true,
            Choice::Only(wanted) => wanted == value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Choice::All)
    }

    /// Text shown in the selector.
    pub fn label(&self) -> &str {
        match self {
            Choice::All => ALL_LABEL,
            Choice::Only(v) => v,
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The (month, genre) pair chosen by the user; both default to `All`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSelection {
    /// Month key (`MM/YYYY`) or `All`.
    pub month: Choice,
    /// Genre label or `All`.
    pub genre: Choice,
}

impl FilterSelection {
    pub fn new(month: Choice, genre: Choice) -> Self {
        Self { month, genre }
    }

    /// Build a selection from two labels, treating `"All"` as the sentinel.
    pub fn from_labels(month: &str, genre: &str) -> Self {
        Self::new(Choice::from_label(month), Choice::from_label(genre))
    }

    /// `true` when neither selector narrows the record set.
    pub fn is_unfiltered(&self) -> bool {
        self.month.is_all() && self.genre.is_all()
    }
}

// ── Aggregate views ───────────────────────────────────────────────────────────

/// Which record set a view is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewScope {
    /// The records left after applying the current [`FilterSelection`].
    Filtered,
    /// Every loaded record, regardless of the filter.
    Full,
}

/// How a view is drawn.  The renderer performs layout only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Pie,
    StackedBar,
    Line,
    List,
}

/// A grouping key with its record count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountRow {
    pub label: String,
    pub count: u64,
}

impl CountRow {
    pub fn new(label: impl Into<String>, count: u64) -> Self {
        Self {
            label: label.into(),
            count,
        }
    }
}

/// Number of books one reader finished in one genre.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReaderGenreCount {
    pub reader: String,
    pub genre: String,
    pub count: u64,
}

/// Number of books finished in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyCount {
    /// First day of the month, used for chronological ordering.
    pub month: NaiveDate,
    /// The `MM/YYYY` key the count was grouped under.
    pub key: String,
    pub count: u64,
}

/// Names the five projections independently of their data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    GenreCounts,
    TopBooks,
    ReaderGenreMatrix,
    MonthlyCounts,
    TopReaders,
}

impl ViewKind {
    /// Every view, in dashboard order.
    pub const ALL: [ViewKind; 5] = [
        ViewKind::GenreCounts,
        ViewKind::TopBooks,
        ViewKind::ReaderGenreMatrix,
        ViewKind::MonthlyCounts,
        ViewKind::TopReaders,
    ];

    /// Display title of the view.
    pub fn title(self) -> &'static str {
        match self {
            ViewKind::GenreCounts => "Readings by Genre",
            ViewKind::TopBooks => "Top 5 Most Read Books",
            ViewKind::ReaderGenreMatrix => "Books Read per Genre by Reader",
            ViewKind::MonthlyCounts => "Books Read per Month",
            ViewKind::TopReaders => "Top 5 Readers",
        }
    }

    /// The record set this view is computed over.
    ///
    /// Genre counts and top books follow the filter; the other three are
    /// all-time summaries and ignore it.
    pub fn scope(self) -> ViewScope {
        match self {
            ViewKind::GenreCounts | ViewKind::TopBooks => ViewScope::Filtered,
            ViewKind::ReaderGenreMatrix | ViewKind::MonthlyCounts | ViewKind::TopReaders => {
                ViewScope::Full
            }
        }
    }

    /// The chart the dashboard uses for this view.
    pub fn default_chart(self) -> ChartKind {
        match self {
            ViewKind::GenreCounts => ChartKind::Pie,
            ViewKind::TopBooks => ChartKind::Bar,
            ViewKind::ReaderGenreMatrix => ChartKind::StackedBar,
            ViewKind::MonthlyCounts => ChartKind::Line,
            ViewKind::TopReaders => ChartKind::List,
        }
    }
}

/// One of the five projections the dashboard renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregateView {
    /// Filtered: records per genre.
    GenreCounts(Vec<CountRow>),
    /// Filtered: five most-read titles.
    TopBooks(Vec<CountRow>),
    /// Full: records per (reader, genre).
    ReaderGenreMatrix(Vec<ReaderGenreCount>),
    /// Full: records per month, chronological.
    MonthlyCounts(Vec<MonthlyCount>),
    /// Full: five readers with the most completions.
    TopReaders(Vec<CountRow>),
}

impl AggregateView {
    pub fn kind(&self) -> ViewKind {
        match self {
            AggregateView::GenreCounts(_) => ViewKind::GenreCounts,
            AggregateView::TopBooks(_) => ViewKind::TopBooks,
            AggregateView::ReaderGenreMatrix(_) => ViewKind::ReaderGenreMatrix,
            AggregateView::MonthlyCounts(_) => ViewKind::MonthlyCounts,
            AggregateView::TopReaders(_) => ViewKind::TopReaders,
        }
    }

    pub fn title(&self) -> &'static str {
        self.kind().title()
    }

    pub fn scope(&self) -> ViewScope {
        self.kind().scope()
    }

    pub fn default_chart(&self) -> ChartKind {
        self.kind().default_chart()
    }

    /// Number of rows (groups) in the view.
    pub fn len(&self) -> usize {
        match self {
            AggregateView::GenreCounts(rows)
            | AggregateView::TopBooks(rows)
            | AggregateView::TopReaders(rows) => rows.len(),
            AggregateView::ReaderGenreMatrix(cells) => cells.len(),
            AggregateView::MonthlyCounts(points) => points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of all counts in the view.
    pub fn total(&self) -> u64 {
        match self {
            AggregateView::GenreCounts(rows)
            | AggregateView::TopBooks(rows)
            | AggregateView::TopReaders(rows) => rows.iter().map(|r| r.count).sum(),
            AggregateView::ReaderGenreMatrix(cells) => cells.iter().map(|c| c.count).sum(),
            AggregateView::MonthlyCounts(points) => points.iter().map(|p| p.count).sum(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
