//! Group-and-count projections over reading records.
//!
//! All functions take records by reference and return fresh vectors; the
//! input is never reordered.  Groups appear in first-occurrence order and
//! top-N sorts are stable, so ties keep that order too.

use std::collections::{BTreeMap, HashMap};

use shelf_core::models::{
    AggregateView, CountRow, MonthlyCount, ReaderGenreCount, ReadingRecord, ViewKind,
};
use shelf_core::time_utils::parse_month_key;
use tracing::warn;

/// Number of rows kept by the top-N views.
pub const TOP_N: usize = 5;

// ── ViewAggregator ────────────────────────────────────────────────────────────

/// Stateless helper that builds the five aggregate views.
pub struct ViewAggregator;

impl ViewAggregator {
    /// Records per genre.
    pub fn genre_counts<'a, I>(records: I) -> Vec<CountRow>
    where
        I: IntoIterator<Item = &'a ReadingRecord>,
    {
        Self::count_by(records, |r| r.genre.clone())
    }

    /// The [`TOP_N`] most-read titles, most reads first.
    pub fn top_books<'a, I>(records: I) -> Vec<CountRow>
    where
        I: IntoIterator<Item = &'a ReadingRecord>,
    {
        Self::top_n(Self::count_by(records, |r| r.title.clone()), TOP_N)
    }

    /// The [`TOP_N`] readers with the most completions.
    pub fn top_readers<'a, I>(records: I) -> Vec<CountRow>
    where
        I: IntoIterator<Item = &'a ReadingRecord>,
    {
        Self::top_n(Self::count_by(records, |r| r.reader.clone()), TOP_N)
    }

    /// Records per (reader, genre) pair.
    pub fn reader_genre_matrix<'a, I>(records: I) -> Vec<ReaderGenreCount>
    where
        I: IntoIterator<Item = &'a ReadingRecord>,
    {
        let mut index: HashMap<(String, String), usize> = HashMap::new();
        let mut cells: Vec<ReaderGenreCount> = Vec::new();

        for record in records {
            let key = (record.reader.clone(), record.genre.clone());
            match index.get(&key) {
                Some(&i) => cells[i].count += 1,
                None => {
                    index.insert(key, cells.len());
                    cells.push(ReaderGenreCount {
                        reader: record.reader.clone(),
                        genre: record.genre.clone(),
                        count: 1,
                    });
                }
            }
        }
        cells
    }

    /// Records per calendar month, oldest first.
    ///
    /// Ordering uses the parsed month, not the `MM/YYYY` text, so
    /// `12/2023` sorts before `01/2024`.  Months without records are absent.
    pub fn monthly_counts<'a, I>(records: I) -> Vec<MonthlyCount>
    where
        I: IntoIterator<Item = &'a ReadingRecord>,
    {
        let mut months: BTreeMap<chrono::NaiveDate, MonthlyCount> = BTreeMap::new();

        for row in Self::count_by(records, |r| r.month_key()) {
            let Some(month) = parse_month_key(&row.label) else {
                warn!(key = %row.label, "skipping unparseable month key");
                continue;
            };
            months.insert(
                month,
                MonthlyCount {
                    month,
                    key: row.label,
                    count: row.count,
                },
            );
        }
        months.into_values().collect()
    }

    /// Count records per key, preserving first-occurrence order of keys.
    pub fn count_by<'a, I, F>(records: I, key_fn: F) -> Vec<CountRow>
    where
        I: IntoIterator<Item = &'a ReadingRecord>,
        F: Fn(&ReadingRecord) -> String,
    {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut rows: Vec<CountRow> = Vec::new();

        for record in records {
            let key = key_fn(record);
            match index.get(&key) {
                Some(&i) => rows[i].count += 1,
                None => {
                    index.insert(key.clone(), rows.len());
                    rows.push(CountRow::new(key, 1));
                }
            }
        }
        rows
    }

    /// Sort descending by count (stable) and keep the first `n`.
    pub fn top_n(mut rows: Vec<CountRow>, n: usize) -> Vec<CountRow> {
        rows.sort_by(|a, b| b.count.cmp(&a.count));
        rows.truncate(n);
        rows
    }

    /// Build the view named by `kind` over `records`.
    ///
    /// The caller picks the input according to [`ViewKind::scope`].
    pub fn compute<'a, I>(kind: ViewKind, records: I) -> AggregateView
    where
        I: IntoIterator<Item = &'a ReadingRecord>,
    {
        match kind {
            ViewKind::GenreCounts => AggregateView::GenreCounts(Self::genre_counts(records)),
            ViewKind::TopBooks => AggregateView::TopBooks(Self::top_books(records)),
            ViewKind::ReaderGenreMatrix => {
                AggregateView::ReaderGenreMatrix(Self::reader_genre_matrix(records))
            }
            ViewKind::MonthlyCounts => AggregateView::MonthlyCounts(Self::monthly_counts(records)),
            ViewKind::TopReaders => AggregateView::TopReaders(Self::top_readers(records)),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rec(title: &str, genre: &str, reader: &str, date: (i32, u32, u32)) -> ReadingRecord {
        ReadingRecord {
            title: title.to_string(),
            genre: genre.to_string(),
            reader: reader.to_string(),
            completion_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
        }
    }

    fn labels(rows: &[CountRow]) -> Vec<(&str, u64)> {
        rows.iter().map(|r| (r.label.as_str(), r.count)).collect()
    }

    // ── count_by / genre_counts ───────────────────────────────────────────────

    #[test]
    fn test_genre_counts_first_occurrence_order() {
        let records = vec![
            rec("A", "Sci-Fi", "X", (2024, 1, 1)),
            rec("B", "Fiction", "X", (2024, 1, 2)),
            rec("C", "Sci-Fi", "Y", (2024, 1, 3)),
        ];
        let rows = ViewAggregator::genre_counts(&records);
        assert_eq!(labels(&rows), vec![("Sci-Fi", 2), ("Fiction", 1)]);
    }

    #[test]
    fn test_genre_counts_sum_to_input_len() {
        let records = vec![
            rec("A", "Sci-Fi", "X", (2024, 1, 1)),
            rec("B", "Fiction", "X", (2024, 1, 2)),
            rec("C", "Poetry", "Y", (2024, 1, 3)),
            rec("D", "Fiction", "Z", (2024, 2, 3)),
        ];
        let total: u64 = ViewAggregator::genre_counts(&records)
            .iter()
            .map(|r| r.count)
            .sum();
        assert_eq!(total, records.len() as u64);
    }

    #[test]
    fn test_empty_input_gives_empty_views() {
        let records: Vec<ReadingRecord> = vec![];
        for kind in ViewKind::ALL {
            assert!(ViewAggregator::compute(kind, &records).is_empty(), "{kind:?}");
        }
    }

    // ── top_n ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_top_books_bounded_and_descending() {
        let mut records = Vec::new();
        for (i, title) in ["A", "B", "C", "D", "E", "F", "G"].iter().enumerate() {
            for _ in 0..=i {
                records.push(rec(title, "Fiction", "X", (2024, 1, 1)));
            }
        }
        let rows = ViewAggregator::top_books(&records);
        assert_eq!(rows.len(), TOP_N);
        assert_eq!(rows[0].label, "G");
        assert!(rows.windows(2).all(|w| w[0].count >= w[1].count));
    }

    #[test]
    fn test_top_n_ties_keep_first_occurrence() {
        let records = vec![
            rec("B", "Fiction", "X", (2024, 1, 1)),
            rec("A", "Fiction", "X", (2024, 1, 2)),
            rec("C", "Fiction", "X", (2024, 1, 3)),
            rec("C", "Fiction", "X", (2024, 1, 4)),
        ];
        let rows = ViewAggregator::top_books(&records);
        assert_eq!(labels(&rows), vec![("C", 2), ("B", 1), ("A", 1)]);
    }

    #[test]
    fn test_top_readers_fewer_than_n() {
        let records = vec![
            rec("A", "Fiction", "X", (2024, 1, 1)),
            rec("B", "Fiction", "Y", (2024, 1, 2)),
            rec("C", "Fiction", "X", (2024, 1, 3)),
        ];
        let rows = ViewAggregator::top_readers(&records);
        assert_eq!(labels(&rows), vec![("X", 2), ("Y", 1)]);
    }

    // ── reader_genre_matrix ───────────────────────────────────────────────────

    #[test]
    fn test_reader_genre_matrix_cells() {
        let records = vec![
            rec("A", "Fiction", "X", (2024, 3, 1)),
            rec("B", "Fiction", "X", (2024, 3, 15)),
            rec("A", "Sci-Fi", "Y", (2024, 4, 2)),
        ];
        let cells = ViewAggregator::reader_genre_matrix(&records);
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].reader, "X");
        assert_eq!(cells[0].genre, "Fiction");
        assert_eq!(cells[0].count, 2);
        assert_eq!(cells[1].reader, "Y");
        let total: u64 = cells.iter().map(|c| c.count).sum();
        assert_eq!(total, 3);
    }

    // ── monthly_counts ────────────────────────────────────────────────────────

    #[test]
    fn test_monthly_counts_chronological_across_years() {
        let records = vec![
            rec("A", "Fiction", "X", (2024, 1, 10)),
            rec("B", "Fiction", "X", (2023, 12, 5)),
            rec("C", "Fiction", "X", (2024, 1, 20)),
            rec("D", "Fiction", "X", (2023, 2, 1)),
        ];
        let points = ViewAggregator::monthly_counts(&records);
        let keys: Vec<&str> = points.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["02/2023", "12/2023", "01/2024"]);
        assert_eq!(points[2].count, 2);
        assert_eq!(points[0].month, NaiveDate::from_ymd_opt(2023, 2, 1).unwrap());
    }

    #[test]
    fn test_monthly_counts_no_gap_filling() {
        let records = vec![
            rec("A", "Fiction", "X", (2024, 1, 10)),
            rec("B", "Fiction", "X", (2024, 6, 5)),
        ];
        assert_eq!(ViewAggregator::monthly_counts(&records).len(), 2);
    }

    // ── compute ───────────────────────────────────────────────────────────────

    #[test]
    fn test_compute_returns_matching_kind() {
        let records = vec![rec("A", "Fiction", "X", (2024, 3, 1))];
        for kind in ViewKind::ALL {
            let view = ViewAggregator::compute(kind, &records);
            assert_eq!(view.kind(), kind);
            assert_eq!(view.total(), 1);
        }
    }
}
