//! Normalization and filtering: raw rows → record set → filtered records.
//!
//! Every function here is pure.  The record set is built once per load and
//! never mutated; filtering borrows from it and returns a new view.

use std::collections::{BTreeSet, HashSet};

use shelf_core::error::{Result, ShelfError};
use shelf_core::models::{Choice, FilterSelection, RawRow, ReadingRecord};
use shelf_core::time_utils::parse_day_first;
use tracing::debug;

use crate::schema::ColumnMapping;

// ── RecordSet ─────────────────────────────────────────────────────────────────

/// The full, date-ordered set of reading records for one load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSet {
    records: Vec<ReadingRecord>,
}

impl RecordSet {
    /// Build a set from already-parsed records, sorting them ascending by
    /// completion date.  The sort is stable: same-day records keep their
    /// source order.
    pub fn from_records(mut records: Vec<ReadingRecord>) -> Self {
        records.sort_by_key(|r| r.completion_date);
        Self { records }
    }

    pub fn records(&self) -> &[ReadingRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReadingRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a ReadingRecord;
    type IntoIter = std::slice::Iter<'a, ReadingRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

// ── Normalize ─────────────────────────────────────────────────────────────────

/// Map raw rows onto reading records and sort them by completion date.
///
/// Headers are resolved against every column name seen in any row, so a
/// short row (trailing cells missing) never hides a column.  A date that
/// does not parse day-first fails the whole load with
/// [`ShelfError::DateParse`], whose `row` is the 1-based position in `rows`;
/// for CSV input that counts non-blank data lines.  Rows are never dropped
/// silently.
pub fn normalize(rows: &[RawRow], mapping: &ColumnMapping) -> Result<RecordSet> {
    if rows.is_empty() {
        return Ok(RecordSet::default());
    }
    let headers: BTreeSet<&str> = rows
        .iter()
        .flat_map(|row| row.keys().map(String::as_str))
        .collect();
    let columns = mapping.resolve(headers)?;

    let records = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mapped = columns.extract(row);
            let completion_date =
                parse_day_first(&mapped.completion_date).ok_or_else(|| ShelfError::DateParse {
                    row: i + 1,
                    value: mapped.completion_date.clone(),
                })?;
            Ok(ReadingRecord {
                title: mapped.title,
                genre: mapped.genre,
                reader: mapped.reader,
                completion_date,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!("Normalized {} records", records.len());
    Ok(RecordSet::from_records(records))
}

// ── Filter options ────────────────────────────────────────────────────────────

/// The values each selector offers, `All` first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOptions {
    pub months: Vec<Choice>,
    pub genres: Vec<Choice>,
}

impl FilterOptions {
    /// Derive both option lists from `records`.
    pub fn from_records(records: &RecordSet) -> Self {
        Self {
            months: month_options(records),
            genres: genre_options(records),
        }
    }

    /// Replace choices that no option list offers with `All`.
    ///
    /// Used for selections restored from a previous run against a
    /// possibly different sheet.
    pub fn sanitize(&self, selection: &FilterSelection) -> FilterSelection {
        let keep = |choice: &Choice, options: &[Choice]| {
            if options.contains(choice) {
                choice.clone()
            } else {
                Choice::All
            }
        };
        FilterSelection::new(
            keep(&selection.month, &self.months),
            keep(&selection.genre, &self.genres),
        )
    }
}

/// Distinct month keys in first-occurrence order, `All` prepended.
///
/// Because the set is date-sorted, first-occurrence order is chronological.
pub fn month_options(records: &RecordSet) -> Vec<Choice> {
    with_all(distinct(records.iter().map(|r| r.month_key())))
}

/// Distinct genres in first-occurrence order, `All` prepended.
pub fn genre_options(records: &RecordSet) -> Vec<Choice> {
    with_all(distinct(records.iter().map(|r| r.genre.clone())))
}

fn distinct(values: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    values.filter(|v| seen.insert(v.clone())).collect()
}

fn with_all(values: Vec<String>) -> Vec<Choice> {
    std::iter::once(Choice::All)
        .chain(values.into_iter().map(Choice::Only))
        .collect()
}

// ── Apply filter ──────────────────────────────────────────────────────────────

/// Result of applying a [`FilterSelection`].
///
/// `Empty` is a normal state ("no data for this selection"), distinct from
/// a computed-but-empty aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filtered<'a> {
    Empty,
    Records(Vec<&'a ReadingRecord>),
}

impl<'a> Filtered<'a> {
    pub fn is_empty(&self) -> bool {
        matches!(self, Filtered::Empty)
    }

    /// Matching records; empty slice for [`Filtered::Empty`].
    pub fn records(&self) -> &[&'a ReadingRecord] {
        match self {
            Filtered::Empty => &[],
            Filtered::Records(records) => records,
        }
    }
}

/// Keep records whose month key and genre both pass `selection`.
///
/// The two predicates are independent equality checks, so applying them
/// together, or one after the other in either order, gives the same result.
pub fn filter_records<'a, I>(records: I, selection: &FilterSelection) -> Vec<&'a ReadingRecord>
where
    I: IntoIterator<Item = &'a ReadingRecord>,
{
    records
        .into_iter()
        .filter(|r| selection.month.matches(&r.month_key()))
        .filter(|r| selection.genre.matches(&r.genre))
        .collect()
}

/// Apply `selection` to the full set, signalling `Empty` when nothing matches.
pub fn apply_filter<'a>(records: &'a RecordSet, selection: &FilterSelection) -> Filtered<'a> {
    let matching = filter_records(records, selection);
    if matching.is_empty() {
        debug!(
            month = %selection.month,
            genre = %selection.genre,
            "filter matched no records"
        );
        Filtered::Empty
    } else {
        Filtered::Records(matching)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::parse_csv;
    use chrono::NaiveDate;

    fn raw(title: &str, genre: &str, reader: &str, date: &str) -> RawRow {
        [
            ("Titulo", title),
            ("Genero ", genre),
            ("Lido por ", reader),
            ("Data de termino da leitura ", date),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    fn sample_rows() -> Vec<RawRow> {
        vec![
            raw("A", "Fiction", "X", "01/03/2024"),
            raw("B", "Fiction", "X", "15/03/2024"),
            raw("A", "Sci-Fi", "Y", "02/04/2024"),
        ]
    }

    fn sample_set() -> RecordSet {
        normalize(&sample_rows(), &ColumnMapping::default()).unwrap()
    }

    fn only(v: &str) -> Choice {
        Choice::Only(v.to_string())
    }

    fn titles(records: &[&ReadingRecord]) -> Vec<String> {
        records.iter().map(|r| r.title.clone()).collect()
    }

    // ── normalize ─────────────────────────────────────────────────────────────

    #[test]
    fn test_normalize_parses_day_first_dates() {
        let set = sample_set();
        assert_eq!(set.len(), 3);
        assert_eq!(
            set.records()[2].completion_date,
            NaiveDate::from_ymd_opt(2024, 4, 2).unwrap()
        );
        assert_eq!(set.records()[0].genre, "Fiction");
    }

    #[test]
    fn test_normalize_sorts_by_date_stably() {
        let rows = vec![
            raw("Late", "Poetry", "Z", "20/05/2024"),
            raw("Same1", "Poetry", "Z", "01/01/2024"),
            raw("Early", "Poetry", "Z", "31/12/2023"),
            raw("Same2", "Poetry", "Z", "01/01/2024"),
        ];
        let set = normalize(&rows, &ColumnMapping::default()).unwrap();
        let order: Vec<&str> = set.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(order, vec!["Early", "Same1", "Same2", "Late"]);
    }

    #[test]
    fn test_normalize_rejects_bad_date_with_row_number() {
        let mut rows = sample_rows();
        rows.push(raw("C", "Poetry", "Z", "31/02/2024"));
        let err = normalize(&rows, &ColumnMapping::default()).unwrap_err();
        match err {
            ShelfError::DateParse { row, value } => {
                assert_eq!(row, 4);
                assert_eq!(value, "31/02/2024");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_normalize_empty_input() {
        let set = normalize(&[], &ColumnMapping::default()).unwrap();
        assert!(set.is_empty());
        assert_eq!(month_options(&set), vec![Choice::All]);
    }

    #[test]
    fn test_normalize_missing_column() {
        let rows = vec![[("Title", "A"), ("Date", "01/01/2024")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<RawRow>()];
        let err = normalize(&rows, &ColumnMapping::default()).unwrap_err();
        assert!(matches!(err, ShelfError::MissingColumn { .. }));
    }

    #[test]
    fn test_normalize_short_first_row_keeps_later_columns() {
        let short_first = "Date,Title,Genre,Reader\n01/03/2024,A,Fiction\n02/03/2024,B,Poetry,Z\n";
        let short_last = "Date,Title,Genre,Reader\n02/03/2024,B,Poetry,Z\n01/03/2024,A,Fiction\n";

        for csv in [short_first, short_last] {
            let rows = parse_csv(csv.as_bytes()).unwrap();
            let set = normalize(&rows, &ColumnMapping::default()).unwrap();
            assert_eq!(set.len(), 2);
            assert_eq!(set.records()[0].title, "A");
            assert_eq!(set.records()[0].reader, "");
            assert_eq!(set.records()[1].reader, "Z");
        }
    }

    #[test]
    fn test_normalize_row_number_counts_non_blank_lines() {
        let csv = "Date,Title,Genre,Reader\n01/03/2024,A,Fiction,X\n\n31/02/2024,B,Poetry,Z\n";
        let rows = parse_csv(csv.as_bytes()).unwrap();
        match normalize(&rows, &ColumnMapping::default()).unwrap_err() {
            ShelfError::DateParse { row, value } => {
                assert_eq!(row, 2);
                assert_eq!(value, "31/02/2024");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    // ── options ───────────────────────────────────────────────────────────────

    #[test]
    fn test_month_options_chronological_with_all_first() {
        let rows = vec![
            raw("A", "Fiction", "X", "02/04/2024"),
            raw("B", "Fiction", "X", "15/03/2024"),
            raw("C", "Fiction", "X", "01/03/2024"),
        ];
        let set = normalize(&rows, &ColumnMapping::default()).unwrap();
        assert_eq!(
            month_options(&set),
            vec![Choice::All, only("03/2024"), only("04/2024")]
        );
    }

    #[test]
    fn test_genre_options_first_occurrence_after_sort() {
        let rows = vec![
            raw("A", "Sci-Fi", "X", "02/04/2024"),
            raw("B", "Fiction", "X", "15/03/2024"),
            raw("C", "Sci-Fi", "X", "01/05/2024"),
        ];
        let set = normalize(&rows, &ColumnMapping::default()).unwrap();
        assert_eq!(
            genre_options(&set),
            vec![Choice::All, only("Fiction"), only("Sci-Fi")]
        );
    }

    #[test]
    fn test_sanitize_drops_unknown_choices() {
        let options = FilterOptions::from_records(&sample_set());
        let restored = FilterSelection::new(only("01/1999"), only("Fiction"));
        assert_eq!(
            options.sanitize(&restored),
            FilterSelection::new(Choice::All, only("Fiction"))
        );
    }

    // ── apply_filter ──────────────────────────────────────────────────────────

    #[test]
    fn test_apply_filter_all_keeps_everything() {
        let set = sample_set();
        let filtered = apply_filter(&set, &FilterSelection::default());
        assert_eq!(filtered.records().len(), 3);
    }

    #[test]
    fn test_apply_filter_by_month() {
        let set = sample_set();
        let sel = FilterSelection::new(only("03/2024"), Choice::All);
        assert_eq!(titles(apply_filter(&set, &sel).records()), vec!["A", "B"]);
    }

    #[test]
    fn test_filter_records_month_all_spans_every_month() {
        let set = sample_set();
        let sel = FilterSelection::new(Choice::All, only("Fiction"));
        assert_eq!(titles(&filter_records(&set, &sel)), vec!["A", "B"]);
        let sel = FilterSelection::new(Choice::All, only("Sci-Fi"));
        assert_eq!(titles(&filter_records(&set, &sel)), vec!["A"]);
    }

    #[test]
    fn test_apply_filter_by_genre() {
        let set = sample_set();
        let sel = FilterSelection::new(Choice::All, only("Sci-Fi"));
        assert_eq!(titles(apply_filter(&set, &sel).records()), vec!["A"]);
    }

    #[test]
    fn test_apply_filter_empty_signal() {
        let set = sample_set();
        let sel = FilterSelection::new(only("04/2024"), only("Fiction"));
        let filtered = apply_filter(&set, &sel);
        assert!(filtered.is_empty());
        assert_eq!(filtered, Filtered::Empty);
        assert!(filtered.records().is_empty());
    }

    #[test]
    fn test_apply_filter_does_not_mutate_source() {
        let set = sample_set();
        let before = set.clone();
        let _ = apply_filter(&set, &FilterSelection::new(only("03/2024"), Choice::All));
        assert_eq!(set, before);
    }

    #[test]
    fn test_filter_conjunction_is_order_insensitive() {
        let set = sample_set();
        let months = month_options(&set);
        let genres = genre_options(&set);

        for m in months.iter().filter(|c| !c.is_all()) {
            for g in genres.iter().filter(|c| !c.is_all()) {
                let both = filter_records(&set, &FilterSelection::new(m.clone(), g.clone()));

                let month_first = filter_records(
                    filter_records(&set, &FilterSelection::new(m.clone(), Choice::All)),
                    &FilterSelection::new(Choice::All, g.clone()),
                );
                let genre_first = filter_records(
                    filter_records(&set, &FilterSelection::new(Choice::All, g.clone())),
                    &FilterSelection::new(m.clone(), Choice::All),
                );

                assert_eq!(both, month_first, "month={m} genre={g}");
                assert_eq!(both, genre_first, "month={m} genre={g}");
            }
        }
    }

    #[test]
    fn test_apply_filter_is_idempotent() {
        let set = sample_set();
        let sel = FilterSelection::new(only("03/2024"), only("Fiction"));
        assert_eq!(apply_filter(&set, &sel), apply_filter(&set, &sel));
    }
}
