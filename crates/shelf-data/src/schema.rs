//! Column-name mapping at the record-source boundary.
//!
//! Spreadsheet headers drift: trailing spaces, accents, casing, different
//! languages.  [`ColumnMapping`] resolves whatever headers a source delivers
//! to the four semantic fields once, so the pipeline never sees raw names.

use std::sync::OnceLock;

use regex::Regex;
use shelf_core::error::{Result, ShelfError};
use shelf_core::models::RawRow;
use shelf_core::settings::Settings;
use tracing::debug;

// ── Field ─────────────────────────────────────────────────────────────────────

/// The semantic fields a reading record is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Genre,
    Reader,
    CompletionDate,
}

impl Field {
    pub const ALL: [Field; 4] = [
        Field::Title,
        Field::Genre,
        Field::Reader,
        Field::CompletionDate,
    ];

    /// Name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Genre => "genre",
            Field::Reader => "reader",
            Field::CompletionDate => "completion date",
        }
    }

    /// Headers recognised for this field, already in normalized form.
    fn default_aliases(self) -> &'static [&'static str] {
        match self {
            Field::Title => &["title", "book", "titulo", "título", "livro"],
            Field::Genre => &["genre", "genero", "gênero", "genero literario", "gênero literário"],
            Field::Reader => &["reader", "completed by", "read by", "lido por", "leitor"],
            Field::CompletionDate => &[
                "completion date",
                "date",
                "finished",
                "data de termino da leitura",
                "data de término da leitura",
                "data",
            ],
        }
    }
}

/// Trim, collapse internal whitespace and lowercase a header.  A leading
/// byte-order mark is dropped as well.
///
/// `"Data de termino  da leitura "` → `"data de termino da leitura"`.
pub fn normalize_header(header: &str) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    let re = WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("regex is valid"));
    let header = header.trim_start_matches('\u{feff}').trim();
    re.replace_all(header, " ").to_lowercase()
}

// ── ColumnMapping ─────────────────────────────────────────────────────────────

/// Accepted header names for each semantic field.
#[derive(Debug, Clone)]
pub struct ColumnMapping {
    title: Vec<String>,
    genre: Vec<String>,
    reader: Vec<String>,
    completion_date: Vec<String>,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        let aliases = |field: Field| {
            field
                .default_aliases()
                .iter()
                .map(|a| a.to_string())
                .collect()
        };
        Self {
            title: aliases(Field::Title),
            genre: aliases(Field::Genre),
            reader: aliases(Field::Reader),
            completion_date: aliases(Field::CompletionDate),
        }
    }
}

impl ColumnMapping {
    /// Replace the aliases of `field` with a single explicit header.
    pub fn with_override(mut self, field: Field, header: &str) -> Self {
        *self.aliases_mut(field) = vec![normalize_header(header)];
        self
    }

    /// Default aliases, with any `--*-column` flags applied.
    pub fn from_settings(settings: &Settings) -> Self {
        let overrides = [
            (Field::Title, &settings.title_column),
            (Field::Genre, &settings.genre_column),
            (Field::Reader, &settings.reader_column),
            (Field::CompletionDate, &settings.date_column),
        ];
        overrides
            .into_iter()
            .fold(Self::default(), |mapping, (field, header)| match header {
                Some(h) => mapping.with_override(field, h),
                None => mapping,
            })
    }

    fn aliases(&self, field: Field) -> &[String] {
        match field {
            Field::Title => &self.title,
            Field::Genre => &self.genre,
            Field::Reader => &self.reader,
            Field::CompletionDate => &self.completion_date,
        }
    }

    fn aliases_mut(&mut self, field: Field) -> &mut Vec<String> {
        match field {
            Field::Title => &mut self.title,
            Field::Genre => &mut self.genre,
            Field::Reader => &mut self.reader,
            Field::CompletionDate => &mut self.completion_date,
        }
    }

    /// Match the raw `headers` against the aliases.
    ///
    /// Alias order is priority order: the first alias that matches any header
    /// wins, so `"completion date"` is preferred over a bare `"date"`.
    pub fn resolve<'h, I>(&self, headers: I) -> Result<ResolvedColumns>
    where
        I: IntoIterator<Item = &'h str>,
    {
        let headers: Vec<&str> = headers.into_iter().collect();
        let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();

        let find = |field: Field| -> Result<String> {
            self.aliases(field)
                .iter()
                .find_map(|alias| {
                    normalized
                        .iter()
                        .position(|h| h == alias)
                        .map(|i| headers[i].to_string())
                })
                .ok_or_else(|| ShelfError::MissingColumn {
                    field: field.name(),
                    available: headers.iter().map(|h| h.to_string()).collect(),
                })
        };

        let resolved = ResolvedColumns {
            title: find(Field::Title)?,
            genre: find(Field::Genre)?,
            reader: find(Field::Reader)?,
            completion_date: find(Field::CompletionDate)?,
        };
        debug!(?resolved, "resolved source columns");
        Ok(resolved)
    }
}

// ── ResolvedColumns ───────────────────────────────────────────────────────────

/// The concrete source headers chosen for each field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub title: String,
    pub genre: String,
    pub reader: String,
    pub completion_date: String,
}

/// A raw row projected onto the semantic fields; the date is still text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedRow {
    pub title: String,
    pub genre: String,
    pub reader: String,
    pub completion_date: String,
}

impl ResolvedColumns {
    /// Pull the four fields out of `row`, trimming surrounding whitespace.
    /// Cells missing from a short row read as empty.
    pub fn extract(&self, row: &RawRow) -> MappedRow {
        let cell = |header: &str| {
            row.get(header)
                .map(|v| v.trim().to_string())
                .unwrap_or_default()
        };
        MappedRow {
            title: cell(&self.title),
            genre: cell(&self.genre),
            reader: cell(&self.reader),
            completion_date: cell(&self.completion_date),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
