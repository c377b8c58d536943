//! Record sources for the reading log.
//!
//! A source delivers the sheet as [`RawRow`]s exactly once per dashboard
//! load.  Sources never retry: a failure is surfaced to the caller as a
//! fatal initialization error.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use shelf_core::error::{Result, ShelfError};
use shelf_core::models::RawRow;
use shelf_core::settings::Settings;
use tracing::{debug, info};

// ── RecordSource ──────────────────────────────────────────────────────────────

/// Anything that can hand over the reading-log table.
pub trait RecordSource: Send + Sync {
    /// Fetch every row of the table.  Called once per dashboard load.
    fn fetch_records(&self) -> Result<Vec<RawRow>>;

    /// Human-readable location, used in logs and the dashboard header.
    fn describe(&self) -> String;
}

// ── Local files ───────────────────────────────────────────────────────────────

/// A CSV export of the sheet on disk.  The first line holds the headers.
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for CsvFileSource {
    fn fetch_records(&self) -> Result<Vec<RawRow>> {
        let file = open_file(&self.path)?;
        let rows = parse_csv(file)?;
        debug!("Read {} rows from {}", rows.len(), self.path.display());
        Ok(rows)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// A JSON array of objects on disk, one object per row, keyed by header.
///
/// This is the shape a spreadsheet API's "all records" call returns, so a
/// dump of that call can be used directly.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for JsonFileSource {
    fn fetch_records(&self) -> Result<Vec<RawRow>> {
        let mut text = String::new();
        open_file(&self.path)?
            .read_to_string(&mut text)
            .map_err(|source| ShelfError::FileRead {
                path: self.path.clone(),
                source,
            })?;
        let rows = parse_json_records(&text)?;
        debug!("Read {} rows from {}", rows.len(), self.path.display());
        Ok(rows)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

fn open_file(path: &Path) -> Result<std::fs::File> {
    std::fs::File::open(path).map_err(|source| ShelfError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

// ── Remote sheet ──────────────────────────────────────────────────────────────

/// Default timeout for remote fetches.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A sheet fetched over HTTP as CSV.
///
/// The sheet must be readable without credentials (shared by link or
/// published); authentication is not handled here.
#[derive(Debug, Clone)]
pub struct SheetCsvSource {
    url: String,
    timeout: Duration,
}

impl SheetCsvSource {
    /// Fetch CSV from an arbitrary URL.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }

    /// Fetch worksheet `gid` of spreadsheet `sheet_id` through its CSV export.
    pub fn for_sheet(sheet_id: &str, gid: u64, timeout: Duration) -> Self {
        Self::new(Self::export_url(sheet_id, gid), timeout)
    }

    /// CSV export URL of one worksheet.
    pub fn export_url(sheet_id: &str, gid: u64) -> String {
        format!(
            "https://docs.google.com/spreadsheets/d/{}/export?format=csv&gid={}",
            sheet_id.trim(),
            gid
        )
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn http_error(&self, err: impl std::fmt::Display) -> ShelfError {
        ShelfError::Http {
            url: self.url.clone(),
            message: err.to_string(),
        }
    }
}

impl RecordSource for SheetCsvSource {
    fn fetch_records(&self) -> Result<Vec<RawRow>> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| self.http_error(e))?;

        let response = client
            .get(&self.url)
            .send()
            .map_err(|e| self.http_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ShelfError::HttpStatus {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        // Private sheets answer 200 with a sign-in page.
        let is_html = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("text/html"));
        if is_html {
            return Err(self.http_error(
                "received an HTML page instead of CSV; is the sheet shared by link?",
            ));
        }

        let body = response.bytes().map_err(|e| self.http_error(e))?;
        let rows = parse_csv(body.as_ref())?;
        info!("Fetched {} rows from {}", rows.len(), self.url);
        Ok(rows)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

// ── Source selection ──────────────────────────────────────────────────────────

/// Pick a source for `location`: `http(s)://` → remote CSV, `*.json` → JSON
/// file, anything else → CSV file.
pub fn source_from_location(location: &str, timeout: Duration) -> Box<dyn RecordSource> {
    let location = location.trim();
    let lower = location.to_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Box::new(SheetCsvSource::new(location, timeout))
    } else if lower.ends_with(".json") {
        Box::new(JsonFileSource::new(location))
    } else {
        Box::new(CsvFileSource::new(location))
    }
}

/// Build the source configured by `--source` or `--sheet-id`.
///
/// `--source` takes precedence.  Having neither is a configuration error.
pub fn source_from_settings(settings: &Settings) -> Result<Box<dyn RecordSource>> {
    let timeout = Duration::from_secs(settings.timeout);
    if let Some(location) = settings.source.as_deref() {
        return Ok(source_from_location(location, timeout));
    }
    if let Some(sheet_id) = settings.sheet_id.as_deref() {
        return Ok(Box::new(SheetCsvSource::for_sheet(
            sheet_id,
            settings.gid,
            timeout,
        )));
    }
    Err(ShelfError::Config(
        "no reading log configured; pass --source <file|url> or --sheet-id <id>".to_string(),
    ))
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse CSV with a header line into rows.
///
/// Rows may be shorter than the header (missing trailing cells are simply
/// absent).  Fully blank lines, which sheet exports append after the data,
/// are skipped.
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<RawRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let mut rows = Vec::new();
    let mut blank = 0usize;

    for result in reader.records() {
        let record = result?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            blank += 1;
            continue;
        }
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.to_string(), v.to_string()))
            .collect();
        rows.push(row);
    }

    if blank > 0 {
        debug!("Skipped {} blank CSV lines", blank);
    }
    Ok(rows)
}

/// Parse a JSON array of objects into rows.
///
/// Non-string cells are stringified (`2024` → `"2024"`); `null` becomes the
/// empty string.
pub fn parse_json_records(text: &str) -> Result<Vec<RawRow>> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let serde_json::Value::Array(items) = value else {
        return Err(ShelfError::JsonLayout(
            "expected a top-level array of records".to_string(),
        ));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            serde_json::Value::Object(map) => Ok(map
                .into_iter()
                .map(|(k, v)| (k, cell_text(v)))
                .collect::<RawRow>()),
            _ => Err(ShelfError::JsonLayout(format!(
                "record {} is not an object",
                i + 1
            ))),
        })
        .collect()
}

fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    const SAMPLE_CSV: &str = "\
Titulo,Genero ,Lido por ,Data de termino da leitura
A,Fiction,X,01/03/2024
B,Fiction,X,15/03/2024
A,Sci-Fi,Y,02/04/2024
";

    // ── parse_csv ─────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_csv_keys_rows_by_header() {
        let rows = parse_csv(SAMPLE_CSV.as_bytes()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["Titulo"], "A");
        assert_eq!(rows[0]["Genero "], "Fiction");
        assert_eq!(rows[2]["Data de termino da leitura"], "02/04/2024");
    }

    #[test]
    fn test_parse_csv_skips_blank_lines_and_allows_short_rows() {
        let csv = "Title,Genre,Reader,Date\nA,Fiction\n,,,\nB,Poetry,Z,01/01/2024\n";
        let rows = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 2);
        assert!(!rows[0].contains_key("Reader"));
        assert_eq!(rows[1]["Reader"], "Z");
    }

    #[test]
    fn test_parse_csv_quoted_cells() {
        let csv = "Title,Genre,Reader,Date\n\"Crime, Punishment\",Classic,Ana,01/02/2024\n";
        let rows = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(rows[0]["Title"], "Crime, Punishment");
    }

    #[test]
    fn test_parse_csv_header_only() {
        let rows = parse_csv("Title,Genre,Reader,Date\n".as_bytes()).unwrap();
        assert!(rows.is_empty());
    }

    // ── parse_json_records ────────────────────────────────────────────────────

    #[test]
    fn test_parse_json_records_stringifies_cells() {
        let json = r#"[
            {"Titulo": "1984", "Genero ": "Dystopia", "Lido por ": null, "Ano": 1949}
        ]"#;
        let rows = parse_json_records(json).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["Titulo"], "1984");
        assert_eq!(rows[0]["Lido por "], "");
        assert_eq!(rows[0]["Ano"], "1949");
    }

    #[test]
    fn test_parse_json_records_rejects_wrong_layout() {
        assert!(matches!(
            parse_json_records(r#"{"Titulo": "A"}"#),
            Err(ShelfError::JsonLayout(_))
        ));
        assert!(matches!(
            parse_json_records(r#"[{"Titulo": "A"}, 3]"#),
            Err(ShelfError::JsonLayout(msg)) if msg.contains("record 2")
        ));
        assert!(matches!(
            parse_json_records("[{"),
            Err(ShelfError::JsonParse(_))
        ));
    }

    // ── File sources ──────────────────────────────────────────────────────────

    #[test]
    fn test_csv_file_source_reads_file() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("leituras.csv");
        std::fs::write(&path, SAMPLE_CSV).unwrap();

        let source = CsvFileSource::new(&path);
        let rows = source.fetch_records().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(source.describe(), path.display().to_string());
    }

    #[test]
    fn test_json_file_source_reads_file() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("leituras.json");
        std::fs::write(
            &path,
            r#"[{"Title": "A", "Genre": "Fiction", "Reader": "X", "Date": "01/03/2024"}]"#,
        )
        .unwrap();

        let rows = JsonFileSource::new(&path).fetch_records().unwrap();
        assert_eq!(rows[0]["Reader"], "X");
    }

    #[test]
    fn test_missing_file_is_file_read_error() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("absent.csv");
        let err = CsvFileSource::new(&path).fetch_records().unwrap_err();
        assert!(matches!(err, ShelfError::FileRead { .. }));
        assert!(err.to_string().contains("absent.csv"));
    }

    // ── Source selection ──────────────────────────────────────────────────────

    #[test]
    fn test_export_url() {
        assert_eq!(
            SheetCsvSource::export_url(" abc123 ", 7),
            "https://docs.google.com/spreadsheets/d/abc123/export?format=csv&gid=7"
        );
    }

    #[test]
    fn test_source_from_location_dispatch() {
        let timeout = Duration::from_secs(DEFAULT_TIMEOUT_SECS);
        let remote = source_from_location("https://example.com/log.csv", timeout);
        assert_eq!(remote.describe(), "https://example.com/log.csv");

        // A JSON path that does not exist surfaces as a file error, proving
        // the JSON source was picked without touching the network.
        let json = source_from_location("/nonexistent/dump.JSON", timeout);
        assert!(matches!(
            json.fetch_records(),
            Err(ShelfError::FileRead { .. })
        ));
        assert_eq!(
            source_from_location("books.csv", timeout).describe(),
            "books.csv"
        );
    }

    #[test]
    fn test_source_from_settings() {
        let settings = Settings::parse_from(["shelf", "--sheet-id", "abc", "--gid", "3"]);
        let source = source_from_settings(&settings).unwrap();
        assert_eq!(
            source.describe(),
            "https://docs.google.com/spreadsheets/d/abc/export?format=csv&gid=3"
        );

        let settings = Settings::parse_from(["shelf", "--source", "x.csv", "--sheet-id", "abc"]);
        assert_eq!(source_from_settings(&settings).unwrap().describe(), "x.csv");

        let settings = Settings::parse_from(["shelf"]);
        assert!(matches!(
            source_from_settings(&settings),
            Err(ShelfError::Config(_))
        ));
    }
}
