use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::FilterSelection;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Reading-log analytics dashboard for the terminal
#[derive(Parser, Debug, Clone)]
#[command(
    name = "shelf",
    about = "Reading-log analytics dashboard for the terminal",
    version
)]
pub struct Settings {
    /// Reading log location: CSV or JSON file path, or a CSV URL
    #[arg(long)]
    pub source: Option<String>,

    /// Spreadsheet id whose CSV export should be fetched
    #[arg(long)]
    pub sheet_id: Option<String>,

    /// Worksheet id inside the spreadsheet
    #[arg(long, default_value = "0")]
    pub gid: u64,

    /// Header of the title column (overrides auto-detection)
    #[arg(long)]
    pub title_column: Option<String>,

    /// Header of the genre column (overrides auto-detection)
    #[arg(long)]
    pub genre_column: Option<String>,

    /// Header of the reader column (overrides auto-detection)
    #[arg(long)]
    pub reader_column: Option<String>,

    /// Header of the completion date column (overrides auto-detection)
    #[arg(long)]
    pub date_column: Option<String>,

    /// Initial month filter (MM/YYYY or All)
    #[arg(long, default_value = "All")]
    pub month: String,

    /// Initial genre filter (genre name or All)
    #[arg(long, default_value = "All")]
    pub genre: String,

    /// View mode
    #[arg(long, default_value = "dashboard", value_parser = ["dashboard", "summary"])]
    pub view: String,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// HTTP timeout in seconds when fetching a remote sheet (1-300)
    #[arg(long, default_value = "30", value_parser = clap::value_parser!(u64).range(1..=300))]
    pub timeout: u64,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.shelf/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gid: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    /// Uses `~/.shelf/last_used.json`.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".shelf").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path, creating parent
    /// directories if needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        // Write to a temp file then rename for atomicity.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Record the filter the user left the dashboard on, so the next run
    /// opens with the same selection.
    pub fn remember_selection(
        path: &std::path::Path,
        selection: &FilterSelection,
    ) -> Result<(), std::io::Error> {
        let mut params = Self::load_from(path);
        params.month = Some(selection.month.label().to_string());
        params.genre = Some(selection.genre.label().to_string());
        params.save_to(path)
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation – accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        // Build raw ArgMatches so we can query ValueSource.
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            let _ = LastUsedParams::clear_at(config_path);
            return Self::resolve_flags(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI always wins.  Clap stores arg ids under the field name.
        if !is_arg_explicitly_set(&matches, "theme") {
            if let Some(v) = last.theme {
                settings.theme = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "view") {
            if let Some(v) = last.view {
                settings.view = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "month") {
            if let Some(v) = last.month {
                settings.month = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "genre") {
            if let Some(v) = last.genre {
                settings.genre = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "timeout") {
            if let Some(v) = last.timeout {
                settings.timeout = v;
            }
        }
        // A source given on the command line replaces both remembered
        // locations, so a stale sheet id never shadows a fresh file path.
        if settings.source.is_none() && settings.sheet_id.is_none() {
            settings.source = last.source;
            settings.sheet_id = last.sheet_id;
            if !is_arg_explicitly_set(&matches, "gid") {
                if let Some(v) = last.gid {
                    settings.gid = v;
                }
            }
        }

        settings = Self::resolve_flags(settings);

        let params = LastUsedParams::from(&settings);
        let _ = params.save_to(config_path);

        settings
    }

    /// Apply the `--debug` flag.
    fn resolve_flags(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    /// The filter selection the dashboard should open with.
    pub fn initial_selection(&self) -> FilterSelection {
        FilterSelection::from_labels(&self.month, &self.genre)
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            theme: Some(s.theme.clone()),
            view: Some(s.view.clone()),
            source: s.source.clone(),
            sheet_id: s.sheet_id.clone(),
            gid: Some(s.gid),
            month: Some(s.month.clone()),
            genre: Some(s.genre.clone()),
            timeout: Some(s.timeout),
        }
    }
}

// ── Helper: check if an arg was explicitly set on the command line ─────────────

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Choice;
    use tempfile::TempDir;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn tmp_config_path(tmp: &TempDir) -> PathBuf {
        LastUsedParams::config_path_in(tmp.path())
    }

    fn load(args: &[&str], config_path: &std::path::Path) -> Settings {
        let args = args.iter().map(std::ffi::OsString::from).collect();
        Settings::load_with_last_used_impl(args, config_path)
    }

    // ── LastUsedParams ────────────────────────────────────────────────────────

    #[test]
    fn test_last_used_params_save_load() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        let params = LastUsedParams {
            theme: Some("dark".to_string()),
            view: Some("summary".to_string()),
            source: Some("/data/leituras.csv".to_string()),
            sheet_id: None,
            gid: Some(0),
            month: Some("03/2024".to_string()),
            genre: Some("Fiction".to_string()),
            timeout: Some(10),
        };
        params.save_to(&path).expect("save");

        let loaded = LastUsedParams::load_from(&path);
        assert_eq!(loaded.theme, Some("dark".to_string()));
        assert_eq!(loaded.view, Some("summary".to_string()));
        assert_eq!(loaded.source, Some("/data/leituras.csv".to_string()));
        assert!(loaded.sheet_id.is_none());
        assert_eq!(loaded.month, Some("03/2024".to_string()));
        assert_eq!(loaded.genre, Some("Fiction".to_string()));
        assert_eq!(loaded.timeout, Some(10));
    }

    #[test]
    fn test_last_used_params_clear() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);

        LastUsedParams {
            theme: Some("light".to_string()),
            ..Default::default()
        }
        .save_to(&path)
        .expect("save");
        assert!(path.exists(), "file must exist after save");

        LastUsedParams::clear_at(&path).expect("clear");
        assert!(!path.exists(), "file must be gone after clear");
    }

    #[test]
    fn test_last_used_params_default_when_missing_or_corrupt() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        assert!(LastUsedParams::load_from(&path).theme.is_none());

        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();
        assert!(LastUsedParams::load_from(&path).source.is_none());
    }

    #[test]
    fn test_remember_selection_keeps_other_fields() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        LastUsedParams {
            theme: Some("classic".to_string()),
            ..Default::default()
        }
        .save_to(&path)
        .expect("save");

        let selection = FilterSelection::new(Choice::Only("04/2024".to_string()), Choice::All);
        LastUsedParams::remember_selection(&path, &selection).expect("remember");

        let loaded = LastUsedParams::load_from(&path);
        assert_eq!(loaded.theme, Some("classic".to_string()));
        assert_eq!(loaded.month, Some("04/2024".to_string()));
        assert_eq!(loaded.genre, Some("All".to_string()));
    }

    // ── CLI parsing ───────────────────────────────────────────────────────────

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::parse_from(["shelf"]);

        assert!(settings.source.is_none());
        assert!(settings.sheet_id.is_none());
        assert_eq!(settings.gid, 0);
        assert!(settings.title_column.is_none());
        assert_eq!(settings.month, "All");
        assert_eq!(settings.genre, "All");
        assert_eq!(settings.view, "dashboard");
        assert_eq!(settings.theme, "auto");
        assert_eq!(settings.timeout, 30);
        assert_eq!(settings.log_level, "INFO");
        assert!(settings.log_file.is_none());
        assert!(!settings.debug);
        assert!(!settings.clear);
        assert!(settings.initial_selection().is_unfiltered());
    }

    #[test]
    fn test_settings_cli_column_overrides() {
        let settings = Settings::parse_from([
            "shelf",
            "--title-column",
            "Livro",
            "--date-column",
            "Terminado em",
        ]);
        assert_eq!(settings.title_column.as_deref(), Some("Livro"));
        assert_eq!(settings.date_column.as_deref(), Some("Terminado em"));
        assert!(settings.genre_column.is_none());
    }

    #[test]
    fn test_settings_rejects_out_of_range_timeout() {
        assert!(Settings::try_parse_from(["shelf", "--timeout", "0"]).is_err());
        assert!(Settings::try_parse_from(["shelf", "--view", "weekly"]).is_err());
    }

    #[test]
    fn test_initial_selection_from_flags() {
        let settings = Settings::parse_from(["shelf", "--month", "03/2024", "--genre", "Fiction"]);
        let sel = settings.initial_selection();
        assert_eq!(sel.month, Choice::Only("03/2024".to_string()));
        assert_eq!(sel.genre, Choice::Only("Fiction".to_string()));
    }

    // ── load_with_last_used ───────────────────────────────────────────────────

    #[test]
    fn test_load_with_last_used_merges_persisted_values() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            theme: Some("dark".to_string()),
            source: Some("/data/leituras.csv".to_string()),
            genre: Some("Fantasy".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = load(&["shelf"], &config_path);
        assert_eq!(settings.theme, "dark");
        assert_eq!(settings.source.as_deref(), Some("/data/leituras.csv"));
        assert_eq!(settings.genre, "Fantasy");
        assert_eq!(settings.month, "All");
    }

    #[test]
    fn test_load_with_last_used_cli_overrides_persisted() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            theme: Some("dark".to_string()),
            month: Some("01/2024".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = load(
            &["shelf", "--theme", "light", "--month", "All"],
            &config_path,
        );
        assert_eq!(settings.theme, "light");
        assert_eq!(settings.month, "All");
    }

    #[test]
    fn test_load_with_last_used_cli_source_replaces_remembered_sheet() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            sheet_id: Some("abc123".to_string()),
            gid: Some(7),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = load(&["shelf", "--source", "books.csv"], &config_path);
        assert_eq!(settings.source.as_deref(), Some("books.csv"));
        assert!(settings.sheet_id.is_none());
        assert_eq!(settings.gid, 0);
    }

    #[test]
    fn test_load_with_last_used_clear_removes_file() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            theme: Some("classic".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = load(&["shelf", "--clear"], &config_path);

        assert!(!config_path.exists(), "file must be gone after --clear");
        assert_eq!(settings.theme, "auto");
    }

    #[test]
    fn test_load_with_last_used_debug_overrides_log_level() {
        let tmp = TempDir::new().expect("tempdir");
        let settings = load(&["shelf", "--debug"], &tmp_config_path(&tmp));
        assert_eq!(settings.log_level, "DEBUG");
    }

    #[test]
    fn test_load_with_last_used_persists_after_run() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        load(&["shelf", "--sheet-id", "abc123", "--gid", "5"], &config_path);

        assert!(config_path.exists(), "config file must be persisted");
        let loaded = LastUsedParams::load_from(&config_path);
        assert_eq!(loaded.sheet_id, Some("abc123".to_string()));
        assert_eq!(loaded.gid, Some(5));
    }
}
