use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Root of the application's own files, `~/.shelf/`.
pub fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".shelf")
}

/// Ensure `~/.shelf/` and `~/.shelf/logs/` exist.
pub fn ensure_directories() -> anyhow::Result<()> {
    let dir = app_dir();
    std::fs::create_dir_all(dir.join("logs"))?;
    Ok(())
}

/// Where dashboard runs log when no `--log-file` is given.
pub fn default_log_path() -> PathBuf {
    app_dir().join("logs").join("shelf.log")
}

/// Pick the log destination for a view.
///
/// The dashboard owns the terminal, so it always logs to a file; the summary
/// view logs to stderr unless a file was asked for.
pub fn log_destination(view: &str, log_file: Option<&Path>) -> Option<PathBuf> {
    match (log_file, view) {
        (Some(path), _) => Some(path.to_path_buf()),
        (None, "dashboard") => Some(default_log_path()),
        (None, _) => None,
    }
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map Python-style level names onto tracing filter directives.
///
/// Anything unrecognised is passed through so `EnvFilter` directives such as
/// `shelf_data=trace` still work.
pub fn normalise_level(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" | "CRITICAL" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" | "WARN" => "warn".to_string(),
        "ERROR" => "error".to_string(),
        _ => log_level.to_string(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// With `log_file` set, output is appended to that file without ANSI colours;
/// otherwise it goes to stderr.  Falls back to `"info"` if the level string
/// is not a valid filter.
pub fn setup_logging(log_level: &str, log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(normalise_level(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, stderr_layer) = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let layer = fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            (Some(layer), None)
        }
        None => {
            let layer = fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr);
            (None, Some(layer))
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()?;

    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
