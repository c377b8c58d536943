mod bootstrap;
mod summary;

use anyhow::{bail, Result};
use shelf_core::settings::{LastUsedParams, Settings};
use shelf_data::reader::source_from_settings;
use shelf_data::schema::ColumnMapping;
use shelf_runtime::data_manager::DataManager;
use shelf_runtime::session::DashboardSession;
use shelf_ui::app::App;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    let log_file = bootstrap::log_destination(&settings.view, settings.log_file.as_deref());
    bootstrap::setup_logging(&settings.log_level, log_file.as_deref())?;

    tracing::info!("Shelf v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!("View: {}, Theme: {}", settings.view, settings.theme);

    let source = source_from_settings(&settings)?;
    let mut manager = DataManager::new(source, ColumnMapping::from_settings(&settings));
    let records = manager.load_async().await?;
    let session = DashboardSession::new(records, &settings.initial_selection());

    match settings.view.as_str() {
        "dashboard" => {
            let app = App::new(&settings.theme, session, manager.describe_source());

            // Ctrl+C arrives as a key event in raw mode and ends the loop.
            let selection = app.run()?;
            if let Err(e) =
                LastUsedParams::remember_selection(&LastUsedParams::config_path(), &selection)
            {
                tracing::warn!("Could not remember filter selection: {}", e);
            }
        }

        "summary" => {
            print!(
                "{}",
                summary::render_summary(session.analysis(), &manager.describe_source())
            );
        }

        unknown => bail!("Unknown view mode: {} (expected dashboard or summary)", unknown),
    }

    Ok(())
}
