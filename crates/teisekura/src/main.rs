mod bootstrap;
mod export;

use std::time::Duration;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use tracing::info;

use teisekura_core::settings::Settings;
use teisekura_data::{CsvSource, RecordSource, RegistrySource};
use teisekura_runtime::{DataManager, TtlCache};
use teisekura_ui::themes::Theme;
use teisekura_ui::{App, ViewMode};

use crate::export::JsonReport;

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();
    settings.validate()?;

    bootstrap::ensure_directories()?;
    let log_file = settings
        .log_file
        .clone()
        .or_else(|| (!settings.json).then(bootstrap::default_log_file));
    bootstrap::setup_logging(&settings.log_level, log_file.as_ref())?;

    info!("Teisėkūra v{} starting", env!("CARGO_PKG_VERSION"));

    let today = Local::now().date_naive();
    let cutoff = settings.cutoff_date(today)?;
    let rule = settings.cutoff_rule()?;
    info!(%cutoff, %today, rule = ?rule, view = %settings.view, theme = %settings.theme, "configuration");

    match &settings.source_file {
        Some(path) => {
            let source = CsvSource::from_path(path, rule)?;
            run(&settings, source, cutoff, today)
        }
        None => {
            let source = RegistrySource::new(settings.source_url.trim(), rule)?;
            run(&settings, source, cutoff, today)
        }
    }
}

fn run<S: RecordSource>(
    settings: &Settings,
    source: S,
    cutoff: NaiveDate,
    today: NaiveDate,
) -> Result<()> {
    info!(source = %source.describe(), "data source");
    let ttl = Duration::from_secs(settings.cache_ttl_hours * 3600);
    let mut manager = DataManager::with_cache(source, TtlCache::new(ttl));

    if settings.json {
        let table = manager.get_data(cutoff, false)?;
        let report = JsonReport::new(&table);
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let view: ViewMode = settings.view.parse()?;
    let theme = Theme::from_name(&settings.theme);
    App::new(theme, view, cutoff, today, manager).run()?;

    info!("Teisėkūra stopped");
    Ok(())
}
