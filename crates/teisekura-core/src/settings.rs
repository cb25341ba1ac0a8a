use chrono::NaiveDate;
use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Result, TeisekuraError};
use crate::models::CutoffRule;
use crate::time_utils::parse_iso_date;

/// CSV export endpoint of the legal-acts registry on data.gov.lt.
pub const DEFAULT_SOURCE_URL: &str =
    "https://get.data.gov.lt/datasets/gov/lrsk/teises_aktai/Dokumentas/:format/csv";

/// Default lifetime of a cached registry load.
pub const DEFAULT_CACHE_TTL_HOURS: u64 = 24;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Statute dynamics of the Lithuanian Seimas since 2014
#[derive(Parser, Debug, Clone)]
#[command(
    name = "teisekura",
    about = "Statute dynamics of the Lithuanian Seimas since 2014",
    version
)]
pub struct Settings {
    /// Include statutes entering force on or before this date (YYYY-MM-DD, default today)
    #[arg(long)]
    pub cutoff: Option<String>,

    /// View mode
    #[arg(long, default_value = "dashboard", value_parser = ["dashboard", "yearly", "quarterly"])]
    pub view: String,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// Hours a registry load stays cached (1-168)
    #[arg(long, default_value = "24", value_parser = clap::value_parser!(u64).range(1..=168))]
    pub cache_ttl_hours: u64,

    /// Registry CSV endpoint
    #[arg(long, env = "TEISEKURA_SOURCE_URL", default_value = DEFAULT_SOURCE_URL)]
    pub source_url: String,

    /// Read a previously downloaded registry CSV instead of fetching
    #[arg(long)]
    pub source_file: Option<PathBuf>,

    /// When the 2014-01-01 scope filter is applied relative to date coalescing
    #[arg(long, default_value = "raw", value_parser = ["raw", "coalesced"])]
    pub cutoff_rule: String,

    /// Print yearly and quarterly tables as JSON instead of starting the TUI
    #[arg(long)]
    pub json: bool,

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

/// Persisted last-used parameters saved to `~/.teisekura/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_ttl_hours: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cutoff_rule: Option<String>,
}

impl LastUsedParams {
    /// Default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Config path rooted at `base_dir`.
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".teisekura").join("last_used.json")
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
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> Result<()> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
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

    /// Same as [`Settings::load_with_last_used`] with an explicit argument
    /// list and config path.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                tracing::warn!(error = %e, "could not clear saved configuration");
            }
            return Self::apply_debug(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI always wins over persisted values.
        if !is_arg_explicitly_set(&matches, "view") {
            if let Some(v) = last.view {
                settings.view = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "theme") {
            if let Some(v) = last.theme {
                settings.theme = v;
            }
        }
        // NOTE: clap stores the arg id using the field name (underscores).
        if !is_arg_explicitly_set(&matches, "cache_ttl_hours") {
            if let Some(v) = last.cache_ttl_hours {
                settings.cache_ttl_hours = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "cutoff_rule") {
            if let Some(v) = last.cutoff_rule {
                settings.cutoff_rule = v;
            }
        }

        settings = Self::apply_debug(settings);

        let params = LastUsedParams::from(&settings);
        if let Err(e) = params.save_to(config_path) {
            tracing::warn!(error = %e, "could not persist last-used configuration");
        }

        settings
    }

    /// Resolve the cutoff date, defaulting to `today`.
    pub fn cutoff_date(&self, today: NaiveDate) -> Result<NaiveDate> {
        match self.cutoff.as_deref() {
            Some(raw) => parse_iso_date(raw),
            None => Ok(today),
        }
    }

    /// Parsed form of `--cutoff-rule`.
    pub fn cutoff_rule(&self) -> Result<CutoffRule> {
        self.cutoff_rule.parse()
    }

    /// Reject settings that cannot possibly produce a dashboard.
    pub fn validate(&self) -> Result<()> {
        let url = self.source_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(TeisekuraError::Config(format!(
                "source url must be http(s): {url:?}"
            )));
        }
        if let Some(raw) = self.cutoff.as_deref() {
            parse_iso_date(raw)?;
        }
        self.cutoff_rule()?;
        Ok(())
    }

    fn apply_debug(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            theme: Some(s.theme.clone()),
            view: Some(s.view.clone()),
            cache_ttl_hours: Some(s.cache_ttl_hours),
            cutoff_rule: Some(s.cutoff_rule.clone()),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
