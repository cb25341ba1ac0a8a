use thiserror::Error;

/// All errors produced by the Teisėkūra core crates.
#[derive(Error, Debug)]
pub enum TeisekuraError {
    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A user-supplied date was not a valid ISO `YYYY-MM-DD` date.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// A period label was neither `YYYY` nor `YYYY-Qn`.
    #[error("Invalid period key: {0}")]
    InvalidPeriod(String),

    /// A cutoff rule name was neither `raw` nor `coalesced`.
    #[error("Invalid cutoff rule: {0}")]
    InvalidCutoffRule(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, TeisekuraError>;
