//! Shared model and utilities for the Teisėkūra dashboard.
//!
//! Holds the fixed-schema statute records, period keys and period-count
//! tables, calendar helpers, number formatting, errors and CLI settings used
//! by every other crate in the workspace.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{Result, TeisekuraError};
