//! Terminal UI layer for Teisėkūra.
//!
//! Provides themes, the header, metric card and chart components, the
//! dashboard and period table views, and the application event loop built
//! on top of [`ratatui`].

pub mod app;
pub mod components;
pub mod dashboard_view;
pub mod table_view;
pub mod themes;

pub use app::{App, ViewMode};
pub use teisekura_core as core;
