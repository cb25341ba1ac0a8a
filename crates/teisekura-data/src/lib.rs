//! Data layer for Teisėkūra.
//!
//! Fetches statute rows from the legal-acts registry, normalises their dates
//! and aggregates them into period count tables and dashboard quantities.

pub mod aggregator;
pub mod analysis;
pub mod fetcher;
pub mod normalizer;
pub mod source;

pub use aggregator::{aggregate, PeriodAggregator};
pub use analysis::DashboardData;
pub use fetcher::{FetchError, RegistryClient};
pub use source::{CsvSource, RecordSource, RegistrySource};
pub use teisekura_core as core;
