//! Runtime layer for Teisėkūra.
//!
//! Owns the time-boxed cache and the data manager that memoises registry
//! loads between dashboard refreshes.

pub mod cache;
pub mod data_manager;

pub use cache::TtlCache;
pub use data_manager::DataManager;
pub use teisekura_core as core;
pub use teisekura_data as data;
