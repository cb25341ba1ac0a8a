use chrono::NaiveDate;
use serde::Serialize;
use teisekura_core::models::{Granularity, PeriodCountRow, RecordTable};
use teisekura_data::aggregate;
use teisekura_data::analysis::{status_summary, StatusSummary};

/// Machine-readable output of `--json`.
#[derive(Debug, Serialize)]
pub struct JsonReport {
    pub cutoff: NaiveDate,
    pub records: usize,
    pub summary: StatusSummary,
    pub yearly: Vec<PeriodCountRow>,
    pub quarterly: Vec<PeriodCountRow>,
}

impl JsonReport {
    pub fn new(table: &RecordTable) -> Self {
        Self {
            cutoff: table.cutoff,
            records: table.len(),
            summary: status_summary(table),
            yearly: aggregate(table, Granularity::Year).rows,
            quarterly: aggregate(table, Granularity::Quarter).rows,
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
