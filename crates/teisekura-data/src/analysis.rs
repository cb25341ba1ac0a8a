//! Dashboard quantities derived from a normalised record table.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use teisekura_core::models::{
    Granularity, PeriodCountRow, PeriodCountTable, PeriodKey, RecordTable, Status,
};
use teisekura_core::time_utils::end_of_previous_quarter;

use crate::aggregator::PeriodAggregator;

// ── Types ─────────────────────────────────────────────────────────────────────

/// How many in-scope statutes are currently in force and how many are not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub in_force: usize,
    pub not_in_force: usize,
}

/// Running number of statutes in force at the end of a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CumulativePoint {
    pub period: String,
    pub in_force: i64,
}

/// Column means used as trend reference lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SeriesMeans {
    pub entered: f64,
    pub repealed: f64,
}

impl From<&PeriodCountTable> for SeriesMeans {
    fn from(table: &PeriodCountTable) -> Self {
        let (entered, repealed) = table.means();
        Self { entered, repealed }
    }
}

/// Everything the dashboard renders, computed once per load.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    pub cutoff: NaiveDate,
    pub today: NaiveDate,
    pub summary: StatusSummary,
    /// Yearly table over statutes that entered force before the current
    /// year. Current-year repeals of those statutes still produce a partial
    /// current-year row (entered 0), which feeds the means and the last
    /// cumulative bar.
    pub yearly: PeriodCountTable,
    pub yearly_means: SeriesMeans,
    pub cumulative: Vec<CumulativePoint>,
    pub previous_year: PeriodCountRow,
    pub quarterly: PeriodCountTable,
    pub quarterly_means: SeriesMeans,
    pub previous_quarter: PeriodCountRow,
}

// ── Functions ─────────────────────────────────────────────────────────────────

/// Count records by reported status. Records with unknown status count in
/// neither bucket.
pub fn status_summary(table: &RecordTable) -> StatusSummary {
    StatusSummary {
        in_force: table.count_by_status(Status::InForce),
        not_in_force: table.count_by_status(Status::NotInForce),
    }
}

/// Yearly aggregation over records not entering force in `current_year`.
///
/// Only entries are excluded: a `current_year` repeal of an older statute
/// still yields a `current_year` row with `entered_count == 0`.
pub fn yearly_excluding_current(table: &RecordTable, current_year: i32) -> PeriodCountTable {
    let current = PeriodKey::Year(current_year);
    let completed = table.filtered(|r| r.effective_year != Some(current));
    PeriodAggregator::aggregate(&completed, Granularity::Year)
}

/// Running sum of `entered - repealed` over the rows in order.
pub fn cumulative_in_force(table: &PeriodCountTable) -> Vec<CumulativePoint> {
    let mut running: i64 = 0;
    table
        .rows
        .iter()
        .map(|row| {
            running += row.entered_count as i64 - row.repealed_count as i64;
            CumulativePoint {
                period: row.period.clone(),
                in_force: running,
            }
        })
        .collect()
}

/// Row for `key`, or a zero row when nothing happened in that period.
pub fn row_or_zero(table: &PeriodCountTable, key: PeriodKey) -> PeriodCountRow {
    let period = key.to_string();
    table.get(&period).cloned().unwrap_or(PeriodCountRow {
        period,
        entered_count: 0,
        repealed_count: 0,
    })
}

/// Row for the calendar year before `today`.
pub fn previous_year(yearly: &PeriodCountTable, today: NaiveDate) -> PeriodCountRow {
    row_or_zero(yearly, PeriodKey::Year(today.year() - 1))
}

/// Row for the quarter before the one containing `today`.
pub fn previous_quarter(quarterly: &PeriodCountTable, today: NaiveDate) -> PeriodCountRow {
    row_or_zero(quarterly, PeriodKey::quarter_of(end_of_previous_quarter(today)))
}

impl DashboardData {
    /// Derive every dashboard quantity from `table` as seen on `today`.
    pub fn build(table: &RecordTable, today: NaiveDate) -> Self {
        let yearly = yearly_excluding_current(table, today.year());
        let quarterly = PeriodAggregator::aggregate(table, Granularity::Quarter);

        Self {
            cutoff: table.cutoff,
            today,
            summary: status_summary(table),
            yearly_means: SeriesMeans::from(&yearly),
            cumulative: cumulative_in_force(&yearly),
            previous_year: previous_year(&yearly, today),
            quarterly_means: SeriesMeans::from(&quarterly),
            previous_quarter: previous_quarter(&quarterly, today),
            yearly,
            quarterly,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use teisekura_core::models::Record;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rec(status: Option<Status>, effective: NaiveDate, repeal: Option<NaiveDate>) -> Record {
        Record::new(status, "TAR", None, Some(effective), repeal)
    }

    fn sample() -> RecordTable {
        RecordTable::new(
            ymd(2024, 5, 20),
            vec![
                rec(Some(Status::InForce), ymd(2021, 3, 1), None),
                rec(Some(Status::NotInForce), ymd(2021, 6, 1), Some(ymd(2022, 2, 1))),
                rec(Some(Status::InForce), ymd(2022, 1, 15), None),
                rec(Some(Status::InForce), ymd(2023, 11, 2), None),
                rec(Some(Status::NotInForce), ymd(2023, 12, 1), Some(ymd(2024, 1, 5))),
                rec(Some(Status::InForce), ymd(2024, 2, 2), None),
                rec(None, ymd(2024, 4, 4), None),
            ],
        )
    }

    fn row(period: &str, e: u64, r: u64) -> PeriodCountRow {
        PeriodCountRow {
            period: period.to_string(),
            entered_count: e,
            repealed_count: r,
        }
    }

    #[test]
    fn test_status_summary_ignores_unknown() {
        let s = status_summary(&sample());
        assert_eq!(s.in_force, 4);
        assert_eq!(s.not_in_force, 2);
    }

    #[test]
    fn test_yearly_excludes_current_year_entries() {
        let yearly = yearly_excluding_current(&sample(), 2024);
        let periods: Vec<&str> = yearly.rows.iter().map(|r| r.period.as_str()).collect();
        // The 2024 repeal of a 2023 statute still lands in a 2024 row.
        assert_eq!(periods, vec!["2021", "2022", "2023", "2024"]);
        assert_eq!(yearly.get("2024").map(|r| (r.entered_count, r.repealed_count)), Some((0, 1)));
    }

    #[test]
    fn test_cumulative_running_sum() {
        let table = PeriodCountTable::new(
            Granularity::Year,
            vec![row("2019", 5, 0), row("2020", 1, 4), row("2021", 0, 3)],
        );
        let points: Vec<i64> = cumulative_in_force(&table).iter().map(|p| p.in_force).collect();
        assert_eq!(points, vec![5, 2, -1]);
    }

    #[test]
    fn test_cumulative_empty() {
        let table = PeriodCountTable::new(Granularity::Year, vec![]);
        assert!(cumulative_in_force(&table).is_empty());
    }

    #[test]
    fn test_previous_year_lookup_with_gap() {
        let yearly = PeriodCountTable::new(
            Granularity::Year,
            vec![row("2021", 3, 1), row("2023", 2, 2)],
        );
        assert_eq!(previous_year(&yearly, ymd(2024, 5, 20)), row("2023", 2, 2));
        assert_eq!(previous_year(&yearly, ymd(2023, 1, 1)), row("2022", 0, 0));
    }

    #[test]
    fn test_previous_quarter_crosses_year_boundary() {
        let quarterly = PeriodCountTable::new(
            Granularity::Quarter,
            vec![row("2023-Q4", 4, 0), row("2024-Q1", 1, 1)],
        );
        assert_eq!(previous_quarter(&quarterly, ymd(2024, 2, 10)), row("2023-Q4", 4, 0));
        assert_eq!(previous_quarter(&quarterly, ymd(2024, 5, 20)), row("2024-Q1", 1, 1));
        assert_eq!(previous_quarter(&quarterly, ymd(2024, 9, 1)), row("2024-Q2", 0, 0));
    }

    #[test]
    fn test_dashboard_build() {
        let data = DashboardData::build(&sample(), ymd(2024, 5, 20));

        assert_eq!(data.cutoff, ymd(2024, 5, 20));
        assert_eq!(data.summary.in_force, 4);
        assert_eq!(data.previous_year, row("2023", 2, 0));
        assert_eq!(data.previous_quarter, row("2024-Q1", 1, 1));

        let cumulative: Vec<i64> = data.cumulative.iter().map(|p| p.in_force).collect();
        // 2021: +2, 2022: +1 -1, 2023: +2, 2024: -1
        assert_eq!(cumulative, vec![2, 2, 4, 3]);

        assert!((data.yearly_means.entered - 5.0 / 4.0).abs() < 1e-9);
        assert!((data.yearly_means.repealed - 2.0 / 4.0).abs() < 1e-9);
        assert!(data.quarterly.get("2024-Q2").is_some());
    }

    #[test]
    fn test_dashboard_build_empty_table() {
        let data = DashboardData::build(&RecordTable::new(ymd(2024, 1, 1), vec![]), ymd(2024, 1, 1));
        assert!(data.yearly.is_empty());
        assert!(data.cumulative.is_empty());
        assert_eq!(data.yearly_means, SeriesMeans::default());
        assert_eq!(data.previous_year, row("2023", 0, 0));
        assert_eq!(data.previous_quarter, row("2023-Q4", 0, 0));
    }
}
