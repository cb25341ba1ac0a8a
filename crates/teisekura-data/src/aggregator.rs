//! Period aggregation of statute lifecycle events.
//!
//! Builds the sparse `period / entered_count / repealed_count` table by
//! counting each event series separately, outer-joining them on the period
//! key and zero-filling the gaps.

use std::collections::BTreeMap;

use teisekura_core::models::{
    Granularity, LifecycleEvent, PeriodCountRow, PeriodCountTable, PeriodKey, RecordTable,
};

// ── PeriodCounts ──────────────────────────────────────────────────────────────

/// Entered / repealed tallies for one period while the join is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct PeriodCounts {
    entered: u64,
    repealed: u64,
}

// ── PeriodAggregator ──────────────────────────────────────────────────────────

/// Stateless helper that groups records by calendar period.
pub struct PeriodAggregator;

impl PeriodAggregator {
    /// Count records per period key of `event`.
    ///
    /// Records without an effective date are out of scope and never counted,
    /// whichever event is requested.
    pub fn count_series(
        table: &RecordTable,
        event: LifecycleEvent,
        granularity: Granularity,
    ) -> BTreeMap<PeriodKey, u64> {
        let mut series = BTreeMap::new();
        for record in table.iter().filter(|r| r.effective_date.is_some()) {
            if let Some(key) = record.period_key(event, granularity) {
                *series.entry(key).or_insert(0) += 1;
            }
        }
        series
    }

    /// Aggregate `table` into a sorted, zero-filled period table.
    pub fn aggregate(table: &RecordTable, granularity: Granularity) -> PeriodCountTable {
        let entered = Self::count_series(table, LifecycleEvent::EnteredForce, granularity);
        let repealed = Self::count_series(table, LifecycleEvent::Repealed, granularity);

        let mut joined: BTreeMap<PeriodKey, PeriodCounts> = BTreeMap::new();
        for (key, count) in entered {
            joined.entry(key).or_default().entered = count;
        }
        for (key, count) in repealed {
            joined.entry(key).or_default().repealed = count;
        }

        let mut rows: Vec<PeriodCountRow> = joined
            .into_iter()
            .map(|(key, counts)| PeriodCountRow {
                period: key.to_string(),
                entered_count: counts.entered,
                repealed_count: counts.repealed,
            })
            .collect();

        // Row order is defined on the label string.
        rows.sort_by(|a, b| a.period.cmp(&b.period));

        tracing::debug!(%granularity, periods = rows.len(), "aggregated period table");
        PeriodCountTable::new(granularity, rows)
    }
}

/// Shorthand for [`PeriodAggregator::aggregate`].
pub fn aggregate(table: &RecordTable, granularity: Granularity) -> PeriodCountTable {
    PeriodAggregator::aggregate(table, granularity)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::BTreeSet;
    use teisekura_core::models::{Record, Status};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rec(effective: Option<NaiveDate>, repeal: Option<NaiveDate>) -> Record {
        let status = if repeal.is_some() {
            Status::NotInForce
        } else {
            Status::InForce
        };
        Record::new(Some(status), "TAR", None, effective, repeal)
    }

    fn table(records: Vec<Record>) -> RecordTable {
        RecordTable::new(ymd(2024, 12, 31), records)
    }

    fn scenario() -> RecordTable {
        table(vec![
            rec(Some(ymd(2020, 3, 15)), None),
            rec(Some(ymd(2020, 7, 1)), Some(ymd(2021, 1, 10))),
            rec(Some(ymd(2021, 2, 2)), None),
        ])
    }

    fn mixed() -> RecordTable {
        table(vec![
            rec(Some(ymd(2014, 1, 1)), Some(ymd(2019, 12, 31))),
            rec(Some(ymd(2016, 5, 1)), None),
            rec(Some(ymd(2016, 11, 30)), Some(ymd(2023, 4, 4))),
            rec(Some(ymd(2018, 2, 28)), Some(ymd(2018, 3, 1))),
            rec(Some(ymd(2022, 9, 9)), None),
        ])
    }

    fn as_tuples(t: &PeriodCountTable) -> Vec<(&str, u64, u64)> {
        t.rows
            .iter()
            .map(|r| (r.period.as_str(), r.entered_count, r.repealed_count))
            .collect()
    }

    #[test]
    fn test_scenario_yearly() {
        let yearly = aggregate(&scenario(), Granularity::Year);
        assert_eq!(yearly.granularity, Granularity::Year);
        assert_eq!(as_tuples(&yearly), vec![("2020", 2, 0), ("2021", 1, 1)]);
    }

    #[test]
    fn test_scenario_quarterly() {
        let quarterly = aggregate(&scenario(), Granularity::Quarter);
        assert_eq!(
            as_tuples(&quarterly),
            vec![("2020-Q1", 1, 0), ("2020-Q3", 1, 0), ("2021-Q1", 1, 1)]
        );
    }

    #[test]
    fn test_union_is_complete() {
        let t = mixed();
        for granularity in [Granularity::Year, Granularity::Quarter] {
            let agg = aggregate(&t, granularity);
            let expected: BTreeSet<String> = t
                .iter()
                .flat_map(|r| {
                    [
                        r.period_key(LifecycleEvent::EnteredForce, granularity),
                        r.period_key(LifecycleEvent::Repealed, granularity),
                    ]
                })
                .flatten()
                .map(|k| k.to_string())
                .collect();
            let actual: BTreeSet<String> = agg.rows.iter().map(|r| r.period.clone()).collect();
            assert_eq!(actual, expected, "{granularity}");
            assert_eq!(agg.len(), expected.len());
        }
    }

    #[test]
    fn test_zero_fill_and_totals_match_series() {
        let t = mixed();
        let agg = aggregate(&t, Granularity::Year);
        let (entered, repealed) = agg.totals();
        assert_eq!(entered, 5);
        assert_eq!(repealed, 3);
        // 2019 only has a repeal, 2016 only has entries.
        assert_eq!(agg.get("2019").map(|r| r.entered_count), Some(0));
        assert_eq!(agg.get("2016").map(|r| r.repealed_count), Some(0));
        assert_eq!(agg.get("2018").map(|r| (r.entered_count, r.repealed_count)), Some((1, 1)));
    }

    #[test]
    fn test_rows_strictly_ascending() {
        for granularity in [Granularity::Year, Granularity::Quarter] {
            let agg = aggregate(&mixed(), granularity);
            for pair in agg.rows.windows(2) {
                assert!(pair[0].period < pair[1].period, "{pair:?}");
            }
        }
    }

    #[test]
    fn test_table_is_sparse() {
        let agg = aggregate(&mixed(), Granularity::Quarter);
        assert!(agg
            .rows
            .iter()
            .all(|r| r.entered_count > 0 || r.repealed_count > 0));
        // Nothing happened in 2015.
        assert!(aggregate(&mixed(), Granularity::Year).get("2015").is_none());
    }

    #[test]
    fn test_missing_dates_are_excluded() {
        let t = table(vec![
            rec(None, Some(ymd(2020, 1, 1))),
            rec(Some(ymd(2021, 1, 1)), None),
        ]);
        let agg = aggregate(&t, Granularity::Year);
        assert_eq!(as_tuples(&agg), vec![("2021", 1, 0)]);
    }

    #[test]
    fn test_empty_table() {
        let agg = aggregate(&table(vec![]), Granularity::Quarter);
        assert!(agg.is_empty());
        assert_eq!(agg.granularity, Granularity::Quarter);
    }

    #[test]
    fn test_count_series_groups_by_key() {
        let series = PeriodAggregator::count_series(
            &mixed(),
            LifecycleEvent::EnteredForce,
            Granularity::Year,
        );
        assert_eq!(series.get(&PeriodKey::Year(2016)), Some(&2));
        assert_eq!(series.values().sum::<u64>(), 5);
    }
}
