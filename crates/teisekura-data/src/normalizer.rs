//! Turns fetched registry rows into typed [`Record`]s.

use chrono::NaiveDate;
use teisekura_core::models::{CutoffRule, RawRecord, Record, RecordTable, Status};
use teisekura_core::time_utils::{parse_date_lenient, registry_start};
use tracing::debug;

/// Parse the primary date cell, falling back to the conditional one.
pub fn coalesce_date(primary: Option<&str>, fallback: Option<&str>) -> Option<NaiveDate> {
    primary
        .and_then(parse_date_lenient)
        .or_else(|| fallback.and_then(parse_date_lenient))
}

/// Normalise one raw row; `None` when it falls outside the registry window.
pub fn normalize_record(raw: &RawRecord, rule: CutoffRule) -> Option<Record> {
    let effective = coalesce_date(raw.effective.as_deref(), raw.effective_conditional.as_deref());

    let scoped_on = match rule {
        CutoffRule::Raw => raw.effective.as_deref().and_then(parse_date_lenient),
        CutoffRule::Coalesced => effective,
    };
    if !scoped_on.is_some_and(|d| d >= registry_start()) {
        return None;
    }

    let repeal = coalesce_date(raw.repealed.as_deref(), raw.repealed_conditional.as_deref());

    Some(Record::new(
        raw.status.as_deref().and_then(Status::from_registry),
        raw.code.clone().unwrap_or_default(),
        raw.registered_on.as_deref().and_then(parse_date_lenient),
        effective,
        repeal,
    ))
}

/// Normalise every row and keep the in-scope ones, preserving order.
pub fn normalize(raw: &[RawRecord], cutoff: NaiveDate, rule: CutoffRule) -> RecordTable {
    let records: Vec<Record> = raw
        .iter()
        .filter_map(|r| normalize_record(r, rule))
        .collect();

    debug!(
        fetched = raw.len(),
        kept = records.len(),
        ?rule,
        "normalised registry rows"
    );

    RecordTable::new(cutoff, records)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use teisekura_core::models::PeriodKey;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn raw(effective: Option<&str>, effective_cond: Option<&str>) -> RawRecord {
        RawRecord {
            status: Some("galioja".to_string()),
            code: Some("TAR-1".to_string()),
            effective: effective.map(str::to_string),
            effective_conditional: effective_cond.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_coalesce_prefers_primary() {
        assert_eq!(
            coalesce_date(Some("2020-01-01"), Some("2021-01-01")),
            Some(ymd(2020, 1, 1))
        );
    }

    #[test]
    fn test_coalesce_falls_back_when_primary_absent_or_garbage() {
        assert_eq!(coalesce_date(None, Some("2021-01-01")), Some(ymd(2021, 1, 1)));
        assert_eq!(
            coalesce_date(Some("n/a"), Some("2021-01-01")),
            Some(ymd(2021, 1, 1))
        );
        assert_eq!(coalesce_date(None, None), None);
        assert_eq!(coalesce_date(Some("??"), Some("")), None);
    }

    #[test]
    fn test_normalize_derives_keys_and_status() {
        let mut r = raw(Some("2020-07-01"), None);
        r.status = Some("negalioja".to_string());
        r.repealed_conditional = Some("2021-01-10T00:00:00".to_string());
        r.registered_on = Some("2020-06-20".to_string());

        let record = normalize_record(&r, CutoffRule::Raw).unwrap();
        assert_eq!(record.status, Some(Status::NotInForce));
        assert_eq!(record.registered_on, Some(ymd(2020, 6, 20)));
        assert_eq!(record.repeal_date, Some(ymd(2021, 1, 10)));
        assert_eq!(record.effective_quarter, Some(PeriodKey::Quarter { year: 2020, quarter: 3 }));
        assert_eq!(record.repeal_year, Some(PeriodKey::Year(2021)));
    }

    #[test]
    fn test_unknown_status_is_kept_as_missing() {
        let mut r = raw(Some("2020-07-01"), None);
        r.status = Some("įsigalios".to_string());
        let record = normalize_record(&r, CutoffRule::Raw).unwrap();
        assert!(record.status.is_none());
    }

    #[test]
    fn test_drops_records_before_registry_start() {
        assert!(normalize_record(&raw(Some("2013-12-31"), None), CutoffRule::Raw).is_none());
        assert!(normalize_record(&raw(Some("2014-01-01"), None), CutoffRule::Raw).is_some());
    }

    #[test]
    fn test_drops_records_without_effective_date() {
        assert!(normalize_record(&raw(None, None), CutoffRule::Raw).is_none());
        assert!(normalize_record(&raw(None, None), CutoffRule::Coalesced).is_none());
    }

    #[test]
    fn test_raw_rule_excludes_conditional_only_records() {
        let r = raw(None, Some("2020-05-05"));
        assert!(normalize_record(&r, CutoffRule::Raw).is_none());

        let record = normalize_record(&r, CutoffRule::Coalesced).unwrap();
        assert_eq!(record.effective_date, Some(ymd(2020, 5, 5)));
    }

    #[test]
    fn test_coalesced_rule_filters_on_coalesced_date() {
        // Primary is unparseable, conditional is out of window.
        let r = raw(Some("bad"), Some("2013-06-01"));
        assert!(normalize_record(&r, CutoffRule::Coalesced).is_none());
    }

    #[test]
    fn test_normalize_preserves_order_and_cutoff() {
        let rows = vec![
            raw(Some("2021-02-02"), None),
            raw(Some("2010-01-01"), None),
            raw(Some("2020-03-15"), None),
        ];
        let table = normalize(&rows, ymd(2024, 1, 1), CutoffRule::Raw);
        assert_eq!(table.cutoff, ymd(2024, 1, 1));
        let dates: Vec<_> = table.iter().map(|r| r.effective_date).collect();
        assert_eq!(dates, vec![Some(ymd(2021, 2, 2)), Some(ymd(2020, 3, 15))]);
    }

    #[test]
    fn test_missing_code_becomes_empty_string() {
        let mut r = raw(Some("2020-01-01"), None);
        r.code = None;
        assert_eq!(normalize_record(&r, CutoffRule::Raw).unwrap().code, "");
    }
}
