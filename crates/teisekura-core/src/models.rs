use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::TeisekuraError;
use crate::time_utils::quarter_of;

/// Legal-force state of a statute as reported by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// `galioja` – the act is currently in force.
    InForce,
    /// `negalioja` – the act has left force.
    NotInForce,
}

impl Status {
    /// Map a raw registry status cell. Unknown values are `None`.
    pub fn from_registry(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "galioja" => Some(Status::InForce),
            "negalioja" => Some(Status::NotInForce),
            _ => None,
        }
    }
}

/// Calendar bucket width used for aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Year,
    Quarter,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Year => "year",
            Granularity::Quarter => "quarter",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When the 2014-01-01 scope filter is applied relative to date coalescing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CutoffRule {
    /// Filter on the primary effective-date cell before coalescing. A record
    /// that only carries a conditional effective date is dropped.
    #[default]
    Raw,
    /// Filter on the coalesced effective date.
    Coalesced,
}

impl FromStr for CutoffRule {
    type Err = TeisekuraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "raw" => Ok(CutoffRule::Raw),
            "coalesced" => Ok(CutoffRule::Coalesced),
            other => Err(TeisekuraError::InvalidCutoffRule(other.to_string())),
        }
    }
}

// ── PeriodKey ─────────────────────────────────────────────────────────────────

/// A calendar bucket label: `YYYY` or `YYYY-Qn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PeriodKey {
    Year(i32),
    Quarter { year: i32, quarter: u32 },
}

impl PeriodKey {
    /// Year bucket containing `date`.
    pub fn year_of(date: NaiveDate) -> Self {
        PeriodKey::Year(date.year())
    }

    /// Year-quarter bucket containing `date`.
    pub fn quarter_of(date: NaiveDate) -> Self {
        PeriodKey::Quarter {
            year: date.year(),
            quarter: quarter_of(date),
        }
    }

    /// Bucket containing `date` at the requested granularity.
    pub fn for_date(date: NaiveDate, granularity: Granularity) -> Self {
        match granularity {
            Granularity::Year => Self::year_of(date),
            Granularity::Quarter => Self::quarter_of(date),
        }
    }

    pub fn year(&self) -> i32 {
        match *self {
            PeriodKey::Year(year) | PeriodKey::Quarter { year, .. } => year,
        }
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodKey::Year(year) => write!(f, "{year:04}"),
            PeriodKey::Quarter { year, quarter } => write!(f, "{year:04}-Q{quarter}"),
        }
    }
}

fn period_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d{4})(?:-Q([1-4]))?$").expect("valid period regex"))
}

impl FromStr for PeriodKey {
    type Err = TeisekuraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TeisekuraError::InvalidPeriod(s.to_string());
        let caps = period_pattern().captures(s.trim()).ok_or_else(invalid)?;
        let year: i32 = caps[1].parse().map_err(|_| invalid())?;
        match caps.get(2) {
            Some(q) => Ok(PeriodKey::Quarter {
                year,
                quarter: q.as_str().parse().map_err(|_| invalid())?,
            }),
            None => Ok(PeriodKey::Year(year)),
        }
    }
}

// ── Records ───────────────────────────────────────────────────────────────────

/// One registry row exactly as received, before any interpretation.
///
/// Empty cells are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub status: Option<String>,
    pub code: Option<String>,
    pub registered_on: Option<String>,
    pub effective: Option<String>,
    pub effective_conditional: Option<String>,
    pub repealed: Option<String>,
    pub repealed_conditional: Option<String>,
}

/// Which lifecycle event of a statute a series counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    EnteredForce,
    Repealed,
}

/// A normalised statute with coalesced dates and derived period keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub status: Option<Status>,
    pub code: String,
    pub registered_on: Option<NaiveDate>,
    pub effective_date: Option<NaiveDate>,
    pub repeal_date: Option<NaiveDate>,
    #[serde(skip)]
    pub effective_year: Option<PeriodKey>,
    #[serde(skip)]
    pub effective_quarter: Option<PeriodKey>,
    #[serde(skip)]
    pub repeal_year: Option<PeriodKey>,
    #[serde(skip)]
    pub repeal_quarter: Option<PeriodKey>,
}

impl Record {
    /// Build a record and derive its period keys from the two dates.
    pub fn new(
        status: Option<Status>,
        code: impl Into<String>,
        registered_on: Option<NaiveDate>,
        effective_date: Option<NaiveDate>,
        repeal_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            status,
            code: code.into(),
            registered_on,
            effective_date,
            repeal_date,
            effective_year: effective_date.map(PeriodKey::year_of),
            effective_quarter: effective_date.map(PeriodKey::quarter_of),
            repeal_year: repeal_date.map(PeriodKey::year_of),
            repeal_quarter: repeal_date.map(PeriodKey::quarter_of),
        }
    }

    /// Derived period key for `event` at `granularity`, if the date is known.
    pub fn period_key(&self, event: LifecycleEvent, granularity: Granularity) -> Option<PeriodKey> {
        match (event, granularity) {
            (LifecycleEvent::EnteredForce, Granularity::Year) => self.effective_year,
            (LifecycleEvent::EnteredForce, Granularity::Quarter) => self.effective_quarter,
            (LifecycleEvent::Repealed, Granularity::Year) => self.repeal_year,
            (LifecycleEvent::Repealed, Granularity::Quarter) => self.repeal_quarter,
        }
    }
}

/// The normalised record set for one cutoff date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordTable {
    /// Upper bound on effective date the table was loaded for.
    pub cutoff: NaiveDate,
    records: Vec<Record>,
}

impl RecordTable {
    pub fn new(cutoff: NaiveDate, records: Vec<Record>) -> Self {
        Self { cutoff, records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records currently reported with `status`.
    pub fn count_by_status(&self, status: Status) -> usize {
        self.records
            .iter()
            .filter(|r| r.status == Some(status))
            .count()
    }

    /// New table holding only the records matching `predicate`.
    pub fn filtered(&self, predicate: impl Fn(&Record) -> bool) -> Self {
        Self {
            cutoff: self.cutoff,
            records: self.records.iter().filter(|r| predicate(r)).cloned().collect(),
        }
    }
}

// ── Period-count table ────────────────────────────────────────────────────────

/// Counts of statutes entering and leaving force within one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodCountRow {
    pub period: String,
    pub entered_count: u64,
    pub repealed_count: u64,
}

/// Sparse, zero-filled, ascending period series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodCountTable {
    pub granularity: Granularity,
    pub rows: Vec<PeriodCountRow>,
}

impl PeriodCountTable {
    pub fn new(granularity: Granularity, rows: Vec<PeriodCountRow>) -> Self {
        Self { granularity, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row for `period`, if any event fell in it.
    pub fn get(&self, period: &str) -> Option<&PeriodCountRow> {
        self.rows
            .binary_search_by(|row| row.period.as_str().cmp(period))
            .ok()
            .map(|i| &self.rows[i])
    }

    /// `(entered, repealed)` summed over all rows.
    pub fn totals(&self) -> (u64, u64) {
        self.rows.iter().fold((0, 0), |(e, r), row| {
            (e + row.entered_count, r + row.repealed_count)
        })
    }

    /// Arithmetic mean of each count column; `(0.0, 0.0)` when empty.
    pub fn means(&self) -> (f64, f64) {
        if self.rows.is_empty() {
            return (0.0, 0.0);
        }
        let n = self.rows.len() as f64;
        let (entered, repealed) = self.totals();
        (entered as f64 / n, repealed as f64 / n)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
