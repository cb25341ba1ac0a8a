//! `cutoff -> RecordTable` loading behind a trait, so callers can swap the
//! network for fixtures.

use chrono::NaiveDate;
use teisekura_core::models::{CutoffRule, RecordTable};
use teisekura_core::time_utils::registry_start;

use crate::fetcher::{FetchError, RegistryClient};
use crate::normalizer::normalize;

/// Something that can produce the normalised statute table for a cutoff.
pub trait RecordSource {
    fn load(&self, cutoff: NaiveDate) -> Result<RecordTable, FetchError>;

    /// Human-readable origin shown in the dashboard header.
    fn describe(&self) -> String;
}

/// Live registry: one HTTP fetch followed by normalisation.
pub struct RegistrySource {
    client: RegistryClient,
    rule: CutoffRule,
}

impl RegistrySource {
    pub fn new(base_url: impl Into<String>, rule: CutoffRule) -> Result<Self, FetchError> {
        Ok(Self {
            client: RegistryClient::new(base_url)?,
            rule,
        })
    }
}

impl RecordSource for RegistrySource {
    fn load(&self, cutoff: NaiveDate) -> Result<RecordTable, FetchError> {
        let raw = self.client.fetch(cutoff)?;
        Ok(normalize(&raw, cutoff, self.rule))
    }

    fn describe(&self) -> String {
        self.client.base_url().to_string()
    }
}

/// Source backed by an in-memory CSV body.
pub struct CsvSource {
    body: Vec<u8>,
    rule: CutoffRule,
    label: String,
}

impl CsvSource {
    pub fn new(body: impl Into<Vec<u8>>, rule: CutoffRule, label: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            rule,
            label: label.into(),
        }
    }

    /// Read the whole CSV body from `path`.
    pub fn from_path(path: &std::path::Path, rule: CutoffRule) -> std::io::Result<Self> {
        let body = std::fs::read(path)?;
        Ok(Self::new(body, rule, path.display().to_string()))
    }
}

impl RecordSource for CsvSource {
    /// Decodes the body and applies the bounds the registry query applies
    /// server-side: registered on or after 2014-01-01 and effective on or
    /// before `cutoff`.
    fn load(&self, cutoff: NaiveDate) -> Result<RecordTable, FetchError> {
        let raw = crate::fetcher::decode_csv(self.body.as_slice())?;
        let table = normalize(&raw, cutoff, self.rule);
        let start = registry_start();
        Ok(table.filtered(|r| {
            r.registered_on.is_some_and(|d| d >= start)
                && r.effective_date.is_some_and(|d| d <= cutoff)
        }))
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = "galioj_busena,tar_kodas,reg_data,isigalioja,isigalioja_sal,negalioja,negalioja_sal\n\
                        galioja,A,2020-01-10,2020-03-15,,,\n\
                        galioja,B,2022-02-01,2022-06-01,,,\n";

    #[test]
    fn test_csv_source_applies_cutoff() {
        let source = CsvSource::new(BODY, CutoffRule::Raw, "fixture");
        let cutoff = NaiveDate::from_ymd_opt(2021, 12, 31).unwrap();
        let table = source.load(cutoff).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.records()[0].code, "A");
        assert_eq!(table.cutoff, cutoff);
        assert_eq!(source.describe(), "fixture");
    }

    #[test]
    fn test_csv_source_drops_statutes_registered_before_2014() {
        let body = "galioj_busena,tar_kodas,reg_data,isigalioja,isigalioja_sal,negalioja,negalioja_sal\n\
                    galioja,OLD-REG,2012-05-01,2015-01-01,,,\n\
                    galioja,NEW-REG,2015-05-01,2016-02-01,,,\n\
                    galioja,NO-REG,,2016-03-01,,,\n";
        let source = CsvSource::new(body, CutoffRule::Raw, "fixture");
        let table = source.load(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()).unwrap();
        let codes: Vec<&str> = table.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["NEW-REG"]);
    }

    #[test]
    fn test_csv_source_propagates_decode_errors() {
        let source = CsvSource::new("a,b\n1,2\n", CutoffRule::Raw, "bad");
        let cutoff = NaiveDate::from_ymd_opt(2021, 12, 31).unwrap();
        assert!(matches!(source.load(cutoff), Err(FetchError::MissingColumn(_))));
    }
}
