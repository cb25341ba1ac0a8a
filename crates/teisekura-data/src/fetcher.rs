//! Registry fetcher: query building, HTTP retrieval and CSV decoding.
//!
//! Query building and decoding are pure functions so they can be tested
//! without a network. [`RegistryClient`] glues them to a blocking HTTP GET.

use std::io::Read;
use std::time::Duration;

use chrono::NaiveDate;
use teisekura_core::models::RawRecord;
use teisekura_core::time_utils::registry_start;
use thiserror::Error;
use tracing::{debug, info};

/// Registering institution every fetched statute must have.
pub const INSTITUTION: &str = "Lietuvos Respublikos Seimas";

/// Document category of a statute.
pub const CATEGORY: &str = "Įstatymas";

// Registry column names.
pub const COL_STATUS: &str = "galioj_busena";
pub const COL_CODE: &str = "tar_kodas";
pub const COL_REGISTERED: &str = "reg_data";
pub const COL_EFFECTIVE: &str = "isigalioja";
pub const COL_EFFECTIVE_CONDITIONAL: &str = "isigalioja_sal";
pub const COL_REPEALED: &str = "negalioja";
pub const COL_REPEALED_CONDITIONAL: &str = "negalioja_sal";

/// The seven columns selected from the registry, in query order.
pub const SELECTED_COLUMNS: [&str; 7] = [
    COL_STATUS,
    COL_CODE,
    COL_REGISTERED,
    COL_EFFECTIVE,
    COL_EFFECTIVE_CONDITIONAL,
    COL_REPEALED,
    COL_REPEALED_CONDITIONAL,
];

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const USER_AGENT: &str = concat!("teisekura/", env!("CARGO_PKG_VERSION"));

// ── Errors ────────────────────────────────────────────────────────────────────

/// Failure to obtain the registry dataset.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Registry responded with HTTP {status}: {body}")]
    Server { status: u16, body: String },

    #[error("Malformed CSV response: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed CSV response: missing column `{0}`")]
    MissingColumn(String),
}

// ── Query ─────────────────────────────────────────────────────────────────────

/// Build the registry query URL for statutes effective on or before `cutoff`.
///
/// ```
/// use chrono::NaiveDate;
/// use teisekura_data::fetcher::build_query_url;
///
/// let url = build_query_url("https://host/csv/", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
/// assert!(url.starts_with("https://host/csv?"));
/// assert!(url.contains("isigalioja<=\"2024-01-01\""));
/// ```
pub fn build_query_url(base_url: &str, cutoff: NaiveDate) -> String {
    let base = base_url.trim().trim_end_matches('/');
    format!(
        "{base}?priemusi_inst=\"{inst}\"&reg_data>=\"{start}\"&isigalioja<=\"{cutoff}\"&rusis=\"{category}\"&select({columns})",
        inst = urlencoding::encode(INSTITUTION),
        start = registry_start().format("%Y-%m-%d"),
        cutoff = cutoff.format("%Y-%m-%d"),
        category = urlencoding::encode(CATEGORY),
        columns = SELECTED_COLUMNS.join(","),
    )
}

// ── Decoding ──────────────────────────────────────────────────────────────────

/// Header positions of the selected columns.
struct ColumnIndex {
    status: usize,
    code: usize,
    registered_on: usize,
    effective: usize,
    effective_conditional: usize,
    repealed: usize,
    repealed_conditional: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &csv::ByteRecord) -> Result<Self, FetchError> {
        let names: Vec<String> = headers.iter().map(lossy_cell).collect();
        let find = |name: &str| {
            names
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}') == name)
                .ok_or_else(|| FetchError::MissingColumn(name.to_string()))
        };
        Ok(Self {
            status: find(COL_STATUS)?,
            code: find(COL_CODE)?,
            registered_on: find(COL_REGISTERED)?,
            effective: find(COL_EFFECTIVE)?,
            effective_conditional: find(COL_EFFECTIVE_CONDITIONAL)?,
            repealed: find(COL_REPEALED)?,
            repealed_conditional: find(COL_REPEALED_CONDITIONAL)?,
        })
    }

    fn map(&self, row: &csv::ByteRecord) -> RawRecord {
        let cell = |i: usize| row.get(i).map(lossy_cell).filter(|v| !v.is_empty());
        RawRecord {
            status: cell(self.status),
            code: cell(self.code),
            registered_on: cell(self.registered_on),
            effective: cell(self.effective),
            effective_conditional: cell(self.effective_conditional),
            repealed: cell(self.repealed),
            repealed_conditional: cell(self.repealed_conditional),
        }
    }
}

/// Trimmed cell text; invalid UTF-8 is replaced rather than rejected, so a
/// damaged date cell later reads as missing.
fn lossy_cell(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim().to_string()
}

/// Decode a registry CSV body.
///
/// Columns are located by header name, so their order is free and extra
/// columns are ignored. Empty cells become `None`. Cells that are not valid
/// UTF-8 are decoded lossily instead of failing the whole body.
pub fn decode_csv<R: Read>(reader: R) -> Result<Vec<RawRecord>, FetchError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let index = ColumnIndex::from_headers(rdr.byte_headers()?)?;

    let mut records = Vec::new();
    for row in rdr.byte_records() {
        records.push(index.map(&row?));
    }

    debug!(rows = records.len(), "decoded registry CSV");
    Ok(records)
}

// ── Client ────────────────────────────────────────────────────────────────────

/// Blocking HTTP client for the registry CSV endpoint.
pub struct RegistryClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl RegistryClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch every in-scope statute effective on or before `cutoff`.
    pub fn fetch(&self, cutoff: NaiveDate) -> Result<Vec<RawRecord>, FetchError> {
        let url = build_query_url(&self.base_url, cutoff);
        info!(%cutoff, "fetching statutes from registry");
        debug!(%url, "registry query");

        let response = self.client.get(&url).send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(FetchError::Server {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let body = response.bytes()?;
        let records = decode_csv(body.as_ref())?;
        info!(rows = records.len(), "registry fetch complete");
        Ok(records)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const HEADER: &str =
        "galioj_busena,tar_kodas,reg_data,isigalioja,isigalioja_sal,negalioja,negalioja_sal";

    // ── build_query_url ───────────────────────────────────────────────────────

    #[test]
    fn test_query_url_is_deterministic() {
        let a = build_query_url("https://example.test/csv", ymd(2024, 5, 1));
        let b = build_query_url("https://example.test/csv", ymd(2024, 5, 1));
        assert_eq!(a, b);
    }

    #[test]
    fn test_query_url_escapes_institution_and_category() {
        let url = build_query_url("https://example.test/csv", ymd(2024, 5, 1));
        assert!(url.contains("priemusi_inst=\"Lietuvos%20Respublikos%20Seimas\""));
        assert!(url.contains("rusis=\"%C4%AEstatymas\""));
        assert!(!url.contains(' '));
    }

    #[test]
    fn test_query_url_bounds_and_selection() {
        let url = build_query_url("https://example.test/csv", ymd(2023, 12, 31));
        assert!(url.contains("reg_data>=\"2014-01-01\""));
        assert!(url.contains("isigalioja<=\"2023-12-31\""));
        assert!(url.ends_with(
            "&select(galioj_busena,tar_kodas,reg_data,isigalioja,isigalioja_sal,negalioja,negalioja_sal)"
        ));
    }

    #[test]
    fn test_query_url_trims_trailing_slash() {
        let url = build_query_url("https://example.test/csv//", ymd(2024, 1, 1));
        assert!(url.starts_with("https://example.test/csv?"));
    }

    // ── decode_csv ────────────────────────────────────────────────────────────

    #[test]
    fn test_decode_basic_row() {
        let body = format!("{HEADER}\ngalioja,TAR-1,2019-12-20,2020-03-15,,,\n");
        let rows = decode_csv(body.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status.as_deref(), Some("galioja"));
        assert_eq!(rows[0].code.as_deref(), Some("TAR-1"));
        assert_eq!(rows[0].effective.as_deref(), Some("2020-03-15"));
        assert!(rows[0].effective_conditional.is_none());
        assert!(rows[0].repealed.is_none());
    }

    #[test]
    fn test_decode_tolerates_reordered_and_extra_columns() {
        let body = "negalioja_sal,extra,negalioja,isigalioja_sal,isigalioja,reg_data,tar_kodas,galioj_busena\n\
                    ,x,2021-01-10,,2020-07-01,2020-06-01,TAR-2,negalioja\n";
        let rows = decode_csv(body.as_bytes()).unwrap();
        assert_eq!(rows[0].code.as_deref(), Some("TAR-2"));
        assert_eq!(rows[0].status.as_deref(), Some("negalioja"));
        assert_eq!(rows[0].repealed.as_deref(), Some("2021-01-10"));
        assert_eq!(rows[0].registered_on.as_deref(), Some("2020-06-01"));
    }

    #[test]
    fn test_decode_quoted_cells_and_whitespace() {
        let body = format!("{HEADER}\n\"galioja\",\" TAR-3 \",\"\",\"\",\"2020-01-01\",\"\",\"\"\n");
        let rows = decode_csv(body.as_bytes()).unwrap();
        assert_eq!(rows[0].code.as_deref(), Some("TAR-3"));
        assert!(rows[0].registered_on.is_none());
        assert!(rows[0].effective.is_none());
        assert_eq!(rows[0].effective_conditional.as_deref(), Some("2020-01-01"));
    }

    #[test]
    fn test_decode_header_only_is_empty() {
        let rows = decode_csv(format!("{HEADER}\n").as_bytes()).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_decode_missing_column_is_error() {
        let body = "galioj_busena,tar_kodas,reg_data,isigalioja\ngalioja,TAR-1,,2020-01-01\n";
        let err = decode_csv(body.as_bytes()).unwrap_err();
        match err {
            FetchError::MissingColumn(name) => assert_eq!(name, "isigalioja_sal"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_decode_strips_byte_order_mark() {
        let body = format!("\u{feff}{HEADER}\ngalioja,TAR-1,,2020-01-01,,,\n");
        let rows = decode_csv(body.as_bytes()).unwrap();
        assert_eq!(rows[0].status.as_deref(), Some("galioja"));
    }

    #[test]
    fn test_decode_invalid_utf8_cell_degrades() {
        let mut body = format!("{HEADER}\ngalioja,TAR-1,2019-12-20,").into_bytes();
        body.extend_from_slice(b"2020-\xff3-15");
        body.extend_from_slice(b",,,\ngalioja,TAR-2,2019-12-20,2020-04-01,,,\n");

        let rows = decode_csv(body.as_slice()).unwrap();
        assert_eq!(rows.len(), 2);
        let damaged = rows[0].effective.as_deref().unwrap();
        assert!(damaged.contains('\u{fffd}'));
        assert_eq!(crate::normalizer::coalesce_date(rows[0].effective.as_deref(), None), None);
        assert_eq!(rows[1].effective.as_deref(), Some("2020-04-01"));
    }

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError::Server {
            status: 503,
            body: "unavailable".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Registry responded with HTTP 503: unavailable"
        );
    }

    #[test]
    fn test_client_keeps_base_url() {
        let client = RegistryClient::new("https://example.test/csv").unwrap();
        assert_eq!(client.base_url(), "https://example.test/csv");
    }
}
