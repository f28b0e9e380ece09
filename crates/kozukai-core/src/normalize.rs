//! Normalization of fetched sheet rows into expense records
//!
//! Column layout is positional: category, amount, timestamp, period key.
//! Individual cells that fail to coerce become `None` on the record; only a
//! structurally unusable sheet (fewer than 4 columns anywhere) is an error,
//! and then the whole batch is rejected.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{ExpenseRecord, RawRow, RawTable, MIN_COLUMNS};
use crate::period::PeriodKey;

const CATEGORY_COL: usize = 0;
const AMOUNT_COL: usize = 1;
const TIMESTAMP_COL: usize = 2;
const PERIOD_COL: usize = 3;

/// Accepted date-time layouts, tried in order
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M",
];

/// Accepted date-only layouts (midnight is assumed)
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Normalize a fetched sheet.
///
/// Fails with [`Error::Structural`] if the header or any row has fewer than
/// [`MIN_COLUMNS`] cells. Otherwise every row yields exactly one record.
pub fn normalize_table(table: &RawTable) -> Result<Vec<ExpenseRecord>> {
    if table.headers.len() < MIN_COLUMNS {
        return Err(Error::Structural {
            columns: table.headers.len(),
            required: MIN_COLUMNS,
        });
    }

    if let Some(short) = table.rows.iter().find(|r| r.len() < MIN_COLUMNS) {
        return Err(Error::Structural {
            columns: short.len(),
            required: MIN_COLUMNS,
        });
    }

    let records: Vec<ExpenseRecord> = table.rows.iter().map(normalize_row).collect();

    let missing_amount = records.iter().filter(|r| r.amount.is_none()).count();
    let missing_timestamp = records.iter().filter(|r| r.timestamp.is_none()).count();
    let missing_period = records.iter().filter(|r| r.period.is_none()).count();
    debug!(
        rows = records.len(),
        missing_amount, missing_timestamp, missing_period, "Normalized sheet rows"
    );

    Ok(records)
}

/// Normalize a single row. Never fails; missing cells read as empty.
pub fn normalize_row(row: &RawRow) -> ExpenseRecord {
    let cell = |i: usize| row.get(i).unwrap_or("");

    let period = match parse_period(cell(PERIOD_COL)) {
        Some(key) => Some(key),
        None => {
            warn!(
                raw = cell(PERIOD_COL),
                "Unusable period key, record left out of monthly buckets"
            );
            None
        }
    };

    ExpenseRecord {
        category: cell(CATEGORY_COL).trim().to_string(),
        amount: parse_amount(cell(AMOUNT_COL)),
        timestamp: parse_timestamp(cell(TIMESTAMP_COL)),
        period,
    }
}

/// Parse an amount cell such as `1000`, `"1,200"`, `¥350` or `-20.5`
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '¥' | '￥' | '$' | ' '))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse an ISO-like timestamp cell
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Parse a period-key cell.
///
/// Sheets hand numbers back as text, sometimes with a spreadsheet float
/// suffix (`202311.0`); an all-zero fraction is dropped before padding.
pub fn parse_period(raw: &str) -> Option<PeriodKey> {
    let raw = raw.trim();
    let digits = match raw.split_once('.') {
        Some((int, frac)) if frac.chars().all(|c| c == '0') => int,
        Some(_) => return None,
        None => raw,
    };
    PeriodKey::parse(digits).ok()
}
