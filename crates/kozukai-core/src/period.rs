//! Closing-month period keys
//!
//! A period key is the 6-digit `YYYYMM` string a sheet row is booked under.
//! It identifies the closing month, which can differ from the calendar month
//! of the purchase. Because the encoding is fixed-width and zero-padded,
//! lexicographic order on the string is chronological order.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::RangeError;
use crate::models::ExpenseRecord;

/// Width of a period key
pub const PERIOD_KEY_LEN: usize = 6;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PeriodKeyError {
    #[error("Period key must be at most 6 digits: {0:?}")]
    NotDigits(String),

    #[error("Period key has month outside 01-12: {0}")]
    InvalidMonth(String),
}

/// A validated `YYYYMM` closing-month key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PeriodKey(String);

impl PeriodKey {
    /// Parse a raw key, left-padding with zeros to 6 digits.
    ///
    /// `"202311"` and `" 202311 "` parse to the same key; `"12"` becomes
    /// `"000012"`. Anything that is not all ASCII digits, longer than 6
    /// digits, or whose month is outside `01..=12` is rejected.
    pub fn parse(raw: &str) -> Result<Self, PeriodKeyError> {
        let raw = raw.trim();
        if raw.is_empty() || raw.len() > PERIOD_KEY_LEN || !raw.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(PeriodKeyError::NotDigits(raw.to_string()));
        }

        let padded = format!("{:0>width$}", raw, width = PERIOD_KEY_LEN);
        let month: u32 = padded[4..].parse().unwrap_or(0);
        if !(1..=12).contains(&month) {
            return Err(PeriodKeyError::InvalidMonth(padded));
        }

        Ok(Self(padded))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The 4-digit year component
    pub fn year(&self) -> &str {
        &self.0[..4]
    }

    /// The 2-digit month component
    pub fn month(&self) -> &str {
        &self.0[4..]
    }

    /// Human-readable label, e.g. `2023年11月`
    pub fn display(&self) -> String {
        format!("{}年{}月", self.year(), self.month())
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PeriodKey {
    type Err = PeriodKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PeriodKey {
    type Error = PeriodKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PeriodKey> for String {
    fn from(key: PeriodKey) -> Self {
        key.0
    }
}

/// An inclusive range of period keys
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRange {
    pub start: PeriodKey,
    pub end: PeriodKey,
}

impl PeriodRange {
    pub fn contains(&self, key: &PeriodKey) -> bool {
        &self.start <= key && key <= &self.end
    }

    /// Label such as `2023年11月 ～ 2024年01月`
    pub fn display(&self) -> String {
        if self.start == self.end {
            self.start.display()
        } else {
            format!("{} ～ {}", self.start.display(), self.end.display())
        }
    }
}

/// Inclusive start/end indices into the sorted distinct period list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRange {
    pub start: usize,
    pub end: usize,
}

impl IndexRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Resolve to the period range it selects in `keys`
    pub fn resolve(&self, keys: &[PeriodKey]) -> Result<PeriodRange, RangeError> {
        let slice = range_by_index(keys, self.start, self.end)?;
        Ok(PeriodRange {
            start: slice[0].clone(),
            end: slice[slice.len() - 1].clone(),
        })
    }
}

/// Sorted distinct period keys present in `records`
pub fn distinct_periods<'a, I>(records: I) -> Vec<PeriodKey>
where
    I: IntoIterator<Item = &'a ExpenseRecord>,
{
    records
        .into_iter()
        .filter_map(|r| r.period.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Inclusive sub-slice of sorted `keys` between two indices
pub fn range_by_index(
    keys: &[PeriodKey],
    start: usize,
    end: usize,
) -> Result<&[PeriodKey], RangeError> {
    if start > end {
        return Err(match (keys.get(start), keys.get(end)) {
            (Some(s), Some(e)) => RangeError::inverted(s, e),
            _ => RangeError::inverted(start, end),
        });
    }
    if end >= keys.len() {
        return Err(RangeError::IndexOutOfRange {
            index: end,
            len: keys.len(),
        });
    }
    Ok(&keys[start..=end])
}

/// Keys of sorted `keys` falling between `start` and `end` inclusive
pub fn months_between(
    keys: &[PeriodKey],
    start: &PeriodKey,
    end: &PeriodKey,
) -> Result<Vec<PeriodKey>, RangeError> {
    if start > end {
        return Err(RangeError::inverted(start, end));
    }
    Ok(keys
        .iter()
        .filter(|k| *k >= start && *k <= end)
        .cloned()
        .collect())
}

/// Position of `key` in sorted `keys`
pub fn index_of(keys: &[PeriodKey], key: &PeriodKey) -> Result<usize, RangeError> {
    keys.binary_search(key)
        .map_err(|_| RangeError::UnknownPeriod(key.clone()))
}
