//! Period filters over a record collection
//!
//! Filters borrow the input and return a new list of references; the input
//! is never reordered or mutated. A filter whose parameters cannot be applied
//! (inverted range, out-of-range index, bad count) hands back the full,
//! unfiltered set together with the reason, so the caller can show the data
//! and ask for a correction.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::error::RangeError;
use crate::models::ExpenseRecord;
use crate::period::{distinct_periods, range_by_index, PeriodKey};

/// How to narrow a record collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeriodFilter {
    /// No filtering
    #[default]
    All,
    /// Records whose timestamp date is within `[start, end]`
    DateRange { start: NaiveDate, end: NaiveDate },
    /// Records whose period key is within the inclusive index range of the
    /// sorted distinct period keys
    PeriodRange { start: usize, end: usize },
    /// Records in the `n` most recent distinct periods
    LastPeriods(usize),
}

/// Outcome of applying a [`PeriodFilter`]
#[derive(Debug, Clone)]
pub struct Filtered<'a> {
    pub records: Vec<&'a ExpenseRecord>,
    /// Why the filter was not applied, if it was rejected
    pub rejected: Option<RangeError>,
}

impl<'a> Filtered<'a> {
    fn applied(records: Vec<&'a ExpenseRecord>) -> Self {
        Self {
            records,
            rejected: None,
        }
    }

    fn rejected(all: &'a [ExpenseRecord], reason: RangeError) -> Self {
        Self {
            records: all.iter().collect(),
            rejected: Some(reason),
        }
    }
}

impl PeriodFilter {
    pub fn apply<'a>(&self, records: &'a [ExpenseRecord]) -> Filtered<'a> {
        match *self {
            Self::All => Filtered::applied(records.iter().collect()),
            Self::DateRange { start, end } => {
                if start > end {
                    return Filtered::rejected(records, RangeError::inverted(start, end));
                }
                Filtered::applied(
                    records
                        .iter()
                        .filter(|r| r.date().is_some_and(|d| start <= d && d <= end))
                        .collect(),
                )
            }
            Self::PeriodRange { start, end } => {
                let keys = distinct_periods(records);
                match range_by_index(&keys, start, end) {
                    Ok(selected) => Filtered::applied(select_periods(records, selected)),
                    Err(reason) => Filtered::rejected(records, reason),
                }
            }
            Self::LastPeriods(n) => {
                let keys = distinct_periods(records);
                if n == 0 || n > keys.len() {
                    return Filtered::rejected(
                        records,
                        RangeError::InvalidCount {
                            requested: n,
                            available: keys.len(),
                        },
                    );
                }
                Filtered::applied(select_periods(records, &keys[keys.len() - n..]))
            }
        }
    }
}

/// Records whose period key is one of `periods`, in input order
fn select_periods<'a>(
    records: &'a [ExpenseRecord],
    periods: &[PeriodKey],
) -> Vec<&'a ExpenseRecord> {
    let wanted: HashSet<&PeriodKey> = periods.iter().collect();
    records
        .iter()
        .filter(|r| r.period.as_ref().is_some_and(|p| wanted.contains(p)))
        .collect()
}
