//! Error types for kozukai

use thiserror::Error;

use crate::period::PeriodKey;

#[derive(Error, Debug)]
pub enum Error {
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Data source error: {0}")]
    Source(String),

    /// The fetched sheet does not have the fixed column layout
    #[error("Unusable sheet: {columns} column(s) found, at least {required} required")]
    Structural { columns: usize, required: usize },

    #[error(transparent)]
    Range(#[from] RangeError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A user-supplied range that cannot be applied.
///
/// Filters and the comparator never fail hard on these; callers surface
/// them as correctable input errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    #[error("Start {start} is after end {end}")]
    Inverted { start: String, end: String },

    #[error("Index {index} is out of range ({len} period(s) available)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Cannot select {requested} period(s): {available} available")]
    InvalidCount { requested: usize, available: usize },

    #[error("Period {0} is not present in the data")]
    UnknownPeriod(PeriodKey),
}

impl RangeError {
    pub(crate) fn inverted(start: impl ToString, end: impl ToString) -> Self {
        Self::Inverted {
            start: start.to_string(),
            end: end.to_string(),
        }
    }
}

/// Reasons a period comparison cannot be produced
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompareError {
    #[error("Not enough data to compare: {found} distinct period(s), at least 2 required")]
    InsufficientData { found: usize },

    #[error(transparent)]
    Range(#[from] RangeError),
}
