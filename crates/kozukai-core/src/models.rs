//! Domain models for kozukai

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::period::{PeriodKey, PeriodRange};

// ========== Source Models ==========

/// Minimum number of columns a sheet must have:
/// category, amount, timestamp, period key
pub const MIN_COLUMNS: usize = 4;

/// One sheet row as fetched, cells in column order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow(pub Vec<String>);

impl RawRow {
    pub fn new<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(cells.into_iter().map(Into::into).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }
}

/// A fetched sheet: header row plus data rows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ========== Record Models ==========

/// A normalized expense row
///
/// `amount`, `timestamp` and `period` are `None` when the source cell could
/// not be coerced. Such records stay visible to category search but are left
/// out of monetary aggregates, date filters and monthly buckets respectively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub category: String,
    pub amount: Option<f64>,
    pub timestamp: Option<NaiveDateTime>,
    pub period: Option<PeriodKey>,
}

impl ExpenseRecord {
    /// Calendar date of the timestamp (time of day dropped)
    pub fn date(&self) -> Option<NaiveDate> {
        self.timestamp.map(|ts| ts.date())
    }

    /// Display label of the closing month, if the record has one
    pub fn period_label(&self) -> Option<String> {
        self.period.as_ref().map(PeriodKey::display)
    }
}

// ========== Aggregate Models ==========

/// One group of a grouped summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow<K> {
    pub key: K,
    pub total: f64,
    pub count: usize,
    pub mean: f64,
}

/// Whole-set aggregate
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total: f64,
    pub count: usize,
    pub mean: f64,
}

// ========== Report Models ==========

/// Data overview (dashboard sidebar)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataOverview {
    pub record_count: usize,
    pub total_amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_timestamp: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_timestamp: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub periods: Option<PeriodRange>,
    pub period_count: usize,
}

/// One closing month in the monthly report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRow {
    pub period: PeriodKey,
    pub label: String,
    pub total: f64,
    pub count: usize,
    pub mean: f64,
}

/// Statistics across monthly totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyStats {
    pub months: usize,
    pub mean_total: f64,
    pub max_total: f64,
    pub min_total: f64,
}

/// Spending per closing month, ascending by period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReport {
    pub rows: Vec<MonthlyRow>,
    pub stats: MonthlyStats,
}

/// Spending per category, ranked by total (largest first)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryReport {
    pub rows: Vec<AggregateRow<String>>,
}

impl CategoryReport {
    /// The `n` largest categories
    pub fn top(&self, n: usize) -> &[AggregateRow<String>] {
        &self.rows[..n.min(self.rows.len())]
    }
}

/// A total for one closing month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodPoint {
    pub period: PeriodKey,
    pub label: String,
    pub amount: f64,
}

/// Result of searching categories for a term
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchReport {
    pub term: String,
    /// Every matching record, including those without a usable amount
    pub match_count: usize,
    pub total: f64,
    pub mean: f64,
    pub monthly: Vec<PeriodPoint>,
    /// Matching records, newest first
    pub records: Vec<ExpenseRecord>,
}

/// Total spending on one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub amount: f64,
}

/// Total spending on one day of the week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayPoint {
    /// English weekday name, e.g. `Monday`
    pub weekday: String,
    pub amount: f64,
}

/// Day and weekday trends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeReport {
    pub daily: Vec<DailyPoint>,
    pub weekdays: Vec<WeekdayPoint>,
}

// ========== Comparison Models ==========

/// Per-category change between two period ranges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDelta {
    pub category: String,
    pub total_a: f64,
    pub total_b: f64,
    /// `total_b - total_a`
    pub delta: f64,
    pub change_pct: f64,
}

/// Comparison of two period ranges over the same records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub range_a: PeriodRange,
    pub range_b: PeriodRange,
    pub a: Summary,
    pub b: Summary,
    pub total_delta: f64,
    pub total_change_pct: f64,
    pub mean_delta: f64,
    pub mean_change_pct: f64,
    pub count_delta: i64,
    pub count_change_pct: f64,
    /// Categories in both ranges' top lists, largest absolute change first
    pub categories: Vec<CategoryDelta>,
}
