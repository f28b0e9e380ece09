//! Kozukai Core Library
//!
//! Shared functionality for the kozukai pocket-money expense reports:
//! - Normalization of fetched sheet rows into typed expense records
//! - Closing-month period keys and index-based period ranges
//! - Grouped sum / count / mean aggregation
//! - Date, period-range and last-N-period filters, category search
//! - Comparison of two period ranges
//! - Report builders for the monthly, category, search and trend views
//! - Pluggable data sources (CSV export, hosted sheet, in-memory)
//! - Time-bounded snapshot cache and configuration

pub mod aggregate;
pub mod cache;
pub mod compare;
pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod normalize;
pub mod period;
pub mod reports;
pub mod search;
pub mod source;

pub use aggregate::{aggregate, round2, summarize};
pub use cache::{Snapshot, SnapshotCache};
pub use compare::{compare, percent_change, TOP_CATEGORIES};
pub use config::{Config, SourceConfig};
pub use error::{CompareError, Error, RangeError, Result};
pub use filter::{Filtered, PeriodFilter};
pub use models::{
    AggregateRow, CategoryDelta, CategoryReport, ComparisonResult, DailyPoint, DataOverview,
    ExpenseRecord, MonthlyReport, MonthlyRow, MonthlyStats, PeriodPoint, RawRow, RawTable,
    SearchReport, Summary, TimeReport, WeekdayPoint,
};
pub use normalize::normalize_table;
pub use period::{distinct_periods, IndexRange, PeriodKey, PeriodRange};
pub use reports::{category_report, monthly_report, overview, search_report, time_report};
pub use search::search;
pub use source::{load_records, CsvFileSource, DataSource, MemorySource, SheetSource};
