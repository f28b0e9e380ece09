//! Report handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{current_snapshot, AppError, AppState};
use kozukai_core::{
    category_report, compare, monthly_report, search_report, time_report, CategoryReport,
    CompareError, ComparisonResult, ExpenseRecord, IndexRange, MonthlyReport, PeriodFilter,
    SearchReport, TimeReport,
};

/// Filter query parameters shared by the filtered reports.
///
/// At most one filter may be given: a date pair, a period index pair or
/// `last`.
#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub period_start: Option<usize>,
    pub period_end: Option<usize>,
    pub last: Option<usize>,
}

impl FilterQuery {
    fn to_filter(&self) -> Result<PeriodFilter, AppError> {
        let dates = self.from_date.is_some() || self.to_date.is_some();
        let periods = self.period_start.is_some() || self.period_end.is_some();
        let last = self.last.is_some();
        if [dates, periods, last].iter().filter(|&&given| given).count() > 1 {
            return Err(AppError::bad_request(
                "Use only one of from_date/to_date, period_start/period_end or last",
            ));
        }

        if let Some(n) = self.last {
            return Ok(PeriodFilter::LastPeriods(n));
        }

        if dates {
            let (Some(from), Some(to)) = (&self.from_date, &self.to_date) else {
                return Err(AppError::bad_request("from_date and to_date must be given together"));
            };
            let start = parse_date(from)
                .ok_or_else(|| AppError::bad_request("Invalid from_date format (use YYYY-MM-DD)"))?;
            let end = parse_date(to)
                .ok_or_else(|| AppError::bad_request("Invalid to_date format (use YYYY-MM-DD)"))?;
            return Ok(PeriodFilter::DateRange { start, end });
        }

        if periods {
            let (Some(start), Some(end)) = (self.period_start, self.period_end) else {
                return Err(AppError::bad_request(
                    "period_start and period_end must be given together",
                ));
            };
            return Ok(PeriodFilter::PeriodRange { start, end });
        }

        Ok(PeriodFilter::All)
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// A report built from filtered data.
///
/// `warning` is set when the filter could not be applied; the report then
/// covers all data.
#[derive(Debug, Serialize)]
pub struct FilteredReport<T> {
    pub warning: Option<String>,
    pub report: T,
}

/// Apply the query's filter and build a report from the result
fn filtered<T>(
    records: &[ExpenseRecord],
    query: &FilterQuery,
    build: impl FnOnce(&[&ExpenseRecord]) -> T,
) -> Result<FilteredReport<T>, AppError> {
    let filter = query.to_filter()?;
    let filtered = filter.apply(records);
    let warning = filtered.rejected.map(|reason| {
        warn!(?filter, %reason, "Filter rejected, reporting all data");
        format!("{} (showing all data)", reason)
    });
    debug!(records = filtered.records.len(), "Filter applied");
    Ok(FilteredReport {
        warning,
        report: build(&filtered.records),
    })
}

/// GET /api/reports/monthly - Spending per closing month
pub async fn report_monthly(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FilterQuery>,
) -> Result<Json<FilteredReport<MonthlyReport>>, AppError> {
    let snapshot = current_snapshot(&state).await?;
    Ok(Json(filtered(&snapshot.records, &query, monthly_report)?))
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

/// GET /api/reports/categories - Spending per category, largest first
pub async fn report_categories(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FilterQuery>,
    Query(params): Query<LimitQuery>,
) -> Result<Json<FilteredReport<CategoryReport>>, AppError> {
    let snapshot = current_snapshot(&state).await?;
    let mut response = filtered(&snapshot.records, &query, category_report)?;
    if let Some(limit) = params.limit {
        response.report.rows.truncate(limit);
    }
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// GET /api/reports/search?q= - Records whose category contains a term
pub async fn report_search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FilterQuery>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<FilteredReport<SearchReport>>, AppError> {
    let term = params.q.as_deref().map(str::trim).unwrap_or_default();
    if term.is_empty() {
        return Err(AppError::bad_request("Missing search term (q)"));
    }

    let snapshot = current_snapshot(&state).await?;
    Ok(Json(filtered(&snapshot.records, &query, |records| {
        search_report(records, term)
    })?))
}

/// GET /api/reports/trends - Daily and weekday spending
pub async fn report_trends(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FilterQuery>,
) -> Result<Json<FilteredReport<TimeReport>>, AppError> {
    let snapshot = current_snapshot(&state).await?;
    Ok(Json(filtered(&snapshot.records, &query, time_report)?))
}

/// Two inclusive period index ranges
#[derive(Debug, Deserialize)]
pub struct CompareQuery {
    pub a_start: usize,
    pub a_end: usize,
    pub b_start: usize,
    pub b_end: usize,
}

/// GET /api/reports/compare - Compare two period ranges (B relative to A)
pub async fn report_compare(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CompareQuery>,
) -> Result<Json<ComparisonResult>, AppError> {
    let snapshot = current_snapshot(&state).await?;
    let a = IndexRange::new(query.a_start, query.a_end);
    let b = IndexRange::new(query.b_start, query.b_end);

    match compare(&snapshot.records, a, b) {
        Ok(result) => Ok(Json(result)),
        Err(e @ CompareError::InsufficientData { .. }) => {
            Err(AppError::unprocessable(&e.to_string()))
        }
        Err(CompareError::Range(reason)) => Err(AppError::bad_request(&reason.to_string())),
    }
}
