//! Report builders
//!
//! Each report is a pure function over an already filtered record view.
//! Presenters (CLI, HTTP) only format what comes back.

use chrono::{Datelike, Weekday};

use crate::aggregate::{aggregate, round2, sort_by_key, sort_by_total_desc, summarize};
use crate::models::{
    CategoryReport, DailyPoint, DataOverview, ExpenseRecord, MonthlyReport, MonthlyRow,
    MonthlyStats, PeriodPoint, SearchReport, TimeReport, WeekdayPoint,
};
use crate::period::{distinct_periods, PeriodKey, PeriodRange};
use crate::search::search;

/// Whole-data summary: record count, total, timestamp span, period span
pub fn overview(records: &[ExpenseRecord]) -> DataOverview {
    let summary = summarize(records);
    let keys = distinct_periods(records);
    let periods = match (keys.first(), keys.last()) {
        (Some(start), Some(end)) => Some(PeriodRange {
            start: start.clone(),
            end: end.clone(),
        }),
        _ => None,
    };

    DataOverview {
        record_count: records.len(),
        total_amount: summary.total,
        first_timestamp: records.iter().filter_map(|r| r.timestamp).min(),
        last_timestamp: records.iter().filter_map(|r| r.timestamp).max(),
        periods,
        period_count: keys.len(),
    }
}

/// Spending per closing month, oldest first
pub fn monthly_report(records: &[&ExpenseRecord]) -> MonthlyReport {
    let mut groups = aggregate(records.iter().copied(), |r| r.period.clone());
    sort_by_key(&mut groups);

    let rows: Vec<MonthlyRow> = groups
        .into_iter()
        .map(|g| MonthlyRow {
            label: g.key.display(),
            period: g.key,
            total: g.total,
            count: g.count,
            mean: g.mean,
        })
        .collect();

    let stats = monthly_stats(&rows);
    MonthlyReport { rows, stats }
}

fn monthly_stats(rows: &[MonthlyRow]) -> MonthlyStats {
    if rows.is_empty() {
        return MonthlyStats::default();
    }
    let totals = rows.iter().map(|r| r.total);
    MonthlyStats {
        months: rows.len(),
        mean_total: round2(totals.clone().sum::<f64>() / rows.len() as f64),
        max_total: totals.clone().fold(f64::MIN, f64::max),
        min_total: totals.fold(f64::MAX, f64::min),
    }
}

/// Spending per category, largest total first
pub fn category_report(records: &[&ExpenseRecord]) -> CategoryReport {
    let mut rows = aggregate(records.iter().copied(), |r| Some(r.category.clone()));
    sort_by_total_desc(&mut rows);
    CategoryReport { rows }
}

/// Search categories for `term` and summarize the matches
pub fn search_report(records: &[&ExpenseRecord], term: &str) -> SearchReport {
    let found = search(records.iter().copied(), term);
    let summary = summarize(found.iter().copied());

    let mut records: Vec<ExpenseRecord> = found.iter().map(|r| (*r).clone()).collect();
    // Newest first; records without a timestamp go last
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    SearchReport {
        term: term.to_string(),
        match_count: found.len(),
        total: summary.total,
        mean: summary.mean,
        monthly: period_points(&found),
        records,
    }
}

fn period_points(records: &[&ExpenseRecord]) -> Vec<PeriodPoint> {
    let mut groups = aggregate(records.iter().copied(), |r| r.period.clone());
    sort_by_key(&mut groups);
    groups
        .into_iter()
        .map(|g| point(g.key, g.total))
        .collect()
}

fn point(period: PeriodKey, amount: f64) -> PeriodPoint {
    PeriodPoint {
        label: period.display(),
        period,
        amount,
    }
}

/// Daily totals (ascending) and weekday totals (Monday first)
pub fn time_report(records: &[&ExpenseRecord]) -> TimeReport {
    let mut days = aggregate(records.iter().copied(), ExpenseRecord::date);
    sort_by_key(&mut days);
    let daily = days
        .into_iter()
        .map(|g| DailyPoint {
            date: g.key,
            amount: g.total,
        })
        .collect();

    let mut weekdays = aggregate(records.iter().copied(), |r| r.date().map(|d| d.weekday()));
    weekdays.sort_by_key(|g| g.key.num_days_from_monday());
    let weekdays = weekdays
        .into_iter()
        .map(|g| WeekdayPoint {
            weekday: weekday_name(g.key).to_string(),
            amount: g.total,
        })
        .collect();

    TimeReport { daily, weekdays }
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
