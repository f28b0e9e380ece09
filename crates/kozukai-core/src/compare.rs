//! Comparison of two closing-month ranges
//!
//! Both sides are cut from the same unfiltered record collection using
//! index ranges into its sorted distinct period keys.

use std::collections::HashMap;

use crate::aggregate::{aggregate, round2, sort_by_total_desc, summarize};
use crate::error::{CompareError, RangeError};
use crate::filter::PeriodFilter;
use crate::models::{AggregateRow, CategoryDelta, ComparisonResult, ExpenseRecord};
use crate::period::{distinct_periods, IndexRange};

/// Number of top categories taken from each side before intersecting
pub const TOP_CATEGORIES: usize = 10;

/// Percentage change from `base` to `value`.
///
/// Defined as `0` when `base` is `0`, whatever `value` is, so no infinite or
/// NaN percentage ever reaches a presenter. Every percentage in a comparison
/// goes through here.
pub fn percent_change(base: f64, value: f64) -> f64 {
    if base == 0.0 {
        0.0
    } else {
        round2((value - base) / base * 100.0)
    }
}

/// Compare range `a` with range `b`; deltas are `b - a`.
pub fn compare(
    records: &[ExpenseRecord],
    a: IndexRange,
    b: IndexRange,
) -> Result<ComparisonResult, CompareError> {
    let keys = distinct_periods(records);
    if keys.len() < 2 {
        return Err(CompareError::InsufficientData { found: keys.len() });
    }

    let range_a = a.resolve(&keys)?;
    let range_b = b.resolve(&keys)?;

    let records_a = select(records, a)?;
    let records_b = select(records, b)?;

    let summary_a = summarize(records_a.iter().copied());
    let summary_b = summarize(records_b.iter().copied());

    let top_a = top_categories(&records_a);
    let top_b: HashMap<String, f64> = top_categories(&records_b)
        .into_iter()
        .map(|row| (row.key, row.total))
        .collect();

    let mut categories: Vec<CategoryDelta> = top_a
        .into_iter()
        .filter_map(|row| {
            let total_b = *top_b.get(&row.key)?;
            Some(CategoryDelta {
                delta: round2(total_b - row.total),
                change_pct: percent_change(row.total, total_b),
                category: row.key,
                total_a: row.total,
                total_b,
            })
        })
        .collect();
    categories.sort_by(|x, y| {
        y.delta
            .abs()
            .partial_cmp(&x.delta.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(ComparisonResult {
        range_a,
        range_b,
        total_delta: round2(summary_b.total - summary_a.total),
        total_change_pct: percent_change(summary_a.total, summary_b.total),
        mean_delta: round2(summary_b.mean - summary_a.mean),
        mean_change_pct: percent_change(summary_a.mean, summary_b.mean),
        count_delta: summary_b.count as i64 - summary_a.count as i64,
        count_change_pct: percent_change(summary_a.count as f64, summary_b.count as f64),
        a: summary_a,
        b: summary_b,
        categories,
    })
}

fn select(records: &[ExpenseRecord], range: IndexRange) -> Result<Vec<&ExpenseRecord>, RangeError> {
    let filtered = PeriodFilter::PeriodRange {
        start: range.start,
        end: range.end,
    }
    .apply(records);
    match filtered.rejected {
        Some(reason) => Err(reason),
        None => Ok(filtered.records),
    }
}

fn top_categories(records: &[&ExpenseRecord]) -> Vec<AggregateRow<String>> {
    let mut rows = aggregate(records.iter().copied(), |r| Some(r.category.clone()));
    sort_by_total_desc(&mut rows);
    rows.truncate(TOP_CATEGORIES);
    rows
}
