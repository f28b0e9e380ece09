//! Grouped sum / count / mean over expense records
//!
//! Records without a usable amount never contribute: they are not summed,
//! not counted and do not open a group.

use std::collections::HashMap;
use std::hash::Hash;

use crate::models::{AggregateRow, ExpenseRecord, Summary};

/// Round to 2 decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Group `records` by `key_fn` and compute total, count and mean per group.
///
/// Records for which `key_fn` returns `None` are skipped. Groups come out in
/// the order their key was first seen; sort afterwards as the view needs.
pub fn aggregate<'a, K, I, F>(records: I, mut key_fn: F) -> Vec<AggregateRow<K>>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = &'a ExpenseRecord>,
    F: FnMut(&ExpenseRecord) -> Option<K>,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, f64, usize)> = Vec::new();

    for record in records {
        let Some(amount) = record.amount else {
            continue;
        };
        let Some(key) = key_fn(record) else {
            continue;
        };

        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push((key, 0.0, 0));
            groups.len() - 1
        });
        let group = &mut groups[slot];
        group.1 += amount;
        group.2 += 1;
    }

    groups
        .into_iter()
        .map(|(key, total, count)| AggregateRow {
            key,
            total: round2(total),
            count,
            mean: round2(total / count as f64),
        })
        .collect()
}

/// Aggregate of the whole set (a single group with no key)
pub fn summarize<'a, I>(records: I) -> Summary
where
    I: IntoIterator<Item = &'a ExpenseRecord>,
{
    aggregate(records, |_| Some(()))
        .into_iter()
        .next()
        .map(|row| Summary {
            total: row.total,
            count: row.count,
            mean: row.mean,
        })
        .unwrap_or_default()
}

/// Sort rows by key ascending (time series)
pub fn sort_by_key<K: Ord>(rows: &mut [AggregateRow<K>]) {
    rows.sort_by(|a, b| a.key.cmp(&b.key));
}

/// Sort rows by total descending (rankings); ties keep their order
pub fn sort_by_total_desc<K>(rows: &mut [AggregateRow<K>]) {
    rows.sort_by(|a, b| {
        b.total
            .partial_cmp(&a.total)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}
