//! Integration tests for kozukai-core
//!
//! These tests exercise the full fetch → normalize → filter → report workflow
//! against a CSV export on disk.

use std::io::Write;
use std::time::Duration;

use chrono::{NaiveDate, TimeZone, Utc};
use kozukai_core::{
    category_report, compare, load_records, monthly_report, overview, search_report,
    time_report, CompareError, Config, CsvFileSource, IndexRange, PeriodFilter, RangeError,
    SnapshotCache, SourceConfig,
};
use tempfile::NamedTempFile;

/// Three closing months of pocket-money spending.
/// One row has an unreadable amount, one a month outside 01-12.
fn kozukai_csv() -> &'static str {
    r#"項目,金額,日時,年月
昼食,800,2023-11-02 12:10:00,202311
コーヒー,450,2023-11-03 08:30:00,202311
書籍,"1,980",2023-11-15 19:00:00,202311
昼食,950,2023-11-28 12:05:00,202312
コーヒー,¥500,2023-12-01 08:25:00,202312
電車,???,2023-12-04 07:50:00,202312
昼食,700,2024-01-05 12:00:00,202401
コーヒー,480,2024-01-06 09:00:00,202401
書籍,1200,2024-01-20 20:15:00,202401
ゲーム,3000,2024-01-21 21:00:00,202413"#
}

fn write_csv(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write CSV");
    file
}

// =============================================================================
// Source → Records
// =============================================================================

#[test]
fn test_csv_to_records() {
    let file = write_csv(kozukai_csv());
    let records = load_records(&CsvFileSource::new(file.path()));

    assert_eq!(records.len(), 10);
    // Unreadable amount: kept, but without an amount
    assert_eq!(records[5].category, "電車");
    assert_eq!(records[5].amount, None);
    // Bad month: kept, but without a period
    assert_eq!(records[9].period, None);
    assert_eq!(records[9].amount, Some(3000.0));
}

#[test]
fn test_missing_file_yields_no_data() {
    let records = load_records(&CsvFileSource::new("/nonexistent/kozukai.csv"));
    assert!(records.is_empty());
}

#[test]
fn test_three_column_export_yields_no_data() {
    let file = write_csv("項目,金額,日時\n昼食,800,2023-11-02\n");
    assert!(load_records(&CsvFileSource::new(file.path())).is_empty());
}

// =============================================================================
// Reports
// =============================================================================

#[test]
fn test_overview_and_monthly_workflow() {
    let file = write_csv(kozukai_csv());
    let records = load_records(&CsvFileSource::new(file.path()));

    let o = overview(&records);
    assert_eq!(o.record_count, 10);
    assert_eq!(o.period_count, 3);
    assert_eq!(o.total_amount, 10060.0);

    let all = PeriodFilter::All.apply(&records).records;
    let monthly = monthly_report(&all);
    let labels: Vec<_> = monthly.rows.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, vec!["2023年11月", "2023年12月", "2024年01月"]);
    assert_eq!(monthly.rows[0].total, 3230.0);
    // The unreadable amount does not count toward December
    assert_eq!(monthly.rows[1].count, 2);
    assert_eq!(monthly.rows[1].total, 1450.0);
    assert_eq!(monthly.stats.max_total, 3230.0);
}

#[test]
fn test_last_period_category_ranking() {
    let file = write_csv(kozukai_csv());
    let records = load_records(&CsvFileSource::new(file.path()));

    let filtered = PeriodFilter::LastPeriods(1).apply(&records);
    assert!(filtered.rejected.is_none());
    let report = category_report(&filtered.records);
    let names: Vec<_> = report.rows.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(names, vec!["書籍", "昼食", "コーヒー"]);
}

#[test]
fn test_search_and_time_workflow() {
    let file = write_csv(kozukai_csv());
    let records = load_records(&CsvFileSource::new(file.path()));
    let all = PeriodFilter::All.apply(&records).records;

    let report = search_report(&all, "昼食");
    assert_eq!(report.match_count, 3);
    assert_eq!(report.total, 2450.0);
    assert_eq!(report.monthly.len(), 3);
    assert_eq!(report.records[0].amount, Some(700.0));

    let trends = time_report(&all);
    assert_eq!(trends.daily.first().map(|d| d.date), NaiveDate::from_ymd_opt(2023, 11, 2));
    assert_eq!(trends.weekdays.first().map(|w| w.weekday.as_str()), Some("Tuesday"));
}

#[test]
fn test_date_filter_then_report() {
    let file = write_csv(kozukai_csv());
    let records = load_records(&CsvFileSource::new(file.path()));

    let filtered = PeriodFilter::DateRange {
        start: NaiveDate::from_ymd_opt(2023, 12, 1).unwrap(),
        end: NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
    }
    .apply(&records);
    assert_eq!(filtered.records.len(), 2);

    let inverted = PeriodFilter::DateRange {
        start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        end: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
    }
    .apply(&records);
    assert_eq!(inverted.records.len(), records.len());
    assert!(matches!(inverted.rejected, Some(RangeError::Inverted { .. })));
}

// =============================================================================
// Comparison
// =============================================================================

#[test]
fn test_compare_first_and_last_month() {
    let file = write_csv(kozukai_csv());
    let records = load_records(&CsvFileSource::new(file.path()));

    let result = compare(&records, IndexRange::new(0, 0), IndexRange::new(2, 2)).unwrap();
    assert_eq!(result.range_a.display(), "2023年11月");
    assert_eq!(result.range_b.display(), "2024年01月");
    assert_eq!(result.a.total, 3230.0);
    assert_eq!(result.b.total, 2380.0);
    assert_eq!(result.total_delta, -850.0);
    assert_eq!(result.total_change_pct, -26.32);

    let names: Vec<_> = result.categories.iter().map(|c| c.category.as_str()).collect();
    assert_eq!(names, vec!["書籍", "昼食", "コーヒー"]);
}

#[test]
fn test_compare_single_month_export() {
    let file = write_csv("項目,金額,日時,年月\n昼食,800,2023-11-02 12:10:00,202311\n");
    let records = load_records(&CsvFileSource::new(file.path()));
    assert_eq!(
        compare(&records, IndexRange::new(0, 0), IndexRange::new(0, 0)),
        Err(CompareError::InsufficientData { found: 1 })
    );
}

// =============================================================================
// Config + Cache
// =============================================================================

#[test]
fn test_config_source_through_cache() {
    let file = write_csv(kozukai_csv());
    let config = Config {
        source: SourceConfig::csv(file.path()),
        cache_ttl: Duration::from_secs(300),
    };
    let source = config.build_source().unwrap();
    let mut cache = SnapshotCache::new(config.cache_ttl);

    let now = Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap();
    let snapshot = cache.get_or_load(source.as_ref(), now);
    assert_eq!(snapshot.records.len(), 10);
    assert_eq!(snapshot.fetched_at, now);
    assert!(cache.get(now + chrono::Duration::seconds(299)).is_some());
    assert!(cache.get(now + chrono::Duration::seconds(300)).is_none());
}
