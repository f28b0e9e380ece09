//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use kozukai_core::{MemorySource, RawRow, RawTable};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Barrier;
use tower::ServiceExt;

fn sample_table() -> RawTable {
    RawTable {
        headers: vec!["項目".into(), "金額".into(), "日時".into(), "年月".into()],
        rows: vec![
            RawRow::new(["昼食", "800", "2023-11-02 12:10:00", "202311"]),
            RawRow::new(["コーヒー", "450", "2023-11-03 08:30:00", "202311"]),
            RawRow::new(["昼食", "950", "2023-11-28 12:05:00", "202312"]),
            RawRow::new(["電車", "", "2023-12-04 07:50:00", "202312"]),
            RawRow::new(["書籍", "1200", "2024-01-20 20:15:00", "202401"]),
        ],
    }
}

/// Serves the sample table and counts fetches
struct CountingSource {
    fetches: Arc<AtomicUsize>,
    table: RawTable,
}

impl DataSource for CountingSource {
    fn name(&self) -> &str {
        "counting"
    }

    fn fetch(&self) -> kozukai_core::Result<RawTable> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.table.clone())
    }
}

/// Each fetch waits at a shared barrier until its partner fetch arrives
struct RendezvousSource {
    barrier: Barrier,
}

impl DataSource for RendezvousSource {
    fn name(&self) -> &str {
        "rendezvous"
    }

    fn fetch(&self) -> kozukai_core::Result<RawTable> {
        self.barrier.wait();
        Ok(sample_table())
    }
}

struct FailingSource;

impl DataSource for FailingSource {
    fn name(&self) -> &str {
        "failing"
    }

    fn fetch(&self) -> kozukai_core::Result<RawTable> {
        Err(kozukai_core::Error::Source("sheet unreachable".into()))
    }
}

fn app_with(source: Box<dyn DataSource>, ttl: Duration) -> Router {
    create_router(AppState::new(source, ttl), ServerConfig::default())
}

fn setup_test_app() -> Router {
    app_with(
        Box::new(MemorySource::new(sample_table())),
        Duration::from_secs(300),
    )
}

fn counting_app(ttl: Duration) -> (Router, Arc<AtomicUsize>) {
    let fetches = Arc::new(AtomicUsize::new(0));
    let source = CountingSource {
        fetches: Arc::clone(&fetches),
        table: sample_table(),
    };
    (app_with(Box::new(source), ttl), fetches)
}

async fn get(app: &Router, uri: &str) -> axum::response::Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post(app: &Router, uri: &str) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ========== Health & Overview Tests ==========

#[tokio::test]
async fn test_health_does_not_fetch() {
    let (app, fetches) = counting_app(Duration::from_secs(300));

    let response = get(&app, "/api/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["source"], "counting");
    assert_eq!(fetches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_security_headers() {
    let app = setup_test_app();
    let response = get(&app, "/api/health").await;

    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
}

#[tokio::test]
async fn test_overview() {
    let app = setup_test_app();
    let response = get(&app, "/api/overview").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["record_count"], 5);
    assert_eq!(json["total_amount"].as_f64(), Some(3400.0));
    assert_eq!(json["period_count"], 3);
}

#[tokio::test]
async fn test_failing_source_serves_empty_data() {
    let app = app_with(Box::new(FailingSource), Duration::from_secs(300));
    let response = get(&app, "/api/overview").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["record_count"], 0);
    assert_eq!(json["period_count"], 0);
}

#[tokio::test]
async fn test_list_periods() {
    let app = setup_test_app();
    let json = get_body_json(get(&app, "/api/periods").await).await;

    let periods = json.as_array().unwrap();
    assert_eq!(periods.len(), 3);
    assert_eq!(periods[0]["index"], 0);
    assert_eq!(periods[0]["period"], "202311");
    assert_eq!(periods[0]["label"], "2023年11月");
    assert_eq!(periods[2]["period"], "202401");
}

// ========== Filtered Report Tests ==========

#[tokio::test]
async fn test_monthly_report_unfiltered() {
    let app = setup_test_app();
    let response = get(&app, "/api/reports/monthly").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert!(json["warning"].is_null());
    let rows = json["report"]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["total"].as_f64(), Some(1250.0));
    // The record without an amount is not counted
    assert_eq!(rows[1]["count"], 1);
}

#[tokio::test]
async fn test_monthly_report_last_period() {
    let app = setup_test_app();
    let json = get_body_json(get(&app, "/api/reports/monthly?last=1").await).await;

    assert!(json["warning"].is_null());
    let rows = json["report"]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["total"].as_f64(), Some(1200.0));
}

#[tokio::test]
async fn test_rejected_filter_reports_all_data_with_warning() {
    let app = setup_test_app();

    let response = get(&app, "/api/reports/monthly?period_start=2&period_end=0").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert!(json["warning"].is_string());
    assert_eq!(json["report"]["rows"].as_array().unwrap().len(), 3);

    let json = get_body_json(get(&app, "/api/reports/monthly?last=10").await).await;
    assert!(json["warning"].is_string());
    assert_eq!(json["report"]["rows"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_date_filter() {
    let app = setup_test_app();
    let json = get_body_json(
        get(
            &app,
            "/api/reports/categories?from_date=2023-11-01&to_date=2023-11-30",
        )
        .await,
    )
    .await;

    let rows = json["report"]["rows"].as_array().unwrap();
    // 2023-11-28 lunch falls in the 202312 closing month but within the dates
    assert_eq!(rows[0]["key"], "昼食");
    assert_eq!(rows[0]["total"].as_f64(), Some(1750.0));
}

#[tokio::test]
async fn test_invalid_filter_params() {
    let app = setup_test_app();

    let response = get(&app, "/api/reports/monthly?last=1&period_start=0&period_end=1").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(&app, "/api/reports/monthly?from_date=2023-11-01").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(&app, "/api/reports/trends?from_date=11/01/2023&to_date=2023-11-30").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("from_date"));
}

#[tokio::test]
async fn test_categories_limit() {
    let app = setup_test_app();
    let json = get_body_json(get(&app, "/api/reports/categories?limit=2").await).await;

    let rows = json["report"]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["key"], "昼食");
    assert_eq!(rows[1]["key"], "書籍");
}

#[tokio::test]
async fn test_search_report() {
    let app = setup_test_app();
    let uri = format!("/api/reports/search?q={}", "%E6%98%BC%E9%A3%9F"); // 昼食
    let response = get(&app, &uri).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["report"]["match_count"], 2);
    assert_eq!(json["report"]["total"].as_f64(), Some(1750.0));
    let records = json["report"]["records"].as_array().unwrap();
    assert_eq!(records[0]["amount"].as_f64(), Some(950.0));
}

#[tokio::test]
async fn test_search_requires_term() {
    let app = setup_test_app();

    let response = get(&app, "/api/reports/search").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(&app, "/api/reports/search?q=%20%20").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_trends_report() {
    let app = setup_test_app();
    let json = get_body_json(get(&app, "/api/reports/trends").await).await;

    let daily = json["report"]["daily"].as_array().unwrap();
    assert_eq!(daily[0]["date"], "2023-11-02");
    let weekdays = json["report"]["weekdays"].as_array().unwrap();
    assert!(!weekdays.is_empty());
}

// ========== Comparison Tests ==========

#[tokio::test]
async fn test_compare() {
    let app = setup_test_app();
    let response = get(&app, "/api/reports/compare?a_start=0&a_end=0&b_start=1&b_end=1").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["total_delta"].as_f64(), Some(-300.0));
    assert_eq!(json["total_change_pct"].as_f64(), Some(-24.0));

    let categories = json["categories"].as_array().unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0]["category"], "昼食");
    assert_eq!(categories[0]["delta"].as_f64(), Some(150.0));
}

#[tokio::test]
async fn test_compare_bad_ranges() {
    let app = setup_test_app();

    // Inverted
    let response = get(&app, "/api/reports/compare?a_start=1&a_end=0&b_start=2&b_end=2").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Out of range
    let response = get(&app, "/api/reports/compare?a_start=0&a_end=0&b_start=1&b_end=7").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Missing parameter
    let response = get(&app, "/api/reports/compare?a_start=0&a_end=0&b_start=1").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_compare_insufficient_data() {
    let table = RawTable {
        rows: sample_table().rows.into_iter().take(2).collect(),
        ..sample_table()
    };
    let app = app_with(Box::new(MemorySource::new(table)), Duration::from_secs(300));

    let response = get(&app, "/api/reports/compare?a_start=0&a_end=0&b_start=0&b_end=0").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = get_body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("Not enough data"));
}

// ========== Snapshot Cache Tests ==========

#[tokio::test]
async fn test_snapshot_is_shared_between_requests() {
    let (app, fetches) = counting_app(Duration::from_secs(300));

    get(&app, "/api/overview").await;
    get(&app, "/api/reports/monthly").await;
    get(&app, "/api/periods").await;

    assert_eq!(fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_zero_ttl_refetches() {
    let (app, fetches) = counting_app(Duration::ZERO);

    get(&app, "/api/overview").await;
    get(&app, "/api/overview").await;

    assert_eq!(fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_refresh_refetches() {
    let (app, fetches) = counting_app(Duration::from_secs(300));

    get(&app, "/api/overview").await;
    let response = post(&app, "/api/refresh").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["records"], 5);
    assert!(json["fetched_at"].is_string());
    assert_eq!(fetches.load(Ordering::SeqCst), 2);

    // Later reads use the refreshed snapshot
    get(&app, "/api/overview").await;
    assert_eq!(fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_fetches_do_not_hold_the_cache_lock() {
    let source = RendezvousSource {
        barrier: Barrier::new(2),
    };
    let app = app_with(Box::new(source), Duration::ZERO);

    // Both fetches must be in flight together for either to finish
    let both = async { tokio::join!(get(&app, "/api/overview"), post(&app, "/api/refresh")) };
    let (overview, refresh) = tokio::time::timeout(Duration::from_secs(10), both)
        .await
        .expect("concurrent fetches were serialized");

    assert_eq!(overview.status(), StatusCode::OK);
    assert_eq!(refresh.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_requires_post() {
    let app = setup_test_app();
    let response = get(&app, "/api/refresh").await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
