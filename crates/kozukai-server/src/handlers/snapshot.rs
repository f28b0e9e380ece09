//! Health, data overview and snapshot refresh handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::{current_snapshot, refresh_snapshot, AppError, AppState};
use kozukai_core::{distinct_periods, overview, DataOverview};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub source: String,
}

/// GET /api/health - Liveness check (does not touch the data source)
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        source: state.source.name().to_string(),
    })
}

/// GET /api/overview - Record count, total and data span
pub async fn get_overview(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DataOverview>, AppError> {
    let snapshot = current_snapshot(&state).await?;
    Ok(Json(overview(&snapshot.records)))
}

/// A closing month and the index used to address it in range queries
#[derive(Serialize)]
pub struct PeriodEntry {
    pub index: usize,
    pub period: String,
    pub label: String,
}

/// GET /api/periods - Distinct closing months, oldest first
pub async fn list_periods(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PeriodEntry>>, AppError> {
    let snapshot = current_snapshot(&state).await?;
    let entries = distinct_periods(snapshot.records.iter())
        .into_iter()
        .enumerate()
        .map(|(index, key)| PeriodEntry {
            index,
            label: key.display(),
            period: key.to_string(),
        })
        .collect();
    Ok(Json(entries))
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub records: usize,
    pub fetched_at: DateTime<Utc>,
}

/// POST /api/refresh - Refetch the data source now
pub async fn refresh(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RefreshResponse>, AppError> {
    let snapshot = refresh_snapshot(&state).await?;
    info!(records = snapshot.records.len(), "Snapshot refreshed");
    Ok(Json(RefreshResponse {
        records: snapshot.records.len(),
        fetched_at: snapshot.fetched_at,
    }))
}
