//! Kozukai Web Server
//!
//! Axum-based JSON API over the kozukai expense reports.
//!
//! All handlers answer from one shared snapshot of the data source. The
//! snapshot is refetched when it is older than the cache TTL or when a
//! client calls `POST /api/refresh`.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{debug, error, info};

use kozukai_core::{load_records, DataSource, Snapshot, SnapshotCache};

mod handlers;

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

/// Shared application state
pub struct AppState {
    pub source: Box<dyn DataSource>,
    pub cache: Mutex<SnapshotCache>,
}

impl AppState {
    pub fn new(source: Box<dyn DataSource>, ttl: Duration) -> Self {
        Self {
            source,
            cache: Mutex::new(SnapshotCache::new(ttl)),
        }
    }

    /// Current snapshot, fetching from the source if it is stale or `force`
    /// is set.
    ///
    /// Blocks on the source; call from a blocking thread. The cache lock is
    /// not held during the fetch, so requests that miss at the same time
    /// each fetch and the last one stored wins.
    fn load_snapshot(&self, force: bool) -> anyhow::Result<Snapshot> {
        if !force {
            if let Some(snapshot) = self.lock_cache()?.get(Utc::now()) {
                return Ok(snapshot);
            }
        }

        debug!(source = self.source.name(), force, "Fetching snapshot");
        let snapshot = Snapshot::new(load_records(self.source.as_ref()), Utc::now());
        self.lock_cache()?.store(snapshot.clone());
        Ok(snapshot)
    }

    fn lock_cache(&self) -> anyhow::Result<MutexGuard<'_, SnapshotCache>> {
        self.cache
            .lock()
            .map_err(|_| anyhow::anyhow!("Snapshot cache lock poisoned"))
    }
}

/// Get the current snapshot without blocking the async runtime
pub(crate) async fn current_snapshot(state: &Arc<AppState>) -> Result<Snapshot, AppError> {
    let state = Arc::clone(state);
    let snapshot = tokio::task::spawn_blocking(move || state.load_snapshot(false)).await??;
    Ok(snapshot)
}

/// Drop the cached snapshot and fetch a fresh one
pub(crate) async fn refresh_snapshot(state: &Arc<AppState>) -> Result<Snapshot, AppError> {
    let state = Arc::clone(state);
    let snapshot = tokio::task::spawn_blocking(move || state.load_snapshot(true)).await??;
    Ok(snapshot)
}

/// Create the application router
pub fn create_router(state: AppState, config: ServerConfig) -> Router {
    let state = Arc::new(state);

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/overview", get(handlers::get_overview))
        .route("/periods", get(handlers::list_periods))
        // Reports
        .route("/reports/monthly", get(handlers::report_monthly))
        .route("/reports/categories", get(handlers::report_categories))
        .route("/reports/search", get(handlers::report_search))
        .route("/reports/trends", get(handlers::report_trends))
        .route("/reports/compare", get(handlers::report_compare))
        // Snapshot
        .route("/refresh", post(handlers::refresh));

    // Build CORS layer
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    };

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
}

/// Start the server
pub async fn serve(
    source: Box<dyn DataSource>,
    ttl: Duration,
    host: &str,
    port: u16,
) -> anyhow::Result<()> {
    serve_with_config(source, ttl, host, port, ServerConfig::default()).await
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    source: Box<dyn DataSource>,
    ttl: Duration,
    host: &str,
    port: u16,
    config: ServerConfig,
) -> anyhow::Result<()> {
    info!(source = source.name(), ttl_secs = ttl.as_secs(), "Serving reports");

    let app = create_router(AppState::new(source, ttl), config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Application error type
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn unprocessable(msg: &str) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            internal: Some(err.into()),
        }
    }
}

#[cfg(test)]
mod tests;
