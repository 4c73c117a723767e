//! HTTP server setup and routing
//!
//! Serves the dashboard page, the aggregated emissions as JSON, and a health
//! check. The pipeline is synchronous, so each `/api/data` request runs it on
//! the blocking pool.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::analyzers::analyzer::aggregated_emissions;
use crate::analyzers::types::AggregateRow;
use crate::config::PipelineConfig;
use crate::error::EmissionsError;

const DASHBOARD_HTML: &str = include_str!("dashboard.html");

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<PipelineConfig>,
}

impl AppState {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
}

/// Body returned when the pipeline fails.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

/// Failure of a `/api/data` request, rendered as a JSON [`ErrorBody`].
pub enum ApiError {
    Pipeline(EmissionsError),
    /// The blocking task panicked or was cancelled
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Pipeline(e) => {
                let status = match &e {
                    EmissionsError::SourceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (
                    status,
                    ErrorBody {
                        error: e.kind().to_string(),
                        message: e.to_string(),
                    },
                )
            }
            ApiError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error: "Internal".to_string(),
                    message,
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(serve_dashboard))
        .route("/api/data", get(get_data))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve the dashboard until the process is stopped.
pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Dashboard listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// GET /
pub async fn serve_dashboard() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

/// GET /api/data
///
/// Aggregated emissions per state, highest total CO2 first.
pub async fn get_data(State(state): State<AppState>) -> Result<Json<Vec<AggregateRow>>, ApiError> {
    let config = Arc::clone(&state.config);

    let result = tokio::task::spawn_blocking(move || aggregated_emissions(&config))
        .await
        .map_err(|e| {
            error!(error = %e, "Aggregation task failed");
            ApiError::Internal(e.to_string())
        })?;

    match result {
        Ok(rows) => Ok(Json(rows)),
        Err(e) => {
            error!(kind = e.kind(), error = %e, "Emissions aggregation failed");
            Err(ApiError::Pipeline(e))
        }
    }
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
