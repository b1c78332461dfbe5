//! REST API endpoints.
//!
//! Axum-based HTTP surface over the match poller: roster state,
//! on-demand checks and manual ticks.

pub mod routes;
pub mod state;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::future::Future;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::fetch::StatsError;
use crate::suggest::SuggestError;
use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StatsError> for ApiError {
    fn from(err: StatsError) -> Self {
        match err {
            StatsError::RateLimited { retry_after_secs } => ApiError::RateLimited { retry_after_secs },
            StatsError::NoMatches(_) => ApiError::NotFound(err.to_string()),
            StatsError::PlayerData(_) | StatsError::Unclassified(_) => {
                ApiError::Upstream(err.to_string())
            }
        }
    }
}

impl From<SuggestError> for ApiError {
    fn from(err: SuggestError) -> Self {
        match err {
            SuggestError::UnknownPosition(_) => ApiError::BadRequest(err.to_string()),
            SuggestError::NoHeroes(_) => ApiError::NotFound(err.to_string()),
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::RateLimited { .. } => (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED"),
            ApiError::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        let mut response = (status, Json(body)).into_response();
        if let ApiError::RateLimited { retry_after_secs } = self {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
        }
        response
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/players", get(routes::players::list_players))
        .route("/api/players/:account_id/last", get(routes::players::last_match))
        .route("/api/players/:account_id/status", get(routes::players::cached_status))
        .route("/api/players/:account_id/suggest", get(routes::players::suggest))
        .route("/api/check", post(routes::players::check_all))
        .route("/api/tick", post(routes::players::tick))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API until `shutdown` resolves, then stop the poll loop.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let poller = state.poller.clone();
    let served = axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await;

    poller.cancel().await;
    tracing::info!("API stopped");
    served
}
