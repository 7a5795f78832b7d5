//! # vagrancy-api: Axum API Services
//!
//! HTTP surface of the Vagrancy box repository. Three API styles are served
//! from one router over one [`PathStore`](vagrancy_core::PathStore):
//!
//! - direct box API: `/{owner}/{name}` and `/{owner}/{name}/{version}/{provider}`
//! - Vagrant Cloud style upload-path API under `/box/*`
//! - Atlas artifact API under `/api/v1/*` (placeholder endpoints)
//!
//! Plus `/health/liveness` and `/health/readiness`, which are unauthenticated.
//!
//! ## Middleware Stack (Tower)
//!
//! TraceLayer → AccessToken (gated routes only) → Handler
//!
//! Access-token checks are attached with `route_layer`, so a request for an
//! unknown path is a 404 rather than a 401.

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;

pub use config::AppConfig;
pub use error::AppError;
pub use state::AppState;

use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

/// Assemble the full application router.
pub fn app(state: AppState) -> Router {
    let gated = Router::new()
        .merge(routes::boxes::router())
        .merge(routes::cloud::gated_router())
        .merge(routes::atlas::gated_router())
        .route_layer(from_fn_with_state(
            state.clone(),
            auth::require_access_token,
        ));

    let open = Router::new()
        .merge(routes::cloud::open_router())
        .merge(routes::atlas::open_router())
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));

    Router::new()
        .merge(gated)
        .merge(open)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness probe. Always 200 while the process runs.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: 200 "ready" once the storage root is reachable,
/// 503 otherwise.
async fn readiness(State(state): State<AppState>) -> Response {
    match state.store.health().await {
        Ok(()) => "ready".into_response(),
        Err(err) => {
            tracing::warn!(error = %err, "storage health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "storage unavailable").into_response()
        }
    }
}
