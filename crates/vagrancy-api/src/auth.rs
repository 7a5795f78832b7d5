//! # Access-Token Middleware
//!
//! Gated routes require `?access_token=<base64(secret)>`. The middleware
//! runs before the handler, so a rejected request never reaches storage.
//!
//! A rejection is a bare `401 Unauthorized` with no body, which is what
//! the box client expects. The supplied token is never logged.

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::extractors::access_token_param;
use crate::state::AppState;

/// Reject the request unless its `access_token` matches the configured secret.
pub async fn require_access_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let supplied = access_token_param(request.uri());
    match state.guard.authenticate(supplied.as_deref()) {
        Ok(()) => next.run(request).await,
        Err(_) => {
            tracing::warn!(
                method = %request.method(),
                path = request.uri().path(),
                token_present = supplied.is_some(),
                "authentication failed: access token rejected"
            );
            StatusCode::UNAUTHORIZED.into_response()
        }
    }
}
