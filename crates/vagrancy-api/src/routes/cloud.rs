//! # Vagrant Cloud Compatible API
//!
//! The subset of the Vagrant Cloud v1 API that `vagrant cloud publish`
//! drives: create a version, create a provider, ask where to upload, then
//! release. Versions and providers exist here only as directories created by
//! an upload, so the create, release and remove calls are acknowledgements
//! that echo the request back and touch no storage.
//!
//! Open routes:
//! - POST   /box/{owner}/{name}/versions
//! - POST   /box/{owner}/{name}/version/{version}/providers
//! - DELETE /box/{owner}/{name}/version/{version}/provider/{provider}
//!
//! Gated routes:
//! - GET    /box/{owner}/{name}/version/{version}/provider/{provider}/upload
//! - PUT    /box/{owner}/{name}/version/{version}/release

use axum::body::Bytes;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;

use vagrancy_core::{ArtifactIdentity, UploadPath, UploadPathIssuer};

use crate::error::AppError;
use crate::extractors::{parse_json, Caller};
use crate::state::AppState;

/// Routes reachable without an access token.
pub fn open_router() -> Router<AppState> {
    Router::new()
        .route("/box/{owner}/{name}/versions", post(create_version))
        .route(
            "/box/{owner}/{name}/version/{version}/providers",
            post(create_provider),
        )
        .route(
            "/box/{owner}/{name}/version/{version}/provider/{provider}",
            delete(remove_provider),
        )
}

/// Routes that require the access token.
pub fn gated_router() -> Router<AppState> {
    Router::new()
        .route(
            "/box/{owner}/{name}/version/{version}/provider/{provider}/upload",
            get(upload_path),
        )
        .route(
            "/box/{owner}/{name}/version/{version}/release",
            put(release_version),
        )
}

#[derive(Debug, Deserialize)]
struct CreateVersion {
    #[serde(default)]
    version: Value,
}

#[derive(Debug, Deserialize)]
struct CreateProvider {
    #[serde(default)]
    provider: Value,
}

/// Echo the `version` member of the request body.
async fn create_version(body: Bytes) -> Result<Json<Value>, AppError> {
    let request: CreateVersion = parse_json(&body)?;
    tracing::debug!(version = %request.version, "version creation acknowledged");
    Ok(Json(request.version))
}

/// Echo the `provider` member of the request body.
async fn create_provider(body: Bytes) -> Result<Json<Value>, AppError> {
    let request: CreateProvider = parse_json(&body)?;
    tracing::debug!(provider = %request.provider, "provider creation acknowledged");
    Ok(Json(request.provider))
}

async fn remove_provider() -> StatusCode {
    StatusCode::OK
}

async fn release_version() -> StatusCode {
    StatusCode::OK
}

/// Tell the client where to PUT the payload for this artifact.
async fn upload_path(
    Path((owner, name, version, provider)): Path<(String, String, String, String)>,
    caller: Caller,
) -> Result<Json<UploadPath>, AppError> {
    let identity = ArtifactIdentity::new(&owner, &name, &version, &provider)?;
    let issued = UploadPathIssuer::new(caller.0).issue(&identity);
    tracing::debug!(artifact = %identity, "upload path issued");
    Ok(Json(issued))
}
