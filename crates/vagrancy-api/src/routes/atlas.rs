//! # Atlas Artifact API
//!
//! Enough of the Atlas `/api/v1` surface for Packer's artifact
//! post-processor to get past its handshake. The upload and descriptor
//! endpoints are placeholders: the upload URL names a fixed `vagrant.box`
//! path that the direct API does not serve, and the descriptor is derived
//! from the path alone without consulting storage.

use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use vagrancy_core::{BoxId, UploadPath, UploadPathIssuer};

use crate::error::AppError;
use crate::extractors::Caller;
use crate::state::AppState;

/// Routes reachable without an access token.
pub fn open_router() -> Router<AppState> {
    Router::new().route("/api/v1/authenticate", get(authenticate))
}

/// Routes that require the access token.
pub fn gated_router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/artifacts/{owner}/{name}/vagrant.box",
            post(upload_artifact),
        )
        .route("/api/v1/artifacts/{owner}/{name}", get(artifact_descriptor))
}

/// Atlas artifact descriptor.
#[derive(Debug, Serialize)]
pub struct ArtifactDescriptor {
    pub username: String,
    pub name: String,
    pub tag: String,
}

/// Presence probe. Always succeeds.
async fn authenticate() -> StatusCode {
    StatusCode::OK
}

async fn upload_artifact(
    Path((owner, name)): Path<(String, String)>,
    caller: Caller,
) -> Result<Json<UploadPath>, AppError> {
    let box_id = BoxId::new(&owner, &name)?;
    Ok(Json(UploadPathIssuer::new(caller.0).issue_artifact(&box_id)))
}

async fn artifact_descriptor(
    Path((owner, name)): Path<(String, String)>,
) -> Result<Json<ArtifactDescriptor>, AppError> {
    let box_id = BoxId::new(&owner, &name)?;
    Ok(Json(ArtifactDescriptor {
        username: box_id.owner().as_str().to_string(),
        name: box_id.name().as_str().to_string(),
        tag: box_id.tag(),
    }))
}
