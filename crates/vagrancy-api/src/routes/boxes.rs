//! # Direct Box API
//!
//! Routes (all gated by the access token):
//! - GET    /{owner}/{name}: box catalog document
//! - GET    /box/{owner}/{name}: same, alternate prefix
//! - PUT    /{owner}/{name}/{version}/{provider}: store payload
//! - GET    /{owner}/{name}/{version}/{provider}: download payload
//! - DELETE /{owner}/{name}/{version}/{provider}: remove payload
//!
//! Lookups that find nothing answer with a bare 404.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use futures::TryStreamExt;

use vagrancy_core::{
    ArtifactIdentity, BoxId, BoxResource, ByteStream, ProviderArtifact, StoreError,
};

use crate::error::AppError;
use crate::extractors::Caller;
use crate::state::AppState;

/// Build the direct box API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{owner}/{name}", get(get_box))
        .route("/box/{owner}/{name}", get(get_box))
        .route(
            "/{owner}/{name}/{version}/{provider}",
            get(get_artifact).put(put_artifact).delete(delete_artifact),
        )
        // Payload size is left to the transport in front of the server.
        .layer(DefaultBodyLimit::disable())
}

fn artifact(
    state: &AppState,
    (owner, name, version, provider): &(String, String, String, String),
    ctx: Caller,
) -> Result<ProviderArtifact, AppError> {
    let identity = ArtifactIdentity::new(owner, name, version, provider)?;
    Ok(ProviderArtifact::new(identity, Arc::clone(&state.store), ctx.0))
}

async fn get_box(
    State(state): State<AppState>,
    Path((owner, name)): Path<(String, String)>,
    caller: Caller,
) -> Result<Response, AppError> {
    let id = BoxId::new(&owner, &name)?;
    let resource = BoxResource::new(id, Arc::clone(&state.store), caller.0);

    if !resource.exists().await? {
        return Ok(StatusCode::NOT_FOUND.into_response());
    }
    let descriptor = resource.descriptor().await?;
    Ok(Json(descriptor).into_response())
}

async fn put_artifact(
    State(state): State<AppState>,
    Path(params): Path<(String, String, String, String)>,
    caller: Caller,
    body: Body,
) -> Result<StatusCode, AppError> {
    let artifact = artifact(&state, &params, caller)?;
    let stream: ByteStream = Box::pin(body.into_data_stream().map_err(std::io::Error::other));

    let bytes = artifact.write(stream).await?;
    tracing::info!(artifact = %artifact.identity(), bytes, "artifact stored");
    Ok(StatusCode::OK)
}

async fn get_artifact(
    State(state): State<AppState>,
    Path(params): Path<(String, String, String, String)>,
    caller: Caller,
) -> Result<Response, AppError> {
    let artifact = artifact(&state, &params, caller)?;

    if !artifact.exists().await? {
        return Ok(StatusCode::NOT_FOUND.into_response());
    }
    let object = match artifact.read().await {
        Ok(object) => object,
        // Deleted between the existence check and the open.
        Err(StoreError::NotFound(_)) => return Ok(StatusCode::NOT_FOUND.into_response()),
        Err(err) => return Err(err.into()),
    };

    let headers = [
        (
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/octet-stream"),
        ),
        (header::CONTENT_LENGTH, HeaderValue::from(object.len)),
    ];
    Ok((headers, Body::from_stream(object.body)).into_response())
}

/// The status is chosen from an existence check here, and
/// `ProviderArtifact::delete` checks again before removing. The two checks
/// are not atomic: a concurrent delete between them still answers 200.
async fn delete_artifact(
    State(state): State<AppState>,
    Path(params): Path<(String, String, String, String)>,
    caller: Caller,
) -> Result<StatusCode, AppError> {
    let artifact = artifact(&state, &params, caller)?;

    if !artifact.exists().await? {
        return Ok(StatusCode::NOT_FOUND);
    }
    artifact.delete().await?;
    tracing::info!(artifact = %artifact.identity(), "artifact deleted");
    Ok(StatusCode::OK)
}
