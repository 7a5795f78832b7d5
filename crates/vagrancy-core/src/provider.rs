//! # Provider Artifacts
//!
//! A [`ProviderArtifact`] is one concrete `(owner, name, version, provider)`
//! payload. It is a transient view built per request over an identity, a
//! store handle and the request context; nothing about it is persisted
//! besides the payload file itself.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::identity::ArtifactIdentity;
use crate::store::{ByteStream, PathStore, StoredObject};
use crate::urls::{synthesize_url, RequestContext};

/// Catalog entry for one provider of a box version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    /// Provider name, e.g. `virtualbox`.
    pub name: String,
    /// Download URL for the payload.
    pub url: String,
}

/// One stored payload and the operations on it.
#[derive(Clone)]
pub struct ProviderArtifact {
    identity: ArtifactIdentity,
    store: Arc<dyn PathStore>,
    ctx: RequestContext,
}

impl std::fmt::Debug for ProviderArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderArtifact")
            .field("identity", &self.identity)
            .field("origin", &self.ctx.origin)
            .finish_non_exhaustive()
    }
}

impl ProviderArtifact {
    /// Bind an identity to a store for the duration of one request.
    pub fn new(identity: ArtifactIdentity, store: Arc<dyn PathStore>, ctx: RequestContext) -> Self {
        Self {
            identity,
            store,
            ctx,
        }
    }

    /// The artifact's identity.
    pub fn identity(&self) -> &ArtifactIdentity {
        &self.identity
    }

    /// Relative storage path of the payload.
    pub fn file_path(&self) -> String {
        self.identity.file_path()
    }

    /// Whether the payload exists.
    pub async fn exists(&self) -> Result<bool, StoreError> {
        self.store.exists(&self.file_path()).await
    }

    /// Store the stream as the payload, replacing any previous one.
    /// The content is passed through unchanged.
    pub async fn write(&self, data: ByteStream) -> Result<u64, StoreError> {
        self.store.write(&self.file_path(), data).await
    }

    /// Open the payload. Fails with `NotFound` if it does not exist.
    pub async fn read(&self) -> Result<StoredObject, StoreError> {
        self.store.read(&self.file_path()).await
    }

    /// Remove the payload if it exists. Absence is a silent no-op,
    /// including when the payload vanishes between the check and the removal.
    pub async fn delete(&self) -> Result<(), StoreError> {
        if !self.exists().await? {
            return Ok(());
        }
        match self.store.delete(&self.file_path()).await {
            Ok(()) | Err(StoreError::NotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Download URL: `scheme://host:port/owner/name/version/provider`,
    /// carrying the caller's `access_token` when the request had one.
    pub fn url(&self) -> String {
        synthesize_url(
            &self.ctx.origin.base_site(),
            &self.identity.path(),
            self.ctx.caller_token(),
        )
    }

    /// Catalog entry for this provider, or `None` if the payload is absent.
    pub async fn descriptor(&self) -> Result<Option<ProviderDescriptor>, StoreError> {
        if !self.exists().await? {
            return Ok(None);
        }
        Ok(Some(ProviderDescriptor {
            name: self.identity.provider().to_string(),
            url: self.url(),
        }))
    }
}
