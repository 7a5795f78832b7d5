//! # Box Resources
//!
//! A [`BoxResource`] is the collection of every version and provider stored
//! under one `owner/name` pair. It has no record of its own: it exists
//! exactly when its directory exists, and its catalog document is derived
//! by listing the version and provider directories beneath it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{IdentityError, StoreError};
use crate::identity::BoxId;
use crate::provider::{ProviderArtifact, ProviderDescriptor};
use crate::store::PathStore;
use crate::urls::RequestContext;

/// Catalog document for a box, in the shape box clients consume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxDescriptor {
    /// `owner/name`.
    pub name: String,
    /// Published versions in lexical order.
    pub versions: Vec<VersionDescriptor>,
}

/// Catalog entry for one version of a box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionDescriptor {
    /// Version string as stored.
    pub version: String,
    /// Providers with a stored payload, in lexical order.
    pub providers: Vec<ProviderDescriptor>,
}

/// Transient per-request view of one box.
#[derive(Clone)]
pub struct BoxResource {
    id: BoxId,
    store: Arc<dyn PathStore>,
    ctx: RequestContext,
}

impl std::fmt::Debug for BoxResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxResource")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl BoxResource {
    /// Bind a box identity to a store for the duration of one request.
    pub fn new(id: BoxId, store: Arc<dyn PathStore>, ctx: RequestContext) -> Self {
        Self { id, store, ctx }
    }

    /// The box identity.
    pub fn id(&self) -> &BoxId {
        &self.id
    }

    /// Relative path prefix of every artifact in this box.
    pub fn path(&self) -> String {
        self.id.path()
    }

    /// Whether anything has been stored under this box.
    pub async fn exists(&self) -> Result<bool, StoreError> {
        self.store.exists(&self.path()).await
    }

    /// View one provider artifact of this box.
    pub fn provider(&self, version: &str, provider: &str) -> Result<ProviderArtifact, IdentityError> {
        let identity = self.id.artifact(version, provider)?;
        Ok(ProviderArtifact::new(
            identity,
            Arc::clone(&self.store),
            self.ctx.clone(),
        ))
    }

    /// Build the catalog document. Callers check [`exists`](Self::exists)
    /// first; a missing box yields an empty version list.
    ///
    /// Providers without a payload (left behind by a delete) and versions
    /// with no remaining providers are omitted.
    pub async fn descriptor(&self) -> Result<BoxDescriptor, StoreError> {
        let mut versions = Vec::new();
        for version in self.store.list_dirs(&self.path()).await? {
            let version_path = format!("{}/{}", self.path(), version);
            let mut providers = Vec::new();
            for provider in self.store.list_dirs(&version_path).await? {
                let artifact = match self.provider(&version, &provider) {
                    Ok(artifact) => artifact,
                    Err(err) => {
                        tracing::debug!(error = %err, "skipping unaddressable directory");
                        continue;
                    }
                };
                if let Some(descriptor) = artifact.descriptor().await? {
                    providers.push(descriptor);
                }
            }
            if !providers.is_empty() {
                versions.push(VersionDescriptor { version, providers });
            }
        }

        Ok(BoxDescriptor {
            name: self.id.tag(),
            versions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{byte_stream, FsStore};
    use crate::urls::RequestOrigin;

    fn resource(store: Arc<dyn PathStore>, token: Option<&str>) -> BoxResource {
        let ctx = RequestContext::new(
            RequestOrigin::from_authority("http", "localhost:8099"),
            token.map(str::to_string),
        );
        BoxResource::new(BoxId::new("acme", "widget").unwrap(), store, ctx)
    }

    async fn put(resource: &BoxResource, version: &str, provider: &str) {
        resource
            .provider(version, provider)
            .unwrap()
            .write(byte_stream("payload"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn exists_after_first_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let resource = resource(Arc::new(FsStore::new(dir.path())), None);

        assert_eq!(resource.path(), "acme/widget");
        assert!(!resource.exists().await.unwrap());
        put(&resource, "1.0.0", "virtualbox").await;
        assert!(resource.exists().await.unwrap());
    }

    #[tokio::test]
    async fn descriptor_lists_versions_and_providers() {
        let dir = tempfile::tempdir().unwrap();
        let resource = resource(Arc::new(FsStore::new(dir.path())), Some("czNjcmV0"));
        put(&resource, "1.0.0", "virtualbox").await;
        put(&resource, "1.0.0", "libvirt").await;
        put(&resource, "2.0.0", "virtualbox").await;

        let descriptor = resource.descriptor().await.unwrap();
        assert_eq!(descriptor.name, "acme/widget");
        assert_eq!(descriptor.versions.len(), 2);
        assert_eq!(descriptor.versions[0].version, "1.0.0");
        let names: Vec<&str> = descriptor.versions[0]
            .providers
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["libvirt", "virtualbox"]);
        assert_eq!(
            descriptor.versions[1].providers[0].url,
            "http://localhost:8099/acme/widget/2.0.0/virtualbox?access_token=czNjcmV0"
        );
    }

    #[tokio::test]
    async fn descriptor_skips_deleted_providers() {
        let dir = tempfile::tempdir().unwrap();
        let resource = resource(Arc::new(FsStore::new(dir.path())), None);
        put(&resource, "1.0.0", "virtualbox").await;
        put(&resource, "2.0.0", "virtualbox").await;
        resource
            .provider("1.0.0", "virtualbox")
            .unwrap()
            .delete()
            .await
            .unwrap();

        let descriptor = resource.descriptor().await.unwrap();
        assert_eq!(descriptor.versions.len(), 1);
        assert_eq!(descriptor.versions[0].version, "2.0.0");
        // The box itself still exists: directories are not cleaned up.
        assert!(resource.exists().await.unwrap());
    }

    #[tokio::test]
    async fn descriptor_serializes_in_catalog_shape() {
        let dir = tempfile::tempdir().unwrap();
        let resource = resource(Arc::new(FsStore::new(dir.path())), None);
        put(&resource, "1.0.0", "virtualbox").await;

        let json = serde_json::to_value(resource.descriptor().await.unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "acme/widget",
                "versions": [{
                    "version": "1.0.0",
                    "providers": [{
                        "name": "virtualbox",
                        "url": "http://localhost:8099/acme/widget/1.0.0/virtualbox"
                    }]
                }]
            })
        );
    }

    #[test]
    fn provider_rejects_bad_segments() {
        let resource = resource(Arc::new(FsStore::new("/nonexistent")), None);
        assert!(resource.provider("..", "virtualbox").is_err());
        assert!(resource.provider("1.0", "a/b").is_err());
    }
}
