//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor. Built once at startup from [`AppConfig`] and
//! never mutated; handlers derive per-request box and artifact views from it.

use std::sync::Arc;

use vagrancy_core::{AccessGuard, AccessToken, FsStore, PathStore};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Storage backend for every API surface.
    pub store: Arc<dyn PathStore>,
    /// Shared-secret gate for protected routes.
    pub guard: AccessGuard,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("guard", &self.guard)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Assemble state from an explicit store and secret.
    pub fn new(store: Arc<dyn PathStore>, secret: &AccessToken) -> Self {
        Self {
            store,
            guard: AccessGuard::new(secret),
        }
    }

    /// Filesystem-backed state for the configured storage root.
    pub fn from_config(config: &AppConfig) -> Self {
        let store = FsStore::new(&config.filestore_path);
        Self::new(Arc::new(store), &config.access_token)
    }
}
