//! # vagrancy-core: Box Storage and Addressing
//!
//! The storage model behind the Vagrancy box repository. Boxes are
//! versioned, provider-specific binary payloads addressed by the tuple
//! `(owner, name, version, provider)` and stored one file per tuple at
//! `<root>/owner/name/version/provider/box`.
//!
//! ## Components
//!
//! | Module | Role |
//! |--------|------|
//! | [`store`] | `PathStore` trait and the root-confined `FsStore` |
//! | [`identity`] | validated segments, `BoxId`, `ArtifactIdentity` |
//! | [`boxes`] | `BoxResource` existence and catalog listing |
//! | [`provider`] | `ProviderArtifact` read/write/delete and download URL |
//! | [`upload`] | `UploadPathIssuer` for the indirection APIs |
//! | [`guard`] | `AccessGuard` shared-secret check |
//! | [`urls`] | request origin and token-aware URL synthesis |
//!
//! ## Crate Policy
//!
//! - No HTTP framework types; the API crate adapts requests into
//!   [`RequestContext`] values and store calls.
//! - Identity validation and path resolution both reject traversal before
//!   any filesystem access.
//! - No `.unwrap()` outside tests.

pub mod boxes;
pub mod error;
pub mod guard;
pub mod identity;
pub mod provider;
pub mod store;
pub mod upload;
pub mod urls;

pub use boxes::{BoxDescriptor, BoxResource, VersionDescriptor};
pub use error::{IdentityError, StoreError, Unauthorized};
pub use guard::{AccessGuard, AccessToken};
pub use identity::{ArtifactIdentity, BoxId, Segment, PAYLOAD_FILE};
pub use provider::{ProviderArtifact, ProviderDescriptor};
pub use store::{byte_stream, ByteStream, FsStore, PathStore, StoredObject};
pub use upload::{UploadPath, UploadPathIssuer, ARTIFACT_UPLOAD_NAME};
pub use urls::{synthesize_url, RequestContext, RequestOrigin, ACCESS_TOKEN_PARAM};
