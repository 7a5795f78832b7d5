//! # Error Types
//!
//! Errors surfaced by the storage and addressing layer. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Propagation
//!
//! - `InvalidPath` and `InvalidSegment` are raised before any filesystem
//!   access takes place.
//! - `NotFound` is an ordinary query outcome; callers normally check an
//!   existence predicate first.
//! - `Io` covers every other filesystem failure and is never retried.

use thiserror::Error;

/// Error from a [`PathStore`](crate::store::PathStore) operation.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Nothing is stored at the relative path.
    #[error("not found: {0}")]
    NotFound(String),

    /// The relative path would resolve outside the storage root.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Underlying filesystem failure other than absence.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error constructing an artifact identity from caller-supplied segments.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// A path segment cannot be used as a single directory name.
    #[error("invalid {field} segment {value:?}: {reason}")]
    InvalidSegment {
        /// Which identity field was rejected (owner, name, version, provider).
        field: &'static str,
        /// The rejected value, as supplied.
        value: String,
        /// Why the value was rejected.
        reason: &'static str,
    },
}

/// The supplied access token does not match the configured secret.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("access token rejected")]
pub struct Unauthorized;
