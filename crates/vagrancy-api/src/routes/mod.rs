//! # Route Modules
//!
//! One module per API surface. Each exposes its gated and open routes
//! separately; [`crate::app`] applies the access-token layer to the gated
//! half only.

pub mod atlas;
pub mod boxes;
pub mod cloud;
