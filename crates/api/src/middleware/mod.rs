//! Request extractors that gate the versioning routes.
//!
//! - [`auth::AuthUser`] -- the verified caller behind a bearer token.

pub mod auth;
