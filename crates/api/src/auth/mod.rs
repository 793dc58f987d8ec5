//! Authentication primitives.
//!
//! - [`jwt`] -- bearer token verification (tokens are issued by the identity service).

pub mod jwt;
