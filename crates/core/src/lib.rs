//! Domain logic for the content versioning backend.
//!
//! This crate has no IO: it holds shared types, the error taxonomy, and the
//! pure rules (key diffing, statistics, delete guards, input validation) that
//! the repository and HTTP layers build on.

pub mod content_type;
pub mod diff;
pub mod error;
pub mod history;
pub mod pagination;
pub mod types;
pub mod versioning;
