//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Helpers that must join an outer
//! transaction take `&mut PgConnection` instead.

pub mod content_version_repo;
pub mod version_history_repo;

pub use content_version_repo::{ContentVersionRepo, DeleteResult};
pub use version_history_repo::VersionHistoryRepo;
