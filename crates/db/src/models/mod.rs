//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` input DTOs and request bodies for the HTTP layer

pub mod content_version;
pub mod version_history;
