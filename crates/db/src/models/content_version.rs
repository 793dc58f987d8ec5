//! Content version models and DTOs.
//!
//! `is_current` / `is_published` are not stored on `content_versions`; every
//! read joins `content_heads` and derives them from its pointer columns.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use turkce_core::diff::KeyDiff;
use turkce_core::types::{DbId, Timestamp, VersionNumber};
use turkce_core::error::CoreError;
use turkce_core::versioning::{self, VersionFacts};

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A content version row joined with its key's pointer record.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ContentVersion {
    pub id: DbId,
    pub content_type: String,
    pub content_id: String,
    pub version: VersionNumber,
    pub content: serde_json::Value,
    pub metadata: Option<serde_json::Value>,
    pub created_by: Option<String>,
    pub change_summary: Option<String>,
    pub is_published: bool,
    pub is_current: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ContentVersion {
    /// Borrow the fields statistics are computed from.
    pub fn facts(&self) -> VersionFacts<'_> {
        VersionFacts {
            version: self.version,
            is_current: self.is_current,
            is_published: self.is_published,
            created_by: self.created_by.as_deref(),
            updated_at: self.updated_at,
        }
    }
}

/// A row from the `content_heads` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ContentHead {
    pub id: DbId,
    pub content_type: String,
    pub content_id: String,
    pub latest_version: VersionNumber,
    pub current_version_id: Option<DbId>,
    pub published_version_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// Input for creating a new version of an existing or new content key.
/// Also the request body of `POST .../version`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateContentVersion {
    pub content: serde_json::Value,
    pub metadata: Option<serde_json::Value>,
    pub created_by: Option<String>,
    pub change_summary: Option<String>,
}

// ---------------------------------------------------------------------------
// API request types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublishVersionRequest {
    pub published_by: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnpublishVersionRequest {
    pub unpublished_by: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RollbackVersionRequest {
    pub rolled_back_by: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteVersionRequest {
    pub deleted_by: Option<String>,
}

/// Query parameters of `GET .../compare`.
///
/// Kept as raw text and parsed by [`CompareVersionsParams::parse`], so a
/// missing or malformed number surfaces as a validation error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompareVersionsParams {
    pub version1: Option<String>,
    pub version2: Option<String>,
}

impl CompareVersionsParams {
    pub fn parse(&self) -> Result<(VersionNumber, VersionNumber), CoreError> {
        let version1 = versioning::require_version_param("version1", self.version1.as_deref())?;
        let version2 = versioning::require_version_param("version2", self.version2.as_deref())?;
        Ok((version1, version2))
    }
}

/// One item of a bulk create request.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkCreateItem {
    pub content_type: String,
    pub content_id: String,
    pub content: serde_json::Value,
    pub metadata: Option<serde_json::Value>,
    pub created_by: Option<String>,
    pub change_summary: Option<String>,
}

impl BulkCreateItem {
    pub fn to_create(&self) -> CreateContentVersion {
        CreateContentVersion {
            content: self.content.clone(),
            metadata: self.metadata.clone(),
            created_by: self.created_by.clone(),
            change_summary: self.change_summary.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulkCreateRequest {
    pub items: Vec<BulkCreateItem>,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Lightweight per-version summary for timeline views.
#[derive(Debug, Clone, Serialize)]
pub struct VersionTimelineEntry {
    pub version: VersionNumber,
    pub created_at: Timestamp,
    pub created_by: Option<String>,
    pub change_summary: Option<String>,
    pub is_published: bool,
    pub is_current: bool,
}

impl From<ContentVersion> for VersionTimelineEntry {
    fn from(v: ContentVersion) -> Self {
        Self {
            version: v.version,
            created_at: v.created_at,
            created_by: v.created_by,
            change_summary: v.change_summary,
            is_published: v.is_published,
            is_current: v.is_current,
        }
    }
}

/// Both compared versions plus their key-level differences.
#[derive(Debug, Clone, Serialize)]
pub struct VersionComparison {
    pub version1: ContentVersion,
    pub version2: ContentVersion,
    pub differences: KeyDiff,
}
