//! Version history (audit trail) models.

use serde::Serialize;
use sqlx::FromRow;
use turkce_core::history::HistoryAction;
use turkce_core::types::{DbId, Timestamp, VersionNumber};

/// A row from the `version_history` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VersionHistory {
    pub id: DbId,
    pub version_id: DbId,
    pub action: String,
    pub performed_by: Option<String>,
    pub description: Option<String>,
    pub changes: Option<serde_json::Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A history row joined with the version number it belongs to.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ContentAuditEntry {
    pub id: DbId,
    pub version_id: DbId,
    pub version: VersionNumber,
    pub action: String,
    pub performed_by: Option<String>,
    pub description: Option<String>,
    pub changes: Option<serde_json::Value>,
    pub created_at: Timestamp,
}

/// Input for appending a history entry.
#[derive(Debug, Clone)]
pub struct CreateVersionHistory {
    pub version_id: DbId,
    pub action: HistoryAction,
    pub performed_by: Option<String>,
    pub description: Option<String>,
    pub changes: Option<serde_json::Value>,
}
