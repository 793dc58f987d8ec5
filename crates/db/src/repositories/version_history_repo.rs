//! Repository for the `version_history` table.
//!
//! History rows are written only from inside the versioning transactions of
//! [`ContentVersionRepo`](super::ContentVersionRepo) and are never updated.

use sqlx::{PgConnection, PgPool};
use turkce_core::content_type::ContentKey;
use turkce_core::types::DbId;

use crate::models::version_history::{ContentAuditEntry, CreateVersionHistory, VersionHistory};

/// Column list for version_history queries.
const COLUMNS: &str = "id, version_id, action, performed_by, description, changes, \
    created_at, updated_at";

pub struct VersionHistoryRepo;

impl VersionHistoryRepo {
    /// Append a history entry on the given connection (usually a transaction).
    pub async fn record(
        conn: &mut PgConnection,
        input: &CreateVersionHistory,
    ) -> Result<VersionHistory, sqlx::Error> {
        let query = format!(
            "INSERT INTO version_history
                (version_id, action, performed_by, description, changes)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VersionHistory>(&query)
            .bind(input.version_id)
            .bind(input.action.as_str())
            .bind(&input.performed_by)
            .bind(&input.description)
            .bind(&input.changes)
            .fetch_one(conn)
            .await
    }

    /// All history entries of one version, oldest first.
    pub async fn list_for_version(
        pool: &PgPool,
        version_id: DbId,
    ) -> Result<Vec<VersionHistory>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM version_history
             WHERE version_id = $1
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, VersionHistory>(&query)
            .bind(version_id)
            .fetch_all(pool)
            .await
    }

    /// History entries across every version of a key, newest first.
    pub async fn list_for_content(
        pool: &PgPool,
        key: &ContentKey,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ContentAuditEntry>, sqlx::Error> {
        sqlx::query_as::<_, ContentAuditEntry>(
            "SELECT h.id, h.version_id, v.version, h.action, h.performed_by,
                    h.description, h.changes, h.created_at
             FROM version_history h
             JOIN content_versions v ON v.id = h.version_id
             WHERE v.content_type = $1 AND v.content_id = $2
             ORDER BY h.created_at DESC, h.id DESC
             LIMIT $3 OFFSET $4",
        )
        .bind(key.content_type.as_str())
        .bind(&key.content_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Count history entries of one version.
    pub async fn count_for_version(pool: &PgPool, version_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM version_history WHERE version_id = $1")
            .bind(version_id)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }
}
