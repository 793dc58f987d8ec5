//! Repository for the `content_versions` and `content_heads` tables.
//!
//! Every state change on a content key runs in one transaction that first
//! locks the key's `content_heads` row, so version numbering and the
//! current/published pointers never race. History entries are written in the
//! same transaction.

use serde_json::json;
use sqlx::{PgConnection, PgPool};
use turkce_core::content_type::ContentKey;
use turkce_core::history::HistoryAction;
use turkce_core::types::{DbId, VersionNumber};
use turkce_core::versioning::{
    check_deletable, deleted_description, published_description, rollback_summary,
    unpublished_description, DeleteBlock,
};

use crate::models::content_version::{ContentHead, ContentVersion, CreateContentVersion};
use crate::models::version_history::CreateVersionHistory;
use crate::repositories::VersionHistoryRepo;

/// Version columns joined with the pointer flags derived from `content_heads`.
const SELECT_VERSIONS: &str = "SELECT v.id, v.content_type, v.content_id, v.version, \
    v.content, v.metadata, v.created_by, v.change_summary, \
    COALESCE(h.published_version_id = v.id, false) AS is_published, \
    COALESCE(h.current_version_id = v.id, false) AS is_current, \
    v.created_at, v.updated_at \
    FROM content_versions v \
    JOIN content_heads h ON h.content_type = v.content_type AND h.content_id = v.content_id";

/// Column list for content_heads queries.
const HEAD_COLUMNS: &str = "id, content_type, content_id, latest_version, \
    current_version_id, published_version_id, created_at, updated_at";

/// Outcome of [`ContentVersionRepo::delete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteResult {
    Deleted,
    NotFound,
    Blocked(DeleteBlock),
}

/// Provides the version store operations for versioned content.
pub struct ContentVersionRepo;

impl ContentVersionRepo {
    // ── Reads ────────────────────────────────────────────────────────

    /// Find a version by its internal ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ContentVersion>, sqlx::Error> {
        let query = format!("{SELECT_VERSIONS} WHERE v.id = $1");
        sqlx::query_as::<_, ContentVersion>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The version the key's current pointer names.
    pub async fn find_current(
        pool: &PgPool,
        key: &ContentKey,
    ) -> Result<Option<ContentVersion>, sqlx::Error> {
        let query = format!(
            "{SELECT_VERSIONS}
             WHERE h.content_type = $1 AND h.content_id = $2
               AND v.id = h.current_version_id"
        );
        sqlx::query_as::<_, ContentVersion>(&query)
            .bind(key.content_type.as_str())
            .bind(&key.content_id)
            .fetch_optional(pool)
            .await
    }

    /// The version the key's published pointer names.
    pub async fn find_published(
        pool: &PgPool,
        key: &ContentKey,
    ) -> Result<Option<ContentVersion>, sqlx::Error> {
        let query = format!(
            "{SELECT_VERSIONS}
             WHERE h.content_type = $1 AND h.content_id = $2
               AND v.id = h.published_version_id"
        );
        sqlx::query_as::<_, ContentVersion>(&query)
            .bind(key.content_type.as_str())
            .bind(&key.content_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a specific version number of a key.
    pub async fn find_by_version(
        pool: &PgPool,
        key: &ContentKey,
        version: VersionNumber,
    ) -> Result<Option<ContentVersion>, sqlx::Error> {
        let query = format!(
            "{SELECT_VERSIONS}
             WHERE v.content_type = $1 AND v.content_id = $2 AND v.version = $3"
        );
        sqlx::query_as::<_, ContentVersion>(&query)
            .bind(key.content_type.as_str())
            .bind(&key.content_id)
            .bind(version)
            .fetch_optional(pool)
            .await
    }

    /// List all versions of a key, ordered by version number descending.
    pub async fn list_for_content(
        pool: &PgPool,
        key: &ContentKey,
    ) -> Result<Vec<ContentVersion>, sqlx::Error> {
        let query = format!(
            "{SELECT_VERSIONS}
             WHERE v.content_type = $1 AND v.content_id = $2
             ORDER BY v.version DESC"
        );
        sqlx::query_as::<_, ContentVersion>(&query)
            .bind(key.content_type.as_str())
            .bind(&key.content_id)
            .fetch_all(pool)
            .await
    }

    /// Find the pointer record of a key.
    pub async fn find_head(
        pool: &PgPool,
        key: &ContentKey,
    ) -> Result<Option<ContentHead>, sqlx::Error> {
        let query = format!(
            "SELECT {HEAD_COLUMNS} FROM content_heads
             WHERE content_type = $1 AND content_id = $2"
        );
        sqlx::query_as::<_, ContentHead>(&query)
            .bind(key.content_type.as_str())
            .bind(&key.content_id)
            .fetch_optional(pool)
            .await
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Create the next version of a key and make it current.
    ///
    /// The first version of a key is 1. The new version is never published.
    pub async fn create(
        pool: &PgPool,
        key: &ContentKey,
        input: &CreateContentVersion,
    ) -> Result<ContentVersion, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let id = Self::insert_next_version(&mut tx, key, input).await?;
        let version = Self::fetch_by_id(&mut tx, id).await?;
        tx.commit().await?;
        Ok(version)
    }

    /// Move the published pointer to `version`.
    ///
    /// Returns `None` (and changes nothing) if the version does not exist.
    pub async fn publish(
        pool: &PgPool,
        key: &ContentKey,
        version: VersionNumber,
        published_by: Option<&str>,
    ) -> Result<Option<ContentVersion>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(head) = Self::lock_head(&mut tx, key).await? else {
            return Ok(None);
        };
        let Some(target_id) = Self::find_version_id(&mut tx, key, version).await? else {
            return Ok(None);
        };

        let previous = head.published_version_id;
        if let Some(previous_id) = previous.filter(|id| *id != target_id) {
            Self::touch(&mut tx, previous_id).await?;
        }

        sqlx::query("UPDATE content_heads SET published_version_id = $1 WHERE id = $2")
            .bind(target_id)
            .bind(head.id)
            .execute(&mut *tx)
            .await?;
        Self::touch(&mut tx, target_id).await?;

        VersionHistoryRepo::record(
            &mut tx,
            &CreateVersionHistory {
                version_id: target_id,
                action: HistoryAction::Published,
                performed_by: published_by.map(str::to_string),
                description: Some(published_description(version)),
                changes: Some(json!({ "previous_published_version_id": previous })),
            },
        )
        .await?;

        let published = Self::fetch_by_id(&mut tx, target_id).await?;
        tx.commit().await?;
        Ok(Some(published))
    }

    /// Clear the published pointer if it names `version`.
    ///
    /// Unpublishing a version that is not published still records history.
    /// Returns `None` if the version does not exist.
    pub async fn unpublish(
        pool: &PgPool,
        key: &ContentKey,
        version: VersionNumber,
        unpublished_by: Option<&str>,
    ) -> Result<Option<ContentVersion>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(head) = Self::lock_head(&mut tx, key).await? else {
            return Ok(None);
        };
        let Some(target_id) = Self::find_version_id(&mut tx, key, version).await? else {
            return Ok(None);
        };

        let was_published = head.published_version_id == Some(target_id);
        if was_published {
            sqlx::query("UPDATE content_heads SET published_version_id = NULL WHERE id = $1")
                .bind(head.id)
                .execute(&mut *tx)
                .await?;
        }
        Self::touch(&mut tx, target_id).await?;

        VersionHistoryRepo::record(
            &mut tx,
            &CreateVersionHistory {
                version_id: target_id,
                action: HistoryAction::Unpublished,
                performed_by: unpublished_by.map(str::to_string),
                description: Some(unpublished_description(version)),
                changes: Some(json!({ "was_published": was_published })),
            },
        )
        .await?;

        let unpublished = Self::fetch_by_id(&mut tx, target_id).await?;
        tx.commit().await?;
        Ok(Some(unpublished))
    }

    /// Create a new current version carrying the content of `target`.
    ///
    /// The target row and the published pointer are left untouched. Both a
    /// `created` and a `rollback` entry are recorded on the new version.
    /// Returns `None` if the target does not exist.
    pub async fn rollback(
        pool: &PgPool,
        key: &ContentKey,
        target: VersionNumber,
        rolled_back_by: Option<&str>,
    ) -> Result<Option<ContentVersion>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let source: Option<(serde_json::Value, Option<serde_json::Value>)> = sqlx::query_as(
            "SELECT content, metadata FROM content_versions
             WHERE content_type = $1 AND content_id = $2 AND version = $3",
        )
        .bind(key.content_type.as_str())
        .bind(&key.content_id)
        .bind(target)
        .fetch_optional(&mut *tx)
        .await?;
        let Some((content, metadata)) = source else {
            return Ok(None);
        };

        let summary = rollback_summary(target);
        let input = CreateContentVersion {
            content,
            metadata,
            created_by: rolled_back_by.map(str::to_string),
            change_summary: Some(summary.clone()),
        };
        let new_id = Self::insert_next_version(&mut tx, key, &input).await?;

        VersionHistoryRepo::record(
            &mut tx,
            &CreateVersionHistory {
                version_id: new_id,
                action: HistoryAction::Rollback,
                performed_by: input.created_by.clone(),
                description: Some(summary),
                changes: Some(json!({ "from_version": target })),
            },
        )
        .await?;

        let created = Self::fetch_by_id(&mut tx, new_id).await?;
        tx.commit().await?;
        Ok(Some(created))
    }

    /// Delete a version that is neither current nor published.
    ///
    /// A `deleted` entry is recorded before the row is removed; it is removed
    /// with the rest of the version's history by the cascade.
    pub async fn delete(
        pool: &PgPool,
        key: &ContentKey,
        version: VersionNumber,
        deleted_by: Option<&str>,
    ) -> Result<DeleteResult, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(head) = Self::lock_head(&mut tx, key).await? else {
            return Ok(DeleteResult::NotFound);
        };
        let Some(target_id) = Self::find_version_id(&mut tx, key, version).await? else {
            return Ok(DeleteResult::NotFound);
        };

        if let Err(block) = check_deletable(
            head.current_version_id == Some(target_id),
            head.published_version_id == Some(target_id),
        ) {
            return Ok(DeleteResult::Blocked(block));
        }

        VersionHistoryRepo::record(
            &mut tx,
            &CreateVersionHistory {
                version_id: target_id,
                action: HistoryAction::Deleted,
                performed_by: deleted_by.map(str::to_string),
                description: Some(deleted_description(version)),
                changes: None,
            },
        )
        .await?;

        sqlx::query("DELETE FROM content_versions WHERE id = $1")
            .bind(target_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(DeleteResult::Deleted)
    }

    // ── Transaction helpers ──────────────────────────────────────────

    /// Assign the next version number, insert the row, move the current
    /// pointer to it, and record `created`. Returns the new row's id.
    ///
    /// The upsert on `content_heads` is an atomic increment-and-fetch that
    /// holds the head row lock until the surrounding transaction ends.
    async fn insert_next_version(
        conn: &mut PgConnection,
        key: &ContentKey,
        input: &CreateContentVersion,
    ) -> Result<DbId, sqlx::Error> {
        let (version, previous_current): (VersionNumber, Option<DbId>) = sqlx::query_as(
            "INSERT INTO content_heads (content_type, content_id, latest_version)
             VALUES ($1, $2, 1)
             ON CONFLICT (content_type, content_id)
             DO UPDATE SET latest_version = content_heads.latest_version + 1
             RETURNING latest_version, current_version_id",
        )
        .bind(key.content_type.as_str())
        .bind(&key.content_id)
        .fetch_one(&mut *conn)
        .await?;
        tracing::debug!(
            content_type = %key.content_type,
            content_id = %key.content_id,
            version,
            "Assigned version number"
        );

        if let Some(previous_id) = previous_current {
            Self::touch(conn, previous_id).await?;
        }

        let (id,): (DbId,) = sqlx::query_as(
            "INSERT INTO content_versions
                (content_type, content_id, version, content, metadata, created_by, change_summary)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id",
        )
        .bind(key.content_type.as_str())
        .bind(&key.content_id)
        .bind(version)
        .bind(&input.content)
        .bind(&input.metadata)
        .bind(&input.created_by)
        .bind(&input.change_summary)
        .fetch_one(&mut *conn)
        .await?;

        sqlx::query(
            "UPDATE content_heads SET current_version_id = $3
             WHERE content_type = $1 AND content_id = $2",
        )
        .bind(key.content_type.as_str())
        .bind(&key.content_id)
        .bind(id)
        .execute(&mut *conn)
        .await?;

        VersionHistoryRepo::record(
            conn,
            &CreateVersionHistory {
                version_id: id,
                action: HistoryAction::Created,
                performed_by: input.created_by.clone(),
                description: input.change_summary.clone(),
                changes: Some(json!({ "version": version })),
            },
        )
        .await?;

        Ok(id)
    }

    /// Lock the key's head row for the rest of the transaction.
    async fn lock_head(
        conn: &mut PgConnection,
        key: &ContentKey,
    ) -> Result<Option<ContentHead>, sqlx::Error> {
        let query = format!(
            "SELECT {HEAD_COLUMNS} FROM content_heads
             WHERE content_type = $1 AND content_id = $2
             FOR UPDATE"
        );
        sqlx::query_as::<_, ContentHead>(&query)
            .bind(key.content_type.as_str())
            .bind(&key.content_id)
            .fetch_optional(conn)
            .await
    }

    async fn find_version_id(
        conn: &mut PgConnection,
        key: &ContentKey,
        version: VersionNumber,
    ) -> Result<Option<DbId>, sqlx::Error> {
        let row: Option<(DbId,)> = sqlx::query_as(
            "SELECT id FROM content_versions
             WHERE content_type = $1 AND content_id = $2 AND version = $3",
        )
        .bind(key.content_type.as_str())
        .bind(&key.content_id)
        .bind(version)
        .fetch_optional(conn)
        .await?;
        Ok(row.map(|(id,)| id))
    }

    /// Bump `updated_at` on a version whose current/published role changed.
    async fn touch(conn: &mut PgConnection, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE content_versions SET updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(())
    }

    async fn fetch_by_id(conn: &mut PgConnection, id: DbId) -> Result<ContentVersion, sqlx::Error> {
        let query = format!("{SELECT_VERSIONS} WHERE v.id = $1");
        sqlx::query_as::<_, ContentVersion>(&query)
            .bind(id)
            .fetch_one(conn)
            .await
    }
}
