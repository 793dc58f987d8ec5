//! Handlers for content versioning.
//!
//! Every handler is keyed by the `{content_type}/{content_id}` path pair,
//! parsed into a [`ContentKey`] before any store access. Actor fields left
//! out of a request body fall back to the authenticated user.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use turkce_core::content_type::ContentKey;
use turkce_core::error::CoreError;
use turkce_core::pagination::{
    clamp_limit, clamp_offset, parse_page_param, DEFAULT_AUDIT_LIMIT, MAX_AUDIT_LIMIT,
};
use turkce_core::types::VersionNumber;
use turkce_core::versioning::{self, BulkItemResult, BulkOutcome, VersionStatistics};
use turkce_db::models::content_version::{
    BulkCreateItem, BulkCreateRequest, CompareVersionsParams, ContentVersion,
    CreateContentVersion, DeleteVersionRequest, PublishVersionRequest, RollbackVersionRequest,
    UnpublishVersionRequest, VersionComparison, VersionTimelineEntry,
};
use turkce_db::repositories::{ContentVersionRepo, DeleteResult, VersionHistoryRepo};

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Path and query parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ContentPath {
    pub content_type: String,
    pub content_id: String,
}

impl ContentPath {
    fn key(&self) -> Result<ContentKey, CoreError> {
        ContentKey::parse(&self.content_type, &self.content_id)
    }
}

/// Version segments are taken as text so a malformed number is reported as a
/// validation error in the usual JSON shape.
#[derive(Debug, Deserialize)]
pub struct VersionPath {
    pub content_type: String,
    pub content_id: String,
    pub version: String,
}

impl VersionPath {
    fn parse(&self) -> Result<(ContentKey, VersionNumber), CoreError> {
        let key = ContentKey::parse(&self.content_type, &self.content_id)?;
        let version = versioning::parse_version_number(&self.version)?;
        Ok((key, version))
    }
}

#[derive(Debug, Deserialize)]
pub struct RollbackPath {
    pub content_type: String,
    pub content_id: String,
    pub target_version: String,
}

/// Paging values are taken as text for the same reason as [`VersionPath`].
#[derive(Debug, Deserialize)]
pub struct AuditParams {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl AuditParams {
    fn page(&self) -> Result<(i64, i64), CoreError> {
        let limit = parse_page_param("limit", self.limit.as_deref())?;
        let offset = parse_page_param("offset", self.offset.as_deref())?;
        Ok((
            clamp_limit(limit, DEFAULT_AUDIT_LIMIT, MAX_AUDIT_LIMIT),
            clamp_offset(offset),
        ))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Use the actor named in the body, or the caller when none is given.
fn resolve_actor(explicit: Option<String>, auth: &AuthUser) -> AppResult<String> {
    match explicit.filter(|a| !a.trim().is_empty()) {
        Some(actor) => {
            versioning::validate_actor(&actor)?;
            Ok(actor)
        }
        None => Ok(auth.actor_id()),
    }
}

fn version_not_found(key: &ContentKey, version: VersionNumber) -> AppError {
    AppError::Core(CoreError::version_not_found(
        key.content_type.as_str(),
        &key.content_id,
        version,
    ))
}

/// Fetch one version of a key or fail with NotFound.
async fn ensure_version_exists(
    pool: &sqlx::PgPool,
    key: &ContentKey,
    version: VersionNumber,
) -> AppResult<ContentVersion> {
    ContentVersionRepo::find_by_version(pool, key, version)
        .await?
        .ok_or_else(|| version_not_found(key, version))
}

/// Validate a create payload and fill in its actor.
fn prepare_create(
    mut input: CreateContentVersion,
    auth: &AuthUser,
) -> AppResult<CreateContentVersion> {
    if let Some(ref summary) = input.change_summary {
        versioning::validate_change_summary(summary)?;
    }
    input.created_by = Some(resolve_actor(input.created_by.take(), auth)?);
    Ok(input)
}

// ---------------------------------------------------------------------------
// POST /content/{content_type}/{content_id}/version
// ---------------------------------------------------------------------------

/// Create the next version of a content key and make it current.
pub async fn create_version(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<ContentPath>,
    AppJson(body): AppJson<CreateContentVersion>,
) -> AppResult<impl IntoResponse> {
    let key = path.key()?;
    let input = prepare_create(body, &auth)?;

    let version = ContentVersionRepo::create(&state.pool, &key, &input).await?;

    tracing::info!(
        content_type = %key.content_type,
        content_id = %key.content_id,
        version = version.version,
        user_id = %auth.subject,
        role = %auth.role,
        "Content version created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: version })))
}

// ---------------------------------------------------------------------------
// GET /content/{content_type}/{content_id}/current
// ---------------------------------------------------------------------------

pub async fn get_current_version(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(path): Path<ContentPath>,
) -> AppResult<impl IntoResponse> {
    let key = path.key()?;
    let version = ContentVersionRepo::find_current(&state.pool, &key)
        .await?
        .ok_or_else(|| {
            CoreError::pointer_not_found(
                "Current version",
                key.content_type.as_str(),
                &key.content_id,
            )
        })?;
    Ok(Json(DataResponse { data: version }))
}

// ---------------------------------------------------------------------------
// GET /content/{content_type}/{content_id}/published
// ---------------------------------------------------------------------------

pub async fn get_published_version(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(path): Path<ContentPath>,
) -> AppResult<impl IntoResponse> {
    let key = path.key()?;
    let version = ContentVersionRepo::find_published(&state.pool, &key)
        .await?
        .ok_or_else(|| {
            CoreError::pointer_not_found(
                "Published version",
                key.content_type.as_str(),
                &key.content_id,
            )
        })?;
    Ok(Json(DataResponse { data: version }))
}

// ---------------------------------------------------------------------------
// GET /content/{content_type}/{content_id}/history
// ---------------------------------------------------------------------------

/// All versions of a key, newest first. Unknown keys yield an empty list.
pub async fn get_version_history(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(path): Path<ContentPath>,
) -> AppResult<impl IntoResponse> {
    let key = path.key()?;
    let versions = ContentVersionRepo::list_for_content(&state.pool, &key).await?;

    tracing::debug!(
        count = versions.len(),
        content_type = %key.content_type,
        content_id = %key.content_id,
        "Listed content versions"
    );

    Ok(Json(DataResponse { data: versions }))
}

// ---------------------------------------------------------------------------
// GET /content/{content_type}/{content_id}/timeline
// ---------------------------------------------------------------------------

/// Per-version summaries without content payloads, newest first.
pub async fn get_version_timeline(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(path): Path<ContentPath>,
) -> AppResult<impl IntoResponse> {
    let key = path.key()?;
    let timeline: Vec<VersionTimelineEntry> =
        ContentVersionRepo::list_for_content(&state.pool, &key)
            .await?
            .into_iter()
            .map(VersionTimelineEntry::from)
            .collect();
    Ok(Json(DataResponse { data: timeline }))
}

// ---------------------------------------------------------------------------
// GET /content/{content_type}/{content_id}/audit
// ---------------------------------------------------------------------------

/// History entries across all versions of a key, newest first.
pub async fn list_content_audit(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(path): Path<ContentPath>,
    Query(params): Query<AuditParams>,
) -> AppResult<impl IntoResponse> {
    let key = path.key()?;
    let (limit, offset) = params.page()?;

    let entries = VersionHistoryRepo::list_for_content(&state.pool, &key, limit, offset).await?;
    Ok(Json(DataResponse { data: entries }))
}

// ---------------------------------------------------------------------------
// GET /content/{content_type}/{content_id}/version/{version}
// ---------------------------------------------------------------------------

pub async fn get_specific_version(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(path): Path<VersionPath>,
) -> AppResult<impl IntoResponse> {
    let (key, version) = path.parse()?;
    let found = ensure_version_exists(&state.pool, &key, version).await?;
    Ok(Json(DataResponse { data: found }))
}

// ---------------------------------------------------------------------------
// DELETE /content/{content_type}/{content_id}/version/{version}
// ---------------------------------------------------------------------------

/// Delete a version that is neither current nor published.
pub async fn delete_version(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<VersionPath>,
    body: Option<AppJson<DeleteVersionRequest>>,
) -> AppResult<StatusCode> {
    let (key, version) = path.parse()?;
    let AppJson(body) = body.unwrap_or_default();
    let actor = resolve_actor(body.deleted_by, &auth)?;

    match ContentVersionRepo::delete(&state.pool, &key, version, Some(&actor)).await? {
        DeleteResult::Deleted => {
            tracing::info!(
                content_type = %key.content_type,
                content_id = %key.content_id,
                version,
                deleted_by = %actor,
                user_id = %auth.subject,
                role = %auth.role,
                "Content version deleted"
            );
            Ok(StatusCode::NO_CONTENT)
        }
        DeleteResult::NotFound => Err(version_not_found(&key, version)),
        DeleteResult::Blocked(block) => Err(AppError::Core(block.into())),
    }
}

// ---------------------------------------------------------------------------
// GET /content/{content_type}/{content_id}/version/{version}/history
// ---------------------------------------------------------------------------

/// Audit trail of one version, oldest first.
pub async fn get_version_audit(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(path): Path<VersionPath>,
) -> AppResult<impl IntoResponse> {
    let (key, version) = path.parse()?;
    let found = ensure_version_exists(&state.pool, &key, version).await?;
    let entries = VersionHistoryRepo::list_for_version(&state.pool, found.id).await?;
    Ok(Json(DataResponse { data: entries }))
}

// ---------------------------------------------------------------------------
// POST /content/{content_type}/{content_id}/version/{version}/publish
// ---------------------------------------------------------------------------

/// Make a version the published one, replacing any previously published.
pub async fn publish_version(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<VersionPath>,
    body: Option<AppJson<PublishVersionRequest>>,
) -> AppResult<impl IntoResponse> {
    let (key, version) = path.parse()?;
    let AppJson(body) = body.unwrap_or_default();
    let actor = resolve_actor(body.published_by, &auth)?;

    let published = ContentVersionRepo::publish(&state.pool, &key, version, Some(&actor))
        .await?
        .ok_or_else(|| version_not_found(&key, version))?;

    tracing::info!(
        content_type = %key.content_type,
        content_id = %key.content_id,
        version,
        published_by = %actor,
        user_id = %auth.subject,
        role = %auth.role,
        "Content version published"
    );

    Ok(Json(DataResponse { data: published }))
}

// ---------------------------------------------------------------------------
// POST /content/{content_type}/{content_id}/version/{version}/unpublish
// ---------------------------------------------------------------------------

pub async fn unpublish_version(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<VersionPath>,
    body: Option<AppJson<UnpublishVersionRequest>>,
) -> AppResult<impl IntoResponse> {
    let (key, version) = path.parse()?;
    let AppJson(body) = body.unwrap_or_default();
    let actor = resolve_actor(body.unpublished_by, &auth)?;

    let unpublished = ContentVersionRepo::unpublish(&state.pool, &key, version, Some(&actor))
        .await?
        .ok_or_else(|| version_not_found(&key, version))?;

    tracing::info!(
        content_type = %key.content_type,
        content_id = %key.content_id,
        version,
        unpublished_by = %actor,
        user_id = %auth.subject,
        role = %auth.role,
        "Content version unpublished"
    );

    Ok(Json(DataResponse { data: unpublished }))
}

// ---------------------------------------------------------------------------
// POST /content/{content_type}/{content_id}/rollback/{target_version}
// ---------------------------------------------------------------------------

/// Create a new current version carrying the content of an older one.
pub async fn rollback_to_version(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<RollbackPath>,
    body: Option<AppJson<RollbackVersionRequest>>,
) -> AppResult<impl IntoResponse> {
    let key = ContentKey::parse(&path.content_type, &path.content_id)?;
    let target = versioning::parse_version_number(&path.target_version)?;
    let AppJson(body) = body.unwrap_or_default();
    let actor = resolve_actor(body.rolled_back_by, &auth)?;

    let created = ContentVersionRepo::rollback(&state.pool, &key, target, Some(&actor))
        .await?
        .ok_or_else(|| version_not_found(&key, target))?;

    tracing::info!(
        content_type = %key.content_type,
        content_id = %key.content_id,
        from_version = target,
        new_version = created.version,
        rolled_back_by = %actor,
        user_id = %auth.subject,
        role = %auth.role,
        "Content rolled back"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

// ---------------------------------------------------------------------------
// GET /content/{content_type}/{content_id}/compare
// ---------------------------------------------------------------------------

/// Shallow key-level comparison of two versions.
pub async fn compare_versions(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(path): Path<ContentPath>,
    Query(params): Query<CompareVersionsParams>,
) -> AppResult<impl IntoResponse> {
    let key = path.key()?;
    let (v1, v2) = params.parse()?;

    let version1 = ensure_version_exists(&state.pool, &key, v1).await?;
    let version2 = ensure_version_exists(&state.pool, &key, v2).await?;
    let differences = turkce_core::diff::compute_key_diff(&version1.content, &version2.content);

    Ok(Json(DataResponse {
        data: VersionComparison {
            version1,
            version2,
            differences,
        },
    }))
}

// ---------------------------------------------------------------------------
// GET /content/{content_type}/{content_id}/statistics
// ---------------------------------------------------------------------------

pub async fn get_version_statistics(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(path): Path<ContentPath>,
) -> AppResult<impl IntoResponse> {
    let key = path.key()?;
    let versions = ContentVersionRepo::list_for_content(&state.pool, &key).await?;
    let facts: Vec<_> = versions.iter().map(ContentVersion::facts).collect();
    let stats = VersionStatistics::from_versions(&facts, chrono::Utc::now());
    Ok(Json(DataResponse { data: stats }))
}

// ---------------------------------------------------------------------------
// POST /bulk
// ---------------------------------------------------------------------------

/// Create one version per item, independently and in order.
///
/// A failing item is reported in its result slot and does not affect the
/// others; items created before it stay created.
pub async fn bulk_create_versions(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(body): AppJson<BulkCreateRequest>,
) -> AppResult<impl IntoResponse> {
    versioning::validate_bulk_size(body.items.len())?;

    let mut results = Vec::with_capacity(body.items.len());
    for (index, item) in body.items.iter().enumerate() {
        match create_bulk_item(&state.pool, &auth, item).await {
            Ok(version) => results.push(BulkItemResult::Created { version }),
            Err(err) => {
                tracing::warn!(
                    index,
                    content_type = %item.content_type,
                    content_id = %item.content_id,
                    error = %err,
                    "Bulk version create failed"
                );
                results.push(BulkItemResult::Failed {
                    content_type: item.content_type.clone(),
                    content_id: item.content_id.clone(),
                    error: err.public_message(),
                });
            }
        }
    }

    let outcome = BulkOutcome::from(results);
    tracing::info!(
        created = outcome.created,
        failed = outcome.failed,
        user_id = %auth.subject,
        role = %auth.role,
        "Bulk version create finished"
    );

    Ok(Json(DataResponse { data: outcome }))
}

async fn create_bulk_item(
    pool: &sqlx::PgPool,
    auth: &AuthUser,
    item: &BulkCreateItem,
) -> AppResult<ContentVersion> {
    let key = ContentKey::parse(&item.content_type, &item.content_id)?;
    let input = prepare_create(item.to_create(), auth)?;
    Ok(ContentVersionRepo::create(pool, &key, &input).await?)
}
