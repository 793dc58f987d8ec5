//! Content versioning rules, limits, and result shapes.
//!
//! Everything here is pure: the repository layer feeds in row facts and the
//! HTTP layer turns the returned errors into responses.

use serde::Serialize;

use crate::error::CoreError;
use crate::types::{Timestamp, VersionNumber};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum number of items accepted by a single bulk create request.
pub const MAX_BULK_ITEMS: usize = 500;

/// Maximum length of a change summary.
pub const MAX_CHANGE_SUMMARY_LENGTH: usize = 2000;

/// Maximum length of an actor identifier (`created_by`, `performed_by`).
pub const MAX_ACTOR_LENGTH: usize = 255;

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Version numbers start at 1.
pub fn validate_version_number(version: VersionNumber) -> Result<(), CoreError> {
    if version < 1 {
        return Err(CoreError::Validation(format!(
            "Version number must be at least 1, got {version}"
        )));
    }
    Ok(())
}

/// Parse a version number taken from a URL segment.
pub fn parse_version_number(raw: &str) -> Result<VersionNumber, CoreError> {
    let version: VersionNumber = raw.parse().map_err(|_| {
        CoreError::Validation(format!("Version must be a positive integer, got '{raw}'"))
    })?;
    validate_version_number(version)?;
    Ok(version)
}

/// Parse a required version number taken from a query parameter.
pub fn require_version_param(name: &str, raw: Option<&str>) -> Result<VersionNumber, CoreError> {
    match raw {
        Some(raw) => parse_version_number(raw),
        None => Err(CoreError::Validation(format!(
            "Query parameter '{name}' is required"
        ))),
    }
}

pub fn validate_change_summary(summary: &str) -> Result<(), CoreError> {
    if summary.len() > MAX_CHANGE_SUMMARY_LENGTH {
        return Err(CoreError::Validation(format!(
            "Change summary must not exceed {MAX_CHANGE_SUMMARY_LENGTH} characters, got {}",
            summary.len()
        )));
    }
    Ok(())
}

pub fn validate_actor(actor: &str) -> Result<(), CoreError> {
    if actor.len() > MAX_ACTOR_LENGTH {
        return Err(CoreError::Validation(format!(
            "Actor identifier must not exceed {MAX_ACTOR_LENGTH} characters, got {}",
            actor.len()
        )));
    }
    Ok(())
}

pub fn validate_bulk_size(count: usize) -> Result<(), CoreError> {
    if count == 0 {
        return Err(CoreError::Validation(
            "Bulk request must contain at least one item".to_string(),
        ));
    }
    if count > MAX_BULK_ITEMS {
        return Err(CoreError::Validation(format!(
            "Bulk request must not exceed {MAX_BULK_ITEMS} items, got {count}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// History descriptions
// ---------------------------------------------------------------------------

pub fn published_description(version: VersionNumber) -> String {
    format!("Published version {version}")
}

pub fn unpublished_description(version: VersionNumber) -> String {
    format!("Unpublished version {version}")
}

/// Used both as the new version's change summary and the rollback history note.
pub fn rollback_summary(target: VersionNumber) -> String {
    format!("Rolled back to version {target}")
}

pub fn deleted_description(version: VersionNumber) -> String {
    format!("Deleted version {version}")
}

// ---------------------------------------------------------------------------
// Delete guard
// ---------------------------------------------------------------------------

/// Why a version may not be deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteBlock {
    Current,
    Published,
}

impl std::fmt::Display for DeleteBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Current => f.write_str("Cannot delete the current version"),
            Self::Published => f.write_str("Cannot delete a published version"),
        }
    }
}

impl From<DeleteBlock> for CoreError {
    fn from(block: DeleteBlock) -> Self {
        CoreError::RuleViolation(block.to_string())
    }
}

/// A version can be deleted only when it is neither current nor published.
/// The current check wins when both hold.
pub fn check_deletable(is_current: bool, is_published: bool) -> Result<(), DeleteBlock> {
    if is_current {
        return Err(DeleteBlock::Current);
    }
    if is_published {
        return Err(DeleteBlock::Published);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// The subset of a version row that statistics are computed from.
#[derive(Debug, Clone, Copy)]
pub struct VersionFacts<'a> {
    pub version: VersionNumber,
    pub is_current: bool,
    pub is_published: bool,
    pub created_by: Option<&'a str>,
    pub updated_at: Timestamp,
}

/// Aggregate view over every version of one content key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionStatistics {
    pub total_versions: usize,
    /// `0` when the key has no versions.
    pub current_version: VersionNumber,
    pub published_version: Option<VersionNumber>,
    pub last_modified: Timestamp,
    /// Distinct actors, in first-seen order of the input.
    pub created_by: Vec<String>,
}

impl VersionStatistics {
    /// Build statistics from versions ordered newest first.
    ///
    /// `last_modified` is the `updated_at` of the first (highest) version, or
    /// `now` for a key with no versions. Empty actor ids are skipped.
    pub fn from_versions(versions: &[VersionFacts<'_>], now: Timestamp) -> Self {
        let current_version = versions
            .iter()
            .find(|v| v.is_current)
            .map(|v| v.version)
            .unwrap_or(0);
        let published_version = versions.iter().find(|v| v.is_published).map(|v| v.version);
        let last_modified = versions.first().map(|v| v.updated_at).unwrap_or(now);

        let mut created_by: Vec<String> = Vec::new();
        for actor in versions.iter().filter_map(|v| v.created_by) {
            if !actor.is_empty() && !created_by.iter().any(|a| a == actor) {
                created_by.push(actor.to_string());
            }
        }

        Self {
            total_versions: versions.len(),
            current_version,
            published_version,
            last_modified,
            created_by,
        }
    }
}

// ---------------------------------------------------------------------------
// Bulk results
// ---------------------------------------------------------------------------

/// Outcome of one item in a best-effort bulk operation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BulkItemResult<T: Serialize> {
    Created {
        version: T,
    },
    Failed {
        content_type: String,
        content_id: String,
        error: String,
    },
}

impl<T: Serialize> BulkItemResult<T> {
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created { .. })
    }
}

/// All per-item outcomes of a bulk operation, in input order, with counts.
#[derive(Debug, Clone, Serialize)]
pub struct BulkOutcome<T: Serialize> {
    pub created: usize,
    pub failed: usize,
    pub results: Vec<BulkItemResult<T>>,
}

impl<T: Serialize> From<Vec<BulkItemResult<T>>> for BulkOutcome<T> {
    fn from(results: Vec<BulkItemResult<T>>) -> Self {
        let created = results.iter().filter(|r| r.is_created()).count();
        Self {
            created,
            failed: results.len() - created,
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{Duration, Utc};

    fn facts(
        version: VersionNumber,
        is_current: bool,
        is_published: bool,
        created_by: Option<&str>,
        updated_at: Timestamp,
    ) -> VersionFacts<'_> {
        VersionFacts {
            version,
            is_current,
            is_published,
            created_by,
            updated_at,
        }
    }

    // -- validation ----------------------------------------------------------

    #[test]
    fn version_numbers_start_at_one() {
        assert!(validate_version_number(1).is_ok());
        assert_matches!(validate_version_number(0), Err(CoreError::Validation(_)));
        assert_matches!(validate_version_number(-4), Err(CoreError::Validation(_)));
    }

    #[test]
    fn parses_version_segments() {
        assert_eq!(parse_version_number("7").unwrap(), 7);
        assert_matches!(parse_version_number("0"), Err(CoreError::Validation(_)));
        assert_matches!(parse_version_number("-2"), Err(CoreError::Validation(_)));
        assert_matches!(parse_version_number("latest"), Err(CoreError::Validation(_)));
        assert_matches!(parse_version_number(""), Err(CoreError::Validation(_)));
    }

    #[test]
    fn version_query_params_are_required() {
        assert_eq!(require_version_param("version1", Some("3")).unwrap(), 3);
        assert_matches!(
            require_version_param("version1", None),
            Err(CoreError::Validation(ref msg)) if msg.contains("version1")
        );
        assert_matches!(
            require_version_param("version2", Some("abc")),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn bulk_size_bounds() {
        assert!(validate_bulk_size(0).is_err());
        assert!(validate_bulk_size(1).is_ok());
        assert!(validate_bulk_size(MAX_BULK_ITEMS).is_ok());
        assert!(validate_bulk_size(MAX_BULK_ITEMS + 1).is_err());
    }

    #[test]
    fn change_summary_and_actor_limits() {
        assert!(validate_change_summary(&"a".repeat(MAX_CHANGE_SUMMARY_LENGTH)).is_ok());
        assert!(validate_change_summary(&"a".repeat(MAX_CHANGE_SUMMARY_LENGTH + 1)).is_err());
        assert!(validate_actor("editor-7").is_ok());
        assert!(validate_actor(&"a".repeat(MAX_ACTOR_LENGTH + 1)).is_err());
    }

    // -- descriptions --------------------------------------------------------

    #[test]
    fn history_descriptions() {
        assert_eq!(published_description(2), "Published version 2");
        assert_eq!(unpublished_description(2), "Unpublished version 2");
        assert_eq!(rollback_summary(1), "Rolled back to version 1");
        assert_eq!(deleted_description(5), "Deleted version 5");
    }

    // -- delete guard --------------------------------------------------------

    #[test]
    fn plain_version_is_deletable() {
        assert!(check_deletable(false, false).is_ok());
    }

    #[test]
    fn current_and_published_versions_are_blocked() {
        assert_eq!(check_deletable(true, false), Err(DeleteBlock::Current));
        assert_eq!(check_deletable(false, true), Err(DeleteBlock::Published));
        assert_eq!(check_deletable(true, true), Err(DeleteBlock::Current));
    }

    #[test]
    fn delete_block_maps_to_rule_violation() {
        let err: CoreError = DeleteBlock::Published.into();
        assert_matches!(err, CoreError::RuleViolation(msg) if msg == "Cannot delete a published version");
    }

    // -- statistics ----------------------------------------------------------

    #[test]
    fn statistics_for_empty_history() {
        let now = Utc::now();
        let stats = VersionStatistics::from_versions(&[], now);
        assert_eq!(stats.total_versions, 0);
        assert_eq!(stats.current_version, 0);
        assert_eq!(stats.published_version, None);
        assert_eq!(stats.last_modified, now);
        assert!(stats.created_by.is_empty());
    }

    #[test]
    fn statistics_pick_pointers_and_latest_timestamp() {
        let now = Utc::now();
        let newest = now - Duration::minutes(1);
        let versions = [
            facts(3, true, false, Some("ayse"), newest),
            facts(2, false, true, Some("mehmet"), now - Duration::minutes(5)),
            facts(1, false, false, Some("ayse"), now - Duration::minutes(10)),
        ];
        let stats = VersionStatistics::from_versions(&versions, now);
        assert_eq!(stats.total_versions, 3);
        assert_eq!(stats.current_version, 3);
        assert_eq!(stats.published_version, Some(2));
        assert_eq!(stats.last_modified, newest);
        assert_eq!(stats.created_by, vec!["ayse".to_string(), "mehmet".to_string()]);
    }

    #[test]
    fn statistics_skip_missing_and_empty_actors() {
        let now = Utc::now();
        let versions = [
            facts(2, true, false, None, now),
            facts(1, false, false, Some(""), now),
        ];
        let stats = VersionStatistics::from_versions(&versions, now);
        assert!(stats.created_by.is_empty());
    }

    // -- bulk ----------------------------------------------------------------

    #[test]
    fn bulk_outcome_counts_results() {
        let results: Vec<BulkItemResult<i32>> = vec![
            BulkItemResult::Created { version: 1 },
            BulkItemResult::Failed {
                content_type: "podcast".into(),
                content_id: "P1".into(),
                error: "Invalid content type".into(),
            },
            BulkItemResult::Created { version: 1 },
        ];
        let outcome = BulkOutcome::from(results);
        assert_eq!(outcome.created, 2);
        assert_eq!(outcome.failed, 1);
        assert_eq!(outcome.results.len(), 3);
    }

    #[test]
    fn bulk_item_serializes_with_status_tag() {
        let item: BulkItemResult<i32> = BulkItemResult::Failed {
            content_type: "lesson".into(),
            content_id: "L1".into(),
            error: "boom".into(),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["content_id"], "L1");

        let ok: BulkItemResult<i32> = BulkItemResult::Created { version: 7 };
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["status"], "created");
        assert_eq!(json["version"], 7);
    }
}
