//! Actions recorded in the `version_history` audit trail.

use serde::{Deserialize, Serialize};

/// A state-changing action taken against a content version.
///
/// `Updated` is accepted by the schema for parity with older audit rows but is
/// never written by the versioning operations, since versions are immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    Created,
    Updated,
    Published,
    Unpublished,
    Rollback,
    Deleted,
}

impl HistoryAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Published => "published",
            Self::Unpublished => "unpublished",
            Self::Rollback => "rollback",
            Self::Deleted => "deleted",
        }
    }
}

impl std::fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_string_matches_serialized_form() {
        for action in [
            HistoryAction::Created,
            HistoryAction::Updated,
            HistoryAction::Published,
            HistoryAction::Unpublished,
            HistoryAction::Rollback,
            HistoryAction::Deleted,
        ] {
            let json = serde_json::to_string(&action).unwrap();
            assert_eq!(json, format!("\"{}\"", action.as_str()));
        }
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&HistoryAction::Unpublished).unwrap();
        assert_eq!(json, "\"unpublished\"");
    }
}
