use crate::types::VersionNumber;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// A request that is well-formed but breaks a domain rule, e.g. deleting
    /// the version a resource currently points at.
    #[error("Rule violation: {0}")]
    RuleViolation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl CoreError {
    /// NotFound for a single version of a content key.
    pub fn version_not_found(
        content_type: &str,
        content_id: &str,
        version: VersionNumber,
    ) -> Self {
        Self::NotFound {
            entity: "Content version",
            key: format!("{content_type}:{content_id}@{version}"),
        }
    }

    /// NotFound for a pointer (`current` / `published`) that is unset.
    pub fn pointer_not_found(pointer: &'static str, content_type: &str, content_id: &str) -> Self {
        Self::NotFound {
            entity: pointer,
            key: format!("{content_type}:{content_id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_not_found_formats_key() {
        let err = CoreError::version_not_found("lesson", "L1", 3);
        assert_eq!(err.to_string(), "Entity not found: Content version lesson:L1@3");
    }

    #[test]
    fn pointer_not_found_formats_key() {
        let err = CoreError::pointer_not_found("Published version", "course", "tr-a1");
        assert_eq!(
            err.to_string(),
            "Entity not found: Published version course:tr-a1"
        );
    }
}
