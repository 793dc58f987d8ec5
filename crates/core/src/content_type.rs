//! Content type tags for versioned learning resources.
//!
//! The tag is stored as text in `content_versions.content_type` and
//! `content_heads.content_type`; a CHECK constraint in the schema mirrors
//! [`ContentType::ALL`].

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum length of a content id (`content_versions.content_id`).
pub const MAX_CONTENT_ID_LENGTH: usize = 255;

/// Kind of learning resource a version belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Course,
    Unit,
    Lesson,
    Exercise,
    Vocabulary,
    Grammar,
}

impl ContentType {
    pub const ALL: [ContentType; 6] = [
        Self::Course,
        Self::Unit,
        Self::Lesson,
        Self::Exercise,
        Self::Vocabulary,
        Self::Grammar,
    ];

    /// Parse a content type tag from a path segment or database value.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "course" => Ok(Self::Course),
            "unit" => Ok(Self::Unit),
            "lesson" => Ok(Self::Lesson),
            "exercise" => Ok(Self::Exercise),
            "vocabulary" => Ok(Self::Vocabulary),
            "grammar" => Ok(Self::Grammar),
            _ => Err(CoreError::Validation(format!(
                "Invalid content type '{s}'. Must be one of: \
                 course, unit, lesson, exercise, vocabulary, grammar"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Course => "course",
            Self::Unit => "unit",
            Self::Lesson => "lesson",
            Self::Exercise => "exercise",
            Self::Vocabulary => "vocabulary",
            Self::Grammar => "grammar",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validate a content id: non-empty, no surrounding whitespace, and within
/// [`MAX_CONTENT_ID_LENGTH`].
pub fn validate_content_id(content_id: &str) -> Result<(), CoreError> {
    if content_id.trim().is_empty() {
        return Err(CoreError::Validation(
            "Content id must not be empty".to_string(),
        ));
    }
    if content_id.trim().len() != content_id.len() {
        return Err(CoreError::Validation(
            "Content id must not have leading or trailing whitespace".to_string(),
        ));
    }
    if content_id.len() > MAX_CONTENT_ID_LENGTH {
        return Err(CoreError::Validation(format!(
            "Content id must not exceed {MAX_CONTENT_ID_LENGTH} characters, got {}",
            content_id.len()
        )));
    }
    Ok(())
}

/// Identity of one versioned resource: all of its versions share this key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentKey {
    pub content_type: ContentType,
    pub content_id: String,
}

impl ContentKey {
    /// Build a key from raw path segments, validating both parts.
    pub fn parse(content_type: &str, content_id: &str) -> Result<Self, CoreError> {
        let content_type = ContentType::from_str_db(content_type)?;
        validate_content_id(content_id)?;
        Ok(Self {
            content_type,
            content_id: content_id.to_string(),
        })
    }
}

impl std::fmt::Display for ContentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.content_type, self.content_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn parses_every_known_tag() {
        for ct in ContentType::ALL {
            assert_eq!(ContentType::from_str_db(ct.as_str()).unwrap(), ct);
        }
    }

    #[test]
    fn rejects_unknown_tag() {
        assert_matches!(
            ContentType::from_str_db("podcast"),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn tags_are_case_sensitive() {
        assert!(ContentType::from_str_db("Lesson").is_err());
    }

    #[test]
    fn display_matches_serde() {
        let json = serde_json::to_string(&ContentType::Vocabulary).unwrap();
        assert_eq!(json, format!("\"{}\"", ContentType::Vocabulary));
    }

    #[test]
    fn content_key_parses_and_displays() {
        let key = ContentKey::parse("lesson", "L1").unwrap();
        assert_eq!(key.content_type, ContentType::Lesson);
        assert_eq!(key.to_string(), "lesson:L1");
    }

    #[test]
    fn content_key_rejects_bad_parts() {
        assert!(ContentKey::parse("lessons", "L1").is_err());
        assert!(ContentKey::parse("lesson", "").is_err());
    }

    #[test]
    fn content_id_validation() {
        assert!(validate_content_id("L1").is_ok());
        assert!(validate_content_id("").is_err());
        assert!(validate_content_id("   ").is_err());
        assert!(validate_content_id(" L1").is_err());
        assert!(validate_content_id(&"x".repeat(MAX_CONTENT_ID_LENGTH)).is_ok());
        assert!(validate_content_id(&"x".repeat(MAX_CONTENT_ID_LENGTH + 1)).is_err());
    }
}
