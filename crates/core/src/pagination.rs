//! Pagination defaults and clamping helpers shared by list endpoints.

use crate::error::CoreError;

/// Default page size for audit listings.
pub const DEFAULT_AUDIT_LIMIT: i64 = 50;

/// Maximum page size for audit listings.
pub const MAX_AUDIT_LIMIT: i64 = 200;

/// Clamp a user-provided limit to `[1, max]`, falling back to `default`.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

/// Parse an optional `limit`/`offset` query value.
///
/// Absent or blank values yield `None`; anything that is not an integer is a
/// validation error naming the parameter.
pub fn parse_page_param(name: &str, raw: Option<&str>) -> Result<Option<i64>, CoreError> {
    match raw.map(str::trim).filter(|r| !r.is_empty()) {
        None => Ok(None),
        Some(r) => r.parse().map(Some).map_err(|_| {
            CoreError::Validation(format!("Query parameter '{name}' must be an integer, got '{r}'"))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn clamp_limit_uses_default_when_none() {
        assert_eq!(clamp_limit(None, DEFAULT_AUDIT_LIMIT, MAX_AUDIT_LIMIT), 50);
    }

    #[test]
    fn clamp_limit_respects_max() {
        assert_eq!(clamp_limit(Some(1000), DEFAULT_AUDIT_LIMIT, MAX_AUDIT_LIMIT), 200);
    }

    #[test]
    fn clamp_limit_floors_at_one() {
        assert_eq!(clamp_limit(Some(0), 20, 100), 1);
        assert_eq!(clamp_limit(Some(-3), 20, 100), 1);
    }

    #[test]
    fn clamp_offset_floors_at_zero() {
        assert_eq!(clamp_offset(None), 0);
        assert_eq!(clamp_offset(Some(-10)), 0);
        assert_eq!(clamp_offset(Some(40)), 40);
    }

    #[test]
    fn page_param_accepts_integers_and_absence() {
        assert_eq!(parse_page_param("limit", None).unwrap(), None);
        assert_eq!(parse_page_param("limit", Some("")).unwrap(), None);
        assert_eq!(parse_page_param("offset", Some("25")).unwrap(), Some(25));
        assert_eq!(parse_page_param("offset", Some("-4")).unwrap(), Some(-4));
    }

    #[test]
    fn page_param_rejects_non_integers() {
        assert_matches!(
            parse_page_param("limit", Some("ten")),
            Err(CoreError::Validation(ref msg)) if msg.contains("limit")
        );
        assert_matches!(parse_page_param("offset", Some("1.5")), Err(CoreError::Validation(_)));
    }
}
