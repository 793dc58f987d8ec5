//! Bearer token verification.
//!
//! Tokens are issued by the platform's identity service and signed with the
//! shared `JWT_SECRET` (HS256). This service only verifies them; the subject
//! becomes the actor recorded on versions and history entries.
//! [`issue_token`] exists for operator tooling and tests.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Default clock skew tolerated when checking `exp`, in seconds.
const DEFAULT_LEEWAY_SECS: u64 = 30;

/// Claims this service reads from a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Actor id of the caller.
    pub sub: String,
    /// Platform role (`"editor"`, `"admin"`, ...).
    pub role: String,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
    /// Issue time, seconds since the Unix epoch.
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// Token verification settings.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared HS256 secret.
    pub secret: String,
    /// When set, tokens must carry this `iss`.
    pub issuer: Option<String>,
    pub leeway_secs: u64,
}

impl JwtConfig {
    /// Load verification settings from the environment.
    ///
    /// | Env Var           | Required | Default |
    /// |-------------------|----------|---------|
    /// | `JWT_SECRET`      | **yes**  | --      |
    /// | `JWT_ISSUER`      | no       | unset   |
    /// | `JWT_LEEWAY_SECS` | no       | `30`    |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is missing or empty, or the leeway is not a number.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let issuer = std::env::var("JWT_ISSUER")
            .ok()
            .filter(|iss| !iss.trim().is_empty());

        let leeway_secs = std::env::var("JWT_LEEWAY_SECS")
            .map(|raw| raw.parse().expect("JWT_LEEWAY_SECS must be a valid u64"))
            .unwrap_or(DEFAULT_LEEWAY_SECS);

        Self {
            secret,
            issuer,
            leeway_secs,
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.leeway_secs;
        if let Some(ref issuer) = self.issuer {
            validation.set_issuer(&[issuer]);
        }
        validation
    }
}

/// Verify a token's signature, expiry and (if configured) issuer.
pub fn validate_token(token: &str, config: &JwtConfig) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &config.validation(),
    )?;
    Ok(data.claims)
}

/// Sign a token for `subject` valid for `ttl_mins` minutes.
pub fn issue_token(
    subject: &str,
    role: &str,
    ttl_mins: i64,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: subject.to_string(),
        role: role.to_string(),
        exp: now + ttl_mins * 60,
        iat: now,
        iss: config.issuer.clone(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use jsonwebtoken::errors::ErrorKind;

    fn config(secret: &str, issuer: Option<&str>) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
            issuer: issuer.map(str::to_string),
            leeway_secs: 0,
        }
    }

    fn kind(result: Result<Claims, jsonwebtoken::errors::Error>) -> Result<Claims, ErrorKind> {
        result.map_err(|e| e.into_kind())
    }

    #[test]
    fn issued_token_verifies() {
        let config = config("versioning-secret", None);
        let token = issue_token("editor-12", "editor", 15, &config).unwrap();

        let claims = validate_token(&token, &config).unwrap();
        assert_eq!(claims.sub, "editor-12");
        assert_eq!(claims.role, "editor");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = config("versioning-secret", None);
        let token = issue_token("editor-12", "editor", -5, &config).unwrap();

        assert_matches!(
            kind(validate_token(&token, &config)),
            Err(ErrorKind::ExpiredSignature)
        );
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = issue_token("editor-12", "editor", 15, &config("alpha", None)).unwrap();

        assert_matches!(
            kind(validate_token(&token, &config("bravo", None))),
            Err(ErrorKind::InvalidSignature)
        );
    }

    #[test]
    fn issuer_is_enforced_when_configured() {
        let strict = config("shared", Some("identity.turkce"));
        let foreign = issue_token("u1", "editor", 15, &config("shared", Some("elsewhere"))).unwrap();
        let unnamed = issue_token("u1", "editor", 15, &config("shared", None)).unwrap();
        let ours = issue_token("u1", "editor", 15, &strict).unwrap();

        assert_matches!(kind(validate_token(&foreign, &strict)), Err(ErrorKind::InvalidIssuer));
        assert!(validate_token(&unnamed, &strict).is_err());
        assert_eq!(validate_token(&ours, &strict).unwrap().iss.as_deref(), Some("identity.turkce"));
    }
}
