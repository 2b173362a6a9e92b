/// Signed identity tokens for DevConnect services
///
/// A token binds a user identity to an issue/expiry window and is signed with
/// HS256 using a process-wide secret. The secret lives in an explicit
/// [`JwtConfig`] that is built once at startup and handed to [`TokenGuard::new`];
/// nothing here reads ambient global state.
///
/// ## Usage
///
/// ```rust
/// use crypto_core::jwt::{JwtConfig, TokenGuard};
/// use uuid::Uuid;
///
/// let config = JwtConfig::new("a-very-long-development-secret-value-123", 3600);
/// let guard = TokenGuard::new(&config);
///
/// let user_id = Uuid::new_v4();
/// let token = guard.issue(user_id).unwrap();
/// assert_eq!(guard.authenticate(Some(&token)).unwrap(), user_id);
/// ```
use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Constants
// ============================================================================

/// Default token lifetime (10 hours)
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 36_000;

/// Minimum secret length accepted in production (256 bits)
const MIN_SECRET_LENGTH: usize = 32;

const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

// ============================================================================
// Data Structures
// ============================================================================

/// JWT claims carried by every DevConnect token
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Token verification failures
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    /// No credential was presented
    #[error("No token, authorization denied")]
    Missing,

    /// Credential failed signature, expiry or structure checks
    #[error("Token is not valid")]
    Invalid,

    /// Token could not be produced
    #[error("Failed to sign token: {0}")]
    Signing(String),
}

/// Signing configuration, loaded once at boot
#[derive(Clone)]
pub struct JwtConfig {
    secret: String,
    token_ttl: Duration,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>, token_ttl_secs: i64) -> Self {
        Self {
            secret: secret.into(),
            token_ttl: Duration::seconds(token_ttl_secs),
        }
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Reject secrets that cannot be used safely.
    ///
    /// An empty secret is never accepted. In production the secret must be at
    /// least 32 bytes long.
    pub fn validate(&self, production: bool) -> Result<()> {
        if self.secret.is_empty() {
            return Err(anyhow!("JWT secret must not be empty"));
        }
        if production && self.secret.len() < MIN_SECRET_LENGTH {
            return Err(anyhow!(
                "JWT secret must be at least {MIN_SECRET_LENGTH} bytes in production"
            ));
        }
        if self.token_ttl <= Duration::zero() {
            return Err(anyhow!("JWT token TTL must be positive"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

// ============================================================================
// Token Guard
// ============================================================================

/// Issues and verifies identity tokens.
///
/// Keys are derived from the configuration at construction time and never
/// change afterwards. Verification results are not cached: every call to
/// [`TokenGuard::authenticate`] re-checks signature and expiry.
#[derive(Clone)]
pub struct TokenGuard {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_ttl: Duration,
}

impl TokenGuard {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            token_ttl: config.token_ttl,
        }
    }

    /// Sign a token for `user_id` that expires `ttl` from now
    pub fn sign(&self, user_id: Uuid, ttl: Duration) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(&Header::new(JWT_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Sign a token with the configured lifetime
    pub fn issue(&self, user_id: Uuid) -> Result<String, TokenError> {
        self.sign(user_id, self.token_ttl)
    }

    /// Verify signature and expiry, returning the decoded claims.
    ///
    /// Verification is all-or-nothing: a token that fails any check yields
    /// no claims at all.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "token verification failed");
                TokenError::Invalid
            })
    }

    /// Turn a raw credential into a trusted identity
    pub fn authenticate(&self, raw_token: Option<&str>) -> Result<Uuid, TokenError> {
        let token = raw_token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(TokenError::Missing)?;

        let claims = self.verify(token)?;

        Uuid::parse_str(&claims.sub).map_err(|_| {
            tracing::warn!("verified token carries a malformed subject");
            TokenError::Invalid
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "test-secret-that-is-long-enough-for-hs256";

    fn guard() -> TokenGuard {
        TokenGuard::new(&JwtConfig::new(TEST_SECRET, DEFAULT_TOKEN_TTL_SECS))
    }

    #[test]
    fn test_issue_and_authenticate() {
        let guard = guard();
        let user_id = Uuid::new_v4();

        let token = guard.issue(user_id).expect("issue token");
        assert_eq!(token.matches('.').count(), 2);
        assert_eq!(guard.authenticate(Some(&token)), Ok(user_id));
    }

    #[test]
    fn test_issued_token_uses_configured_ttl() {
        let guard = guard();
        let token = guard.issue(Uuid::new_v4()).unwrap();

        let claims = guard.verify(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, DEFAULT_TOKEN_TTL_SECS);
    }

    #[test]
    fn test_missing_credential() {
        let guard = guard();
        assert_eq!(guard.authenticate(None), Err(TokenError::Missing));
        assert_eq!(guard.authenticate(Some("   ")), Err(TokenError::Missing));
    }

    #[test]
    fn test_garbage_token_is_invalid() {
        let guard = guard();
        assert_eq!(
            guard.authenticate(Some("invalid.token.here")),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn test_expired_token_is_invalid() {
        let guard = guard();
        let token = guard
            .sign(Uuid::new_v4(), Duration::seconds(-30))
            .unwrap();

        assert_eq!(guard.verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_foreign_signature_is_invalid() {
        let other = TokenGuard::new(&JwtConfig::new(
            "another-secret-that-is-also-long-enough",
            DEFAULT_TOKEN_TTL_SECS,
        ));
        let token = other.issue(Uuid::new_v4()).unwrap();

        assert_eq!(guard().authenticate(Some(&token)), Err(TokenError::Invalid));
    }

    #[test]
    fn test_non_uuid_subject_is_invalid() {
        let claims = Claims {
            sub: "not-a-uuid".to_string(),
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 60,
        };
        let token = encode(
            &Header::new(JWT_ALGORITHM),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(guard().authenticate(Some(&token)), Err(TokenError::Invalid));
    }

    #[test]
    fn test_config_validation() {
        assert!(JwtConfig::new("", 60).validate(false).is_err());
        assert!(JwtConfig::new("short", 60).validate(false).is_ok());
        assert!(JwtConfig::new("short", 60).validate(true).is_err());
        assert!(JwtConfig::new(TEST_SECRET, 60).validate(true).is_ok());
        assert!(JwtConfig::new(TEST_SECRET, 0).validate(false).is_err());
    }

    #[test]
    fn test_config_debug_redacts_secret() {
        let rendered = format!("{:?}", JwtConfig::new(TEST_SECRET, 60));
        assert!(!rendered.contains(TEST_SECRET));
    }
}
