/// Session token generation and validation module
///
/// Session tokens are HS256-signed JWTs carrying the caller's identity
/// (`sub`, `creator_id`, `role`). They are issued after a successful login and
/// read back into an [`IdentityContext`] by the session middleware.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Expiration**: Configurable, 24 hours by default
/// - **Validation**: Signature, expiration, not-before and issuer checks
/// - **Secret Management**: Secrets should be at least 32 bytes (256 bits)
///
/// # Example
///
/// ```
/// use taskhive_shared::auth::context::IdentityContext;
/// use taskhive_shared::auth::jwt::{issue_session, read_session};
/// use taskhive_shared::models::user::Role;
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pm = Uuid::new_v4();
/// let identity = IdentityContext::new(pm, pm, Role::Manager);
///
/// let session = issue_session(&identity, "your-secret-key", Duration::hours(1))?;
/// let restored = read_session(&session.token, "your-secret-key")?;
/// assert_eq!(restored, identity);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::context::IdentityContext;
use crate::models::user::Role;

/// Issuer written into and required from every session token
pub const ISSUER: &str = "taskhive";

/// Default session lifetime
pub fn default_session_ttl() -> Duration {
    Duration::hours(24)
}

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Invalid issuer
    #[error("Invalid issuer: expected {expected}")]
    InvalidIssuer { expected: String },
}

/// JWT claims structure
///
/// # Standard Claims
///
/// - `sub`: Subject (user ID)
/// - `iss`: Issuer (always "taskhive")
/// - `iat`: Issued at timestamp
/// - `exp`: Expiration timestamp
/// - `nbf`: Not before timestamp
///
/// # Custom Claims
///
/// - `creator_id`: Owning manager
/// - `role`: Manager or worker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - User ID
    pub sub: Uuid,

    /// Issuer - Always "taskhive"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Owning manager (custom claim)
    pub creator_id: Uuid,

    /// Role (custom claim)
    pub role: Role,
}

impl Claims {
    /// Creates claims for an identity, valid for `expires_in`
    ///
    /// # Errors
    ///
    /// Returns `JwtError::CreateError` if the expiration is not representable
    pub fn new(identity: &IdentityContext, expires_in: Duration) -> Result<Self, JwtError> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(expires_in)
            .ok_or_else(|| JwtError::CreateError("Expiration out of range".to_string()))?;

        Ok(Self {
            sub: identity.user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
            creator_id: identity.creator_id,
            role: identity.role,
        })
    }

    /// Checks if token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Identity carried by these claims
    pub fn identity(&self) -> IdentityContext {
        IdentityContext::new(self.sub, self.creator_id, self.role)
    }
}

/// Issued session credential
#[derive(Debug, Clone, Serialize)]
pub struct SessionToken {
    /// Signed JWT
    pub token: String,

    /// Expiration instant
    pub expires_at: DateTime<Utc>,
}

/// Creates a JWT token from claims
///
/// # Errors
///
/// Returns `JwtError::CreateError` if token creation fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a JWT token and extracts claims
///
/// Verifies:
/// - Signature is valid
/// - Token hasn't expired
/// - Issuer is "taskhive"
/// - Token is not used before nbf time
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer {
            expected: ISSUER.to_string(),
        },
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

/// Issues a session token for an authenticated identity
pub fn issue_session(
    identity: &IdentityContext,
    secret: &str,
    ttl: Duration,
) -> Result<SessionToken, JwtError> {
    let claims = Claims::new(identity, ttl)?;
    let token = create_token(&claims, secret)?;
    let expires_at = Utc
        .timestamp_opt(claims.exp, 0)
        .single()
        .ok_or_else(|| JwtError::CreateError("Expiration out of range".to_string()))?;

    Ok(SessionToken { token, expires_at })
}

/// Reads a session token back into the identity it was issued for
pub fn read_session(token: &str, secret: &str) -> Result<IdentityContext, JwtError> {
    validate_token(token, secret).map(|claims| claims.identity())
}
