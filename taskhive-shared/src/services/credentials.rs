/// Credential verifier
///
/// Checks an email and secret against the stored identity and issues the
/// session token for a verified identity. Nothing is persisted.
///
/// An unknown email and a wrong secret both fail with
/// [`ServiceError::InvalidCredentials`]. Only the debug log tells them apart.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskhive_shared::auth::password::Argon2Hasher;
/// use taskhive_shared::repository::memory::MemoryUserRepository;
/// use taskhive_shared::services::credentials::{CredentialVerifier, TokenSettings};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let verifier = CredentialVerifier::new(
///     Arc::new(MemoryUserRepository::new()),
///     Arc::new(Argon2Hasher::default()),
///     TokenSettings::new("a-secret-of-at-least-thirty-two-bytes"),
/// );
///
/// let user = verifier.authenticate("a@x.com", "pw1").await?;
/// let session = verifier.issue_session(&user)?;
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info};

use crate::auth::context::IdentityContext;
use crate::auth::jwt::{default_session_ttl, issue_session, read_session, SessionToken};
use crate::auth::password::SecretHasher;
use crate::error::{ServiceError, ServiceResult};
use crate::models::user::UserInfo;
use crate::repository::UserRepository;

/// Signing secret and lifetime for issued session tokens
#[derive(Debug, Clone)]
pub struct TokenSettings {
    pub secret: String,
    pub ttl: Duration,
}

impl TokenSettings {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ttl: default_session_ttl(),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

pub struct CredentialVerifier {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn SecretHasher>,
    tokens: TokenSettings,
}

impl CredentialVerifier {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn SecretHasher>,
        tokens: TokenSettings,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    /// Verifies an email and secret
    ///
    /// # Errors
    ///
    /// - `InvalidCredentials` if no identity has the email or the secret
    ///   does not match
    /// - `Internal` if the lookup fails or the stored hash is unusable
    pub async fn authenticate(&self, email: &str, secret: &str) -> ServiceResult<UserInfo> {
        let user = self
            .users
            .find_by_email(email)
            .await
            .map_err(|e| ServiceError::internal("Failed to look up identity", e))?;

        let Some(user) = user else {
            debug!("Authentication failed: no identity for email");
            return Err(ServiceError::InvalidCredentials);
        };

        if !self.hasher.verify(&user.password_hash, secret)? {
            debug!(user_id = %user.user_id, "Authentication failed: secret mismatch");
            return Err(ServiceError::InvalidCredentials);
        }

        info!(user_id = %user.user_id, role = %user.role, "Identity authenticated");
        Ok(user.into())
    }

    /// Hashes a plaintext secret for storage
    pub fn generate_secret_hash(&self, plaintext: &str) -> ServiceResult<String> {
        Ok(self.hasher.hash(plaintext)?)
    }

    /// Issues a session token for a verified identity
    pub fn issue_session(&self, user: &UserInfo) -> ServiceResult<SessionToken> {
        Ok(issue_session(
            &IdentityContext::from(user),
            &self.tokens.secret,
            self.tokens.ttl,
        )?)
    }

    /// Reads a session token back into the identity it was issued for
    ///
    /// Any invalid, foreign or expired token is `InvalidCredentials`.
    pub fn read_session(&self, token: &str) -> ServiceResult<IdentityContext> {
        read_session(token, &self.tokens.secret).map_err(|e| {
            debug!(error = %e, "Session token rejected");
            ServiceError::InvalidCredentials
        })
    }

    /// Authenticates and issues a session in one step
    pub async fn login(&self, email: &str, secret: &str) -> ServiceResult<(UserInfo, SessionToken)> {
        let user = self.authenticate(email, secret).await?;
        let session = self.issue_session(&user)?;
        Ok((user, session))
    }

    pub fn session_ttl(&self) -> Duration {
        self.tokens.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::{Argon2Hasher, HashParams};
    use crate::models::user::{NewUser, Role};
    use crate::repository::memory::MemoryUserRepository;
    use uuid::Uuid;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    async fn verifier_with(email: &str, password: &str) -> CredentialVerifier {
        let hasher = Arc::new(Argon2Hasher::new(HashParams {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        }));
        let users = Arc::new(MemoryUserRepository::new());
        let id = Uuid::new_v4();
        users
            .create(NewUser {
                user_id: id,
                creator_id: id,
                role: Role::Manager,
                email: email.to_string(),
                password_hash: hasher.hash(password).unwrap(),
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
            })
            .await
            .unwrap();

        CredentialVerifier::new(users, hasher, TokenSettings::new(SECRET))
    }

    #[tokio::test]
    async fn test_authenticate_success_strips_hash() {
        let verifier = verifier_with("a@x.com", "pw1").await;
        let user = verifier.authenticate("a@x.com", "pw1").await.unwrap();

        assert_eq!(user.email, "a@x.com");
        assert_eq!(user.role, Role::Manager);
    }

    #[tokio::test]
    async fn test_unknown_email_and_wrong_secret_look_the_same() {
        let verifier = verifier_with("a@x.com", "pw1").await;

        let unknown = verifier.authenticate("b@x.com", "pw1").await.unwrap_err();
        let mismatch = verifier.authenticate("a@x.com", "pw2").await.unwrap_err();

        assert!(matches!(unknown, ServiceError::InvalidCredentials));
        assert!(matches!(mismatch, ServiceError::InvalidCredentials));
        assert_eq!(unknown.to_string(), mismatch.to_string());
    }

    #[tokio::test]
    async fn test_corrupt_stored_hash_is_internal() {
        let users = Arc::new(MemoryUserRepository::new());
        let id = Uuid::new_v4();
        users
            .create(NewUser {
                user_id: id,
                creator_id: id,
                role: Role::Manager,
                email: "a@x.com".to_string(),
                password_hash: "not-a-phc-string".to_string(),
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
            })
            .await
            .unwrap();
        let verifier = CredentialVerifier::new(users, Arc::new(Argon2Hasher::default()), TokenSettings::new(SECRET));

        assert!(matches!(
            verifier.authenticate("a@x.com", "pw1").await,
            Err(ServiceError::Internal(_))
        ));
    }

    #[tokio::test]
    async fn test_login_issues_readable_session() {
        let verifier = verifier_with("a@x.com", "pw1").await;
        let (user, session) = verifier.login("a@x.com", "pw1").await.unwrap();

        let identity = verifier.read_session(&session.token).unwrap();
        assert_eq!(identity.user_id, user.user_id);
        assert_eq!(identity.creator_id, user.user_id);
        assert!(identity.is_manager());
    }

    #[tokio::test]
    async fn test_bad_session_is_invalid_credentials() {
        let verifier = verifier_with("a@x.com", "pw1").await;
        assert!(matches!(
            verifier.read_session("garbage"),
            Err(ServiceError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_generate_secret_hash_verifies() {
        let verifier = verifier_with("a@x.com", "pw1").await;
        let hash = verifier.generate_secret_hash("pw9").unwrap();
        assert!(hash.starts_with("$argon2id$"));
    }
}
