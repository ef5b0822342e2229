/// User model and database operations
///
/// A user is either a manager (PM), who owns itself and everything it
/// creates, or a worker (Dev), whose visibility is delegated to the manager
/// that created it.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('pm', 'dev');
///
/// CREATE TABLE users (
///     user_id UUID PRIMARY KEY,
///     creator_id UUID NOT NULL,
///     role user_role NOT NULL,
///     email TEXT NOT NULL,
///     password_hash VARCHAR(255) NOT NULL,
///     first_name VARCHAR(100) NOT NULL,
///     last_name VARCHAR(100) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE UNIQUE INDEX users_email_key ON users (LOWER(email));
/// ```
///
/// # Invariants
///
/// - A manager's `creator_id` equals its own `user_id`
/// - A worker's `creator_id` references exactly one manager and never changes
/// - `email` is unique across the whole table, regardless of role

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Role of an identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role")]
pub enum Role {
    /// Project manager: root identity that owns workers and resources
    #[sqlx(rename = "pm")]
    #[serde(rename = "pm")]
    Manager,

    /// Developer: identity owned by exactly one manager
    #[sqlx(rename = "dev")]
    #[serde(rename = "dev")]
    Worker,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Manager => "pm",
            Role::Worker => "dev",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored identity record
///
/// Carries the password hash and therefore never leaves the service layer;
/// use [`UserInfo`] for anything returned to callers.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub user_id: Uuid,

    /// Owning manager (self for a manager)
    pub creator_id: Uuid,

    pub role: Role,

    /// Email address, unique system-wide
    pub email: String,

    /// Argon2id password hash
    pub password_hash: String,

    pub first_name: String,

    pub last_name: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Identity projection without the password hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub user_id: Uuid,
    pub creator_id: Uuid,
    pub role: Role,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        UserInfo {
            user_id: user.user_id,
            creator_id: user.creator_id,
            role: user.role,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Input for inserting a new identity
///
/// Ids are assigned by the registry before insertion, so both `user_id` and
/// `creator_id` are always explicit.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_id: Uuid,
    pub creator_id: Uuid,
    pub role: Role,
    pub email: String,
    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
}

/// Manager self-registration request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 128, message = "Password is required"))]
    pub password: String,

    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,
}

/// Worker creation request issued by a manager
///
/// `role` is optional; when present it must be [`Role::Worker`].
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateWorkerRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 128, message = "Password is required"))]
    pub password: String,

    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,

    #[serde(default)]
    pub role: Option<Role>,
}

const USER_COLUMNS: &str =
    "user_id, creator_id, role, email, password_hash, first_name, last_name, created_at, updated_at";

impl User {
    /// Inserts a new identity
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Email already exists (unique constraint violation)
    /// - Database connection fails
    pub async fn create(pool: &PgPool, data: NewUser) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (user_id, creator_id, role, email, password_hash, first_name, last_name) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {}",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&query)
            .bind(data.user_id)
            .bind(data.creator_id)
            .bind(data.role)
            .bind(data.email)
            .bind(data.password_hash)
            .bind(data.first_name)
            .bind(data.last_name)
            .fetch_one(pool)
            .await
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM users WHERE user_id = $1", USER_COLUMNS);

        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a user by email address
    ///
    /// Matching is case-insensitive, like the unique index.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM users WHERE LOWER(email) = LOWER($1)", USER_COLUMNS);

        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Lists the workers created by a manager, oldest first
    pub async fn find_workers(pool: &PgPool, creator_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM users WHERE creator_id = $1 AND role = 'dev' ORDER BY created_at ASC",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&query)
            .bind(creator_id)
            .fetch_all(pool)
            .await
    }

    /// Fetches the workers matching any of the given ids
    ///
    /// Ids without a matching worker are simply absent from the result.
    pub async fn find_workers_by_ids(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM users WHERE user_id = ANY($1) AND role = 'dev' ORDER BY created_at ASC",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Deletes a user by ID
    ///
    /// # Returns
    ///
    /// True if user was deleted, false if user didn't exist
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        let id = Uuid::new_v4();
        User {
            user_id: id,
            creator_id: id,
            role: Role::Manager,
            email: "pm@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_user_info_drops_password_hash() {
        let user = sample_user();
        let info = UserInfo::from(user.clone());

        let json = serde_json::to_value(&info).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(info.user_id, user.user_id);
        assert_eq!(info.email, user.email);
    }

    #[test]
    fn test_role_wire_names() {
        assert_eq!(serde_json::to_string(&Role::Manager).unwrap(), "\"pm\"");
        assert_eq!(serde_json::to_string(&Role::Worker).unwrap(), "\"dev\"");

        let role: Role = serde_json::from_str("\"dev\"").unwrap();
        assert_eq!(role, Role::Worker);
    }

    #[test]
    fn test_create_worker_request_role_is_optional() {
        let req: CreateWorkerRequest = serde_json::from_str(
            r#"{"email":"d@x.com","password":"pw","first_name":"D","last_name":"V"}"#,
        )
        .unwrap();
        assert!(req.role.is_none());
    }
}
