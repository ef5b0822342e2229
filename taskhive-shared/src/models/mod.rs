/// Database models for TaskHive
///
/// This module contains the database models, their request types and the SQL
/// operations backing the PostgreSQL repositories.
///
/// # Models
///
/// - `user`: Manager (PM) and worker (Dev) identities
/// - `project`: Projects owned by a manager, with assigned workers
/// - `holiday`: Non-working periods owned by a manager
///
/// # Example
///
/// ```no_run
/// use taskhive_shared::models::user::{NewUser, Role, User};
/// use taskhive_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let id = Uuid::new_v4();
/// let user = User::create(&pool, NewUser {
///     user_id: id,
///     creator_id: id,
///     role: Role::Manager,
///     email: "pm@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     first_name: "Ada".to_string(),
///     last_name: "Lovelace".to_string(),
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod holiday;
pub mod project;
pub mod user;
