/// Persistence ports
///
/// Services depend on these traits rather than on a database handle, so the
/// identity core can be exercised without PostgreSQL.
///
/// # Adapters
///
/// - [`postgres`]: sqlx-backed repositories delegating to the model SQL
/// - [`memory`]: in-process repositories used by tests and local demos
///
/// # Not-found semantics
///
/// Lookups return `Ok(None)` on a miss. Mutations of a row that does not exist
/// return [`RepositoryError::NotFound`].

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    holiday::{Holiday, NewHoliday},
    project::{NewProject, Project},
    user::{NewUser, User},
};

pub mod memory;
pub mod postgres;

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Target row does not exist
    #[error("Record not found")]
    NotFound,

    /// Unique constraint violated (constraint or key name)
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// Storage backend unavailable
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepositoryError::UniqueViolation(
                    db_err.constraint().unwrap_or("unique").to_string(),
                )
            }
            other => RepositoryError::Database(other),
        }
    }
}

/// Result alias for repository operations
pub type RepoResult<T> = Result<T, RepositoryError>;

/// Identity storage
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: NewUser) -> RepoResult<User>;

    /// Case-insensitive lookup on email
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<User>>;

    /// Workers whose `creator_id` is the given manager
    async fn find_workers(&self, creator_id: Uuid) -> RepoResult<Vec<User>>;

    /// Workers matching any of the ids; misses are omitted
    async fn find_workers_by_ids(&self, ids: &[Uuid]) -> RepoResult<Vec<User>>;

    async fn delete(&self, id: Uuid) -> RepoResult<()>;
}

/// Project storage
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn create(&self, project: NewProject) -> RepoResult<Project>;

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Project>>;

    async fn find_by_name(&self, name: &str, creator_id: Uuid) -> RepoResult<Option<Project>>;

    async fn find_by_pm(&self, creator_id: Uuid) -> RepoResult<Vec<Project>>;

    async fn find_by_dev(&self, dev_id: Uuid) -> RepoResult<Vec<Project>>;

    async fn add_devs(&self, project_id: Uuid, dev_ids: &[Uuid]) -> RepoResult<Project>;

    /// Pulls a worker out of every project; returns the number touched
    async fn remove_dev(&self, dev_id: Uuid) -> RepoResult<u64>;

    async fn delete(&self, id: Uuid) -> RepoResult<()>;
}

/// Holiday storage
#[async_trait]
pub trait HolidayRepository: Send + Sync {
    async fn create(&self, holiday: NewHoliday) -> RepoResult<Holiday>;

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Holiday>>;

    async fn find_by_title(&self, title: &str, creator_id: Uuid) -> RepoResult<Option<Holiday>>;

    async fn find_all(&self, creator_id: Uuid) -> RepoResult<Vec<Holiday>>;

    async fn delete(&self, id: Uuid) -> RepoResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: RepositoryError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[test]
    fn test_other_sqlx_errors_are_wrapped() {
        let err: RepositoryError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, RepositoryError::Database(_)));
    }
}
