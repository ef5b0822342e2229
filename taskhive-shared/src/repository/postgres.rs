/// PostgreSQL repositories
///
/// Thin adapters from the repository ports onto the SQL operations defined on
/// the models. Each repository owns a clone of the pool.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskhive_shared::repository::{postgres::PgUserRepository, UserRepository};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) {
/// let users: Arc<dyn UserRepository> = Arc::new(PgUserRepository::new(pool));
/// # }
/// ```

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{HolidayRepository, ProjectRepository, RepoResult, RepositoryError, UserRepository};
use crate::models::{
    holiday::{Holiday, NewHoliday},
    project::{NewProject, Project},
    user::{NewUser, User},
};

#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: NewUser) -> RepoResult<User> {
        Ok(User::create(&self.pool, user).await?)
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_workers(&self, creator_id: Uuid) -> RepoResult<Vec<User>> {
        Ok(User::find_workers(&self.pool, creator_id).await?)
    }

    async fn find_workers_by_ids(&self, ids: &[Uuid]) -> RepoResult<Vec<User>> {
        Ok(User::find_workers_by_ids(&self.pool, ids).await?)
    }

    async fn delete(&self, id: Uuid) -> RepoResult<()> {
        if User::delete(&self.pool, id).await? {
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }
}

#[derive(Debug, Clone)]
pub struct PgProjectRepository {
    pool: PgPool,
}

impl PgProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectRepository for PgProjectRepository {
    async fn create(&self, project: NewProject) -> RepoResult<Project> {
        Ok(Project::create(&self.pool, project).await?)
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Project>> {
        Ok(Project::find_by_id(&self.pool, id).await?)
    }

    async fn find_by_name(&self, name: &str, creator_id: Uuid) -> RepoResult<Option<Project>> {
        Ok(Project::find_by_name(&self.pool, name, creator_id).await?)
    }

    async fn find_by_pm(&self, creator_id: Uuid) -> RepoResult<Vec<Project>> {
        Ok(Project::find_by_pm(&self.pool, creator_id).await?)
    }

    async fn find_by_dev(&self, dev_id: Uuid) -> RepoResult<Vec<Project>> {
        Ok(Project::find_by_dev(&self.pool, dev_id).await?)
    }

    async fn add_devs(&self, project_id: Uuid, dev_ids: &[Uuid]) -> RepoResult<Project> {
        Project::add_devs(&self.pool, project_id, dev_ids)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn remove_dev(&self, dev_id: Uuid) -> RepoResult<u64> {
        Ok(Project::remove_dev(&self.pool, dev_id).await?)
    }

    async fn delete(&self, id: Uuid) -> RepoResult<()> {
        if Project::delete(&self.pool, id).await? {
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }
}

#[derive(Debug, Clone)]
pub struct PgHolidayRepository {
    pool: PgPool,
}

impl PgHolidayRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HolidayRepository for PgHolidayRepository {
    async fn create(&self, holiday: NewHoliday) -> RepoResult<Holiday> {
        Ok(Holiday::create(&self.pool, holiday).await?)
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Holiday>> {
        Ok(Holiday::find_by_id(&self.pool, id).await?)
    }

    async fn find_by_title(&self, title: &str, creator_id: Uuid) -> RepoResult<Option<Holiday>> {
        Ok(Holiday::find_by_title(&self.pool, title, creator_id).await?)
    }

    async fn find_all(&self, creator_id: Uuid) -> RepoResult<Vec<Holiday>> {
        Ok(Holiday::find_all(&self.pool, creator_id).await?)
    }

    async fn delete(&self, id: Uuid) -> RepoResult<()> {
        if Holiday::delete(&self.pool, id).await? {
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }
}
