/// Project model and database operations
///
/// Projects are owned by a manager (`creator_id`) and carry the list of
/// workers assigned to them.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     project_id UUID PRIMARY KEY,
///     name VARCHAR(100) NOT NULL,
///     description TEXT,
///     creator_id UUID NOT NULL REFERENCES users(user_id),
///     dev_ids UUID[] NOT NULL DEFAULT '{}',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (creator_id, name)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Project owned by a manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub project_id: Uuid,

    /// Project name, unique per owner
    pub name: String,

    pub description: Option<String>,

    /// Owning manager
    pub creator_id: Uuid,

    /// Workers assigned to the project
    pub dev_ids: Vec<Uuid>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for inserting a new project
#[derive(Debug, Clone)]
pub struct NewProject {
    pub project_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub creator_id: Uuid,
}

/// Project creation request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
}

/// Worker assignment request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AssignDevsRequest {
    #[validate(length(min = 1, message = "At least one worker id is required"))]
    pub dev_ids: Vec<Uuid>,
}

const PROJECT_COLUMNS: &str =
    "project_id, name, description, creator_id, dev_ids, created_at, updated_at";

impl Project {
    /// Inserts a new project with no assigned workers
    pub async fn create(pool: &PgPool, data: NewProject) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (project_id, name, description, creator_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {}",
            PROJECT_COLUMNS
        );

        sqlx::query_as::<_, Project>(&query)
            .bind(data.project_id)
            .bind(data.name)
            .bind(data.description)
            .bind(data.creator_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM projects WHERE project_id = $1", PROJECT_COLUMNS);

        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a project by name within one owner's projects
    pub async fn find_by_name(
        pool: &PgPool,
        name: &str,
        creator_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM projects WHERE name = $1 AND creator_id = $2",
            PROJECT_COLUMNS
        );

        sqlx::query_as::<_, Project>(&query)
            .bind(name)
            .bind(creator_id)
            .fetch_optional(pool)
            .await
    }

    /// Lists every project owned by a manager, newest first
    pub async fn find_by_pm(pool: &PgPool, creator_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM projects WHERE creator_id = $1 ORDER BY created_at DESC",
            PROJECT_COLUMNS
        );

        sqlx::query_as::<_, Project>(&query)
            .bind(creator_id)
            .fetch_all(pool)
            .await
    }

    /// Lists every project a worker is assigned to, newest first
    pub async fn find_by_dev(pool: &PgPool, dev_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM projects WHERE $1 = ANY(dev_ids) ORDER BY created_at DESC",
            PROJECT_COLUMNS
        );

        sqlx::query_as::<_, Project>(&query)
            .bind(dev_id)
            .fetch_all(pool)
            .await
    }

    /// Adds workers to a project, ignoring ids that are already assigned
    ///
    /// # Returns
    ///
    /// The updated project, None if the project doesn't exist
    pub async fn add_devs(
        pool: &PgPool,
        project_id: Uuid,
        dev_ids: &[Uuid],
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE projects \
             SET dev_ids = ARRAY(SELECT DISTINCT unnest(dev_ids || $2::uuid[])), updated_at = NOW() \
             WHERE project_id = $1 \
             RETURNING {}",
            PROJECT_COLUMNS
        );

        sqlx::query_as::<_, Project>(&query)
            .bind(project_id)
            .bind(dev_ids)
            .fetch_optional(pool)
            .await
    }

    /// Detaches a worker from every project it is assigned to
    ///
    /// # Returns
    ///
    /// Number of projects that were updated
    pub async fn remove_dev(pool: &PgPool, dev_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE projects
            SET dev_ids = array_remove(dev_ids, $1), updated_at = NOW()
            WHERE $1 = ANY(dev_ids)
            "#,
        )
        .bind(dev_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Deletes a project by ID
    ///
    /// # Returns
    ///
    /// True if the project was deleted, false if it didn't exist
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE project_id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
