/// Holiday model and database operations
///
/// Holidays are non-working periods declared by a manager and visible to the
/// manager's workers. Bounds are Unix epoch milliseconds.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE holidays (
///     holiday_id UUID PRIMARY KEY,
///     title VARCHAR(100) NOT NULL,
///     start_ms BIGINT NOT NULL,
///     end_ms BIGINT NOT NULL,
///     duration_days BIGINT NOT NULL,
///     creator_id UUID NOT NULL REFERENCES users(user_id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (creator_id, title)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Milliseconds in one day
pub const MILLISECONDS_PER_DAY: i64 = 86_400_000;

/// Holiday owned by a manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Holiday {
    pub holiday_id: Uuid,

    /// Title, unique per owner
    pub title: String,

    /// Start, epoch milliseconds
    #[sqlx(rename = "start_ms")]
    pub start: i64,

    /// End, epoch milliseconds
    #[sqlx(rename = "end_ms")]
    pub end: i64,

    /// Length in whole days
    #[sqlx(rename = "duration_days")]
    pub duration: i64,

    /// Owning manager
    pub creator_id: Uuid,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for inserting a new holiday
#[derive(Debug, Clone)]
pub struct NewHoliday {
    pub holiday_id: Uuid,
    pub title: String,
    pub start: i64,
    pub end: i64,
    pub duration: i64,
    pub creator_id: Uuid,
}

/// Holiday creation request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct HolidayRequest {
    #[validate(length(min = 1, max = 100, message = "Title must be between 1 and 100 characters"))]
    pub title: String,

    #[validate(range(min = 0, message = "Start must be a positive timestamp"))]
    pub start: i64,

    #[validate(range(min = 0, message = "End must be a positive timestamp"))]
    pub end: i64,
}

/// Whole days between two epoch-millisecond bounds
pub fn duration_days(start: i64, end: i64) -> i64 {
    (end - start) / MILLISECONDS_PER_DAY
}

const HOLIDAY_COLUMNS: &str =
    "holiday_id, title, start_ms, end_ms, duration_days, creator_id, created_at, updated_at";

impl Holiday {
    pub async fn create(pool: &PgPool, data: NewHoliday) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO holidays (holiday_id, title, start_ms, end_ms, duration_days, creator_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {}",
            HOLIDAY_COLUMNS
        );

        sqlx::query_as::<_, Holiday>(&query)
            .bind(data.holiday_id)
            .bind(data.title)
            .bind(data.start)
            .bind(data.end)
            .bind(data.duration)
            .bind(data.creator_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM holidays WHERE holiday_id = $1", HOLIDAY_COLUMNS);

        sqlx::query_as::<_, Holiday>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a holiday by title within one owner's holidays
    pub async fn find_by_title(
        pool: &PgPool,
        title: &str,
        creator_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM holidays WHERE title = $1 AND creator_id = $2",
            HOLIDAY_COLUMNS
        );

        sqlx::query_as::<_, Holiday>(&query)
            .bind(title)
            .bind(creator_id)
            .fetch_optional(pool)
            .await
    }

    /// Lists every holiday owned by a manager, in chronological order
    pub async fn find_all(pool: &PgPool, creator_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM holidays WHERE creator_id = $1 ORDER BY start_ms ASC",
            HOLIDAY_COLUMNS
        );

        sqlx::query_as::<_, Holiday>(&query)
            .bind(creator_id)
            .fetch_all(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM holidays WHERE holiday_id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
