//! Repository for the `projects` table.

use sqlx::{PgExecutor, PgPool};
use sitegen_core::types::{DbId, Timestamp};

use crate::models::project::{ProjectColumns, ProjectRow};

// ---------------------------------------------------------------------------
// Column lists
// ---------------------------------------------------------------------------

const COLUMNS: &str = "\
    id, user_id, state, brand_memory, ai_usage, site_plan, site_version, \
    template_id, trial_ends_at, is_paused, published_at, created_at, updated_at";

/// Provides CRUD operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new draft project with empty usage counters.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        ai_usage: &serde_json::Value,
        now: Timestamp,
    ) -> Result<ProjectRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (user_id, state, ai_usage, created_at, updated_at) \
             VALUES ($1, 'draft', $2, $3, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectRow>(&query)
            .bind(user_id)
            .bind(ai_usage)
            .bind(now)
            .fetch_one(pool)
            .await
    }

    /// Find a project by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ProjectRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, ProjectRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's projects, newest first.
    pub async fn list_by_user(pool: &PgPool, user_id: DbId) -> Result<Vec<ProjectRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, ProjectRow>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    pub async fn count_by_user(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM projects WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Overwrite the mutable columns. Returns `false` if no row matched.
    ///
    /// Generic over the executor so it can run inside a transaction.
    pub async fn update<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        columns: &ProjectColumns,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE projects SET \
                state = $2, brand_memory = $3, ai_usage = $4, site_plan = $5, \
                site_version = $6, template_id = $7, published_at = $8, updated_at = $9 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(columns.state)
        .bind(&columns.brand_memory)
        .bind(&columns.ai_usage)
        .bind(&columns.site_plan)
        .bind(&columns.site_version)
        .bind(&columns.template_id)
        .bind(columns.published_at)
        .bind(columns.updated_at)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a project. Its publish log goes with it (`ON DELETE CASCADE`).
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Set the trial expiry and clear the paused flag.
    pub async fn update_trial<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        trial_ends_at: Option<Timestamp>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE projects SET trial_ends_at = $2, is_paused = FALSE, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(trial_ends_at)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn set_paused(pool: &PgPool, id: DbId, paused: bool) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE projects SET is_paused = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(paused)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
