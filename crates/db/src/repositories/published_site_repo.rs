//! Repository for the `published_sites` publish log.

use sqlx::{PgExecutor, PgPool};
use sitegen_core::store::NewPublishedSite;
use sitegen_core::types::DbId;

use crate::models::published_site::PublishedSiteRow;

const COLUMNS: &str = "\
    id, project_id, version, storage_path, public_url, html_hash, css_hash, \
    published_at, created_at";

/// Append and query publish log entries.
pub struct PublishedSiteRepo;

impl PublishedSiteRepo {
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        site: &NewPublishedSite,
    ) -> Result<PublishedSiteRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO published_sites \
                (project_id, version, storage_path, public_url, html_hash, css_hash, published_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PublishedSiteRow>(&query)
            .bind(site.project_id)
            .bind(site.version)
            .bind(&site.storage_path)
            .bind(&site.public_url)
            .bind(&site.html_hash)
            .bind(&site.css_hash)
            .bind(site.published_at)
            .fetch_one(executor)
            .await
    }

    /// The entry with the highest version for a project.
    pub async fn find_latest(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Option<PublishedSiteRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM published_sites \
             WHERE project_id = $1 ORDER BY version DESC LIMIT 1"
        );
        sqlx::query_as::<_, PublishedSiteRow>(&query)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    /// Every entry for a project, oldest first.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<PublishedSiteRow>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM published_sites WHERE project_id = $1 ORDER BY version");
        sqlx::query_as::<_, PublishedSiteRow>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }
}
