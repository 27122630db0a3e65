//! [`ProjectStore`] backed by PostgreSQL.

use async_trait::async_trait;
use sitegen_core::error::CoreError;
use sitegen_core::project::{AiUsage, Project};
use sitegen_core::store::{NewPublishedSite, ProjectRecord, ProjectStore, PublishedSite};
use sitegen_core::types::{DbId, Timestamp};

use crate::envelope::encode;
use crate::models::project::ProjectColumns;
use crate::repositories::{ProjectRepo, PublishedSiteRepo};
use crate::DbPool;

fn db_error(err: sqlx::Error) -> CoreError {
    tracing::error!(error = %err, "Database error");
    CoreError::Internal(format!("Database error: {err}"))
}

fn not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "Project",
        id,
    }
}

#[derive(Clone)]
pub struct PgProjectStore {
    pool: DbPool,
}

impl PgProjectStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl ProjectStore for PgProjectStore {
    async fn create_project(&self, user_id: DbId, now: Timestamp) -> Result<Project, CoreError> {
        let usage = encode(&AiUsage::default())
            .map_err(|e| CoreError::Internal(format!("Failed to encode usage: {e}")))?;
        let row = ProjectRepo::create(&self.pool, user_id, &usage, now)
            .await
            .map_err(db_error)?;
        let record = ProjectRecord::try_from(row)?;
        tracing::info!(project_id = record.project.id, user_id, "Project created");
        Ok(record.project)
    }

    async fn get_project(&self, id: DbId) -> Result<Option<Project>, CoreError> {
        Ok(self.get_project_row(id).await?.map(|record| record.project))
    }

    async fn list_projects_for_user(&self, user_id: DbId) -> Result<Vec<Project>, CoreError> {
        ProjectRepo::list_by_user(&self.pool, user_id)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(|row| ProjectRecord::try_from(row).map(|record| record.project))
            .collect()
    }

    async fn count_projects_for_user(&self, user_id: DbId) -> Result<i64, CoreError> {
        ProjectRepo::count_by_user(&self.pool, user_id)
            .await
            .map_err(db_error)
    }

    async fn save_project(&self, project: &Project) -> Result<(), CoreError> {
        let columns = ProjectColumns::try_from(project)?;
        let updated = ProjectRepo::update(&self.pool, project.id, &columns)
            .await
            .map_err(db_error)?;
        if !updated {
            return Err(not_found(project.id));
        }
        Ok(())
    }

    async fn delete_project(&self, id: DbId) -> Result<bool, CoreError> {
        ProjectRepo::delete(&self.pool, id).await.map_err(db_error)
    }

    async fn get_project_row(&self, id: DbId) -> Result<Option<ProjectRecord>, CoreError> {
        ProjectRepo::find_by_id(&self.pool, id)
            .await
            .map_err(db_error)?
            .map(ProjectRecord::try_from)
            .transpose()
    }

    async fn update_project_trial(
        &self,
        id: DbId,
        trial_ends_at: Option<Timestamp>,
    ) -> Result<(), CoreError> {
        let updated = ProjectRepo::update_trial(&self.pool, id, trial_ends_at)
            .await
            .map_err(db_error)?;
        if !updated {
            return Err(not_found(id));
        }
        Ok(())
    }

    async fn set_project_paused(&self, id: DbId, paused: bool) -> Result<(), CoreError> {
        let updated = ProjectRepo::set_paused(&self.pool, id, paused)
            .await
            .map_err(db_error)?;
        if !updated {
            return Err(not_found(id));
        }
        Ok(())
    }

    async fn commit_publication(
        &self,
        project: &Project,
        trial_ends_at: Option<Timestamp>,
        site: NewPublishedSite,
    ) -> Result<PublishedSite, CoreError> {
        let columns = ProjectColumns::try_from(project)?;

        let mut tx = self.pool.begin().await.map_err(db_error)?;
        if !ProjectRepo::update(&mut *tx, project.id, &columns)
            .await
            .map_err(db_error)?
        {
            return Err(not_found(project.id));
        }
        ProjectRepo::update_trial(&mut *tx, project.id, trial_ends_at)
            .await
            .map_err(db_error)?;
        let row = PublishedSiteRepo::create(&mut *tx, &site)
            .await
            .map_err(db_error)?;
        tx.commit().await.map_err(db_error)?;

        Ok(row.into())
    }

    async fn latest_published_site(
        &self,
        project_id: DbId,
    ) -> Result<Option<PublishedSite>, CoreError> {
        Ok(PublishedSiteRepo::find_latest(&self.pool, project_id)
            .await
            .map_err(db_error)?
            .map(PublishedSite::from))
    }
}
