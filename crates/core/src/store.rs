//! Persistence boundary for projects and their publish log.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::CoreError;
use crate::project::Project;
use crate::types::{DbId, Timestamp, VersionNumber};

/// A project together with the publish-side columns that live beside it.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectRecord {
    pub project: Project,
    pub trial_ends_at: Option<Timestamp>,
    pub is_paused: bool,
}

/// One entry of the append-only publish log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishedSite {
    pub id: DbId,
    pub project_id: DbId,
    pub version: VersionNumber,
    pub storage_path: String,
    pub public_url: String,
    pub html_hash: String,
    pub css_hash: String,
    pub published_at: Timestamp,
}

/// Fields for a new publish log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPublishedSite {
    pub project_id: DbId,
    pub version: VersionNumber,
    pub storage_path: String,
    pub public_url: String,
    pub html_hash: String,
    pub css_hash: String,
    pub published_at: Timestamp,
}

/// Storage for projects.
///
/// Implementations must make [`commit_publication`](Self::commit_publication)
/// atomic: the project, its trial timestamp, and the publish log entry are
/// written together or not at all.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn create_project(&self, user_id: DbId, now: Timestamp) -> Result<Project, CoreError>;

    async fn get_project(&self, id: DbId) -> Result<Option<Project>, CoreError>;

    /// Newest first.
    async fn list_projects_for_user(&self, user_id: DbId) -> Result<Vec<Project>, CoreError>;

    async fn count_projects_for_user(&self, user_id: DbId) -> Result<i64, CoreError>;

    /// Overwrite every mutable field of an existing project.
    async fn save_project(&self, project: &Project) -> Result<(), CoreError>;

    /// Delete a project and its publish log. Returns `false` if it did not
    /// exist.
    async fn delete_project(&self, id: DbId) -> Result<bool, CoreError>;

    async fn get_project_row(&self, id: DbId) -> Result<Option<ProjectRecord>, CoreError>;

    /// Replace the trial expiry and clear the paused flag.
    async fn update_project_trial(
        &self,
        id: DbId,
        trial_ends_at: Option<Timestamp>,
    ) -> Result<(), CoreError>;

    async fn set_project_paused(&self, id: DbId, paused: bool) -> Result<(), CoreError>;

    /// Save `project`, set its trial expiry, clear the paused flag, and
    /// append `site` to the publish log in one step.
    async fn commit_publication(
        &self,
        project: &Project,
        trial_ends_at: Option<Timestamp>,
        site: NewPublishedSite,
    ) -> Result<PublishedSite, CoreError>;

    /// The publish log entry with the highest version.
    async fn latest_published_site(
        &self,
        project_id: DbId,
    ) -> Result<Option<PublishedSite>, CoreError>;
}

// ---------------------------------------------------------------------------
// In-memory implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Inner {
    last_project_id: DbId,
    last_site_id: DbId,
    projects: BTreeMap<DbId, ProjectRecord>,
    sites: Vec<PublishedSite>,
}

/// A [`ProjectStore`] held in process memory. Used by tests and local
/// development without a database.
#[derive(Default)]
pub struct InMemoryProjectStore {
    inner: Mutex<Inner>,
}

impl InMemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Every publish log entry for `project_id`, oldest first.
    pub fn published_sites(&self, project_id: DbId) -> Vec<PublishedSite> {
        self.lock()
            .sites
            .iter()
            .filter(|s| s.project_id == project_id)
            .cloned()
            .collect()
    }
}

fn not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "Project",
        id,
    }
}

#[async_trait]
impl ProjectStore for InMemoryProjectStore {
    async fn create_project(&self, user_id: DbId, now: Timestamp) -> Result<Project, CoreError> {
        let mut inner = self.lock();
        inner.last_project_id += 1;
        let project = Project::new(inner.last_project_id, user_id, now);
        inner.projects.insert(
            project.id,
            ProjectRecord {
                project: project.clone(),
                trial_ends_at: None,
                is_paused: false,
            },
        );
        Ok(project)
    }

    async fn get_project(&self, id: DbId) -> Result<Option<Project>, CoreError> {
        Ok(self.lock().projects.get(&id).map(|r| r.project.clone()))
    }

    async fn list_projects_for_user(&self, user_id: DbId) -> Result<Vec<Project>, CoreError> {
        let mut projects: Vec<Project> = self
            .lock()
            .projects
            .values()
            .filter(|r| r.project.user_id == user_id)
            .map(|r| r.project.clone())
            .collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(projects)
    }

    async fn count_projects_for_user(&self, user_id: DbId) -> Result<i64, CoreError> {
        let count = self
            .lock()
            .projects
            .values()
            .filter(|r| r.project.user_id == user_id)
            .count();
        Ok(count as i64)
    }

    async fn save_project(&self, project: &Project) -> Result<(), CoreError> {
        let mut inner = self.lock();
        let record = inner
            .projects
            .get_mut(&project.id)
            .ok_or_else(|| not_found(project.id))?;
        record.project = project.clone();
        Ok(())
    }

    async fn delete_project(&self, id: DbId) -> Result<bool, CoreError> {
        let mut inner = self.lock();
        let existed = inner.projects.remove(&id).is_some();
        inner.sites.retain(|s| s.project_id != id);
        Ok(existed)
    }

    async fn get_project_row(&self, id: DbId) -> Result<Option<ProjectRecord>, CoreError> {
        Ok(self.lock().projects.get(&id).cloned())
    }

    async fn update_project_trial(
        &self,
        id: DbId,
        trial_ends_at: Option<Timestamp>,
    ) -> Result<(), CoreError> {
        let mut inner = self.lock();
        let record = inner.projects.get_mut(&id).ok_or_else(|| not_found(id))?;
        record.trial_ends_at = trial_ends_at;
        record.is_paused = false;
        Ok(())
    }

    async fn set_project_paused(&self, id: DbId, paused: bool) -> Result<(), CoreError> {
        let mut inner = self.lock();
        let record = inner.projects.get_mut(&id).ok_or_else(|| not_found(id))?;
        record.is_paused = paused;
        Ok(())
    }

    async fn commit_publication(
        &self,
        project: &Project,
        trial_ends_at: Option<Timestamp>,
        site: NewPublishedSite,
    ) -> Result<PublishedSite, CoreError> {
        let mut inner = self.lock();
        if !inner.projects.contains_key(&project.id) {
            return Err(not_found(project.id));
        }

        inner.last_site_id += 1;
        let published = PublishedSite {
            id: inner.last_site_id,
            project_id: site.project_id,
            version: site.version,
            storage_path: site.storage_path,
            public_url: site.public_url,
            html_hash: site.html_hash,
            css_hash: site.css_hash,
            published_at: site.published_at,
        };
        inner.sites.push(published.clone());

        if let Some(record) = inner.projects.get_mut(&project.id) {
            record.project = project.clone();
            record.trial_ends_at = trial_ends_at;
            record.is_paused = false;
        }
        Ok(published)
    }

    async fn latest_published_site(
        &self,
        project_id: DbId,
    ) -> Result<Option<PublishedSite>, CoreError> {
        Ok(self
            .lock()
            .sites
            .iter()
            .filter(|s| s.project_id == project_id)
            .max_by_key(|s| (s.version, s.id))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn site(project_id: DbId, version: VersionNumber) -> NewPublishedSite {
        NewPublishedSite {
            project_id,
            version,
            storage_path: format!("{project_id}/v{version}/index.html"),
            public_url: format!("https://cdn.test/{project_id}/v{version}/index.html"),
            html_hash: "h".into(),
            css_hash: "c".into(),
            published_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn create_and_list() {
        let store = InMemoryProjectStore::new();
        let now = chrono::Utc::now();
        let a = store.create_project(1, now).await.unwrap();
        let b = store.create_project(1, now).await.unwrap();
        store.create_project(2, now).await.unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(store.count_projects_for_user(1).await.unwrap(), 2);
        let listed = store.list_projects_for_user(1).await.unwrap();
        assert_eq!(listed[0].id, b.id);
    }

    #[tokio::test]
    async fn save_unknown_project_fails() {
        let store = InMemoryProjectStore::new();
        let ghost = Project::new(42, 1, chrono::Utc::now());
        assert_matches!(
            store.save_project(&ghost).await,
            Err(CoreError::NotFound { id: 42, .. })
        );
    }

    #[tokio::test]
    async fn commit_publication_writes_everything() {
        let store = InMemoryProjectStore::new();
        let mut project = store.create_project(1, chrono::Utc::now()).await.unwrap();
        store.set_project_paused(project.id, true).await.unwrap();
        project.published_at = Some(chrono::Utc::now());

        let trial = chrono::Utc::now() + chrono::Duration::days(15);
        let published = store
            .commit_publication(&project, Some(trial), site(project.id, 1))
            .await
            .unwrap();

        let row = store.get_project_row(project.id).await.unwrap().unwrap();
        assert_eq!(row.trial_ends_at, Some(trial));
        assert!(!row.is_paused);
        assert!(row.project.published_at.is_some());
        assert_eq!(
            store.latest_published_site(project.id).await.unwrap(),
            Some(published)
        );
    }

    #[tokio::test]
    async fn latest_site_is_highest_version() {
        let store = InMemoryProjectStore::new();
        let project = store.create_project(1, chrono::Utc::now()).await.unwrap();
        store.commit_publication(&project, None, site(project.id, 2)).await.unwrap();
        store.commit_publication(&project, None, site(project.id, 1)).await.unwrap();
        let latest = store.latest_published_site(project.id).await.unwrap().unwrap();
        assert_eq!(latest.version, 2);
    }

    #[tokio::test]
    async fn delete_cascades_to_publish_log() {
        let store = InMemoryProjectStore::new();
        let project = store.create_project(1, chrono::Utc::now()).await.unwrap();
        store.commit_publication(&project, None, site(project.id, 1)).await.unwrap();

        assert!(store.delete_project(project.id).await.unwrap());
        assert!(store.published_sites(project.id).is_empty());
        assert!(!store.delete_project(project.id).await.unwrap());
    }
}
