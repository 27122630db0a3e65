//! `Preview -> Published`: validate, render, upload, record, transition.

use std::sync::Arc;

use sha2::{Digest, Sha256};

use super::pause::{paused_page_html, should_pause_site};
use super::renderer::render_final_page;
use super::trial::trial_end;
use super::urls::storage_path;
use super::SiteStorage;
use crate::clock::Clock;
use crate::error::CoreError;
use crate::lifecycle::{ensure_transition, transition, Guard, ProjectState};
use crate::project::{Project, User};
use crate::store::{NewPublishedSite, ProjectStore, PublishedSite};
use crate::types::{DbId, Timestamp};
use crate::validation::{validate_site, CssPolicy};

/// Content type of uploaded pages.
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Result of a publish request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOutcome {
    pub site: PublishedSite,
    pub trial_ends_at: Option<Timestamp>,
    /// `true` when the project was already published at this version and
    /// nothing was uploaded.
    pub already_published: bool,
}

/// What a visitor of a project's public address gets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicSite {
    /// Not published, or never uploaded.
    NotFound,
    /// The trial ran out. Serve this page instead.
    Paused { html: String },
    /// Redirect to the uploaded page.
    Live { public_url: String },
}

fn sha256_hex(content: &str) -> String {
    Sha256::digest(content.as_bytes())
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

#[derive(Clone)]
pub struct PublishPipeline {
    storage: Arc<dyn SiteStorage>,
    store: Arc<dyn ProjectStore>,
    css_policy: CssPolicy,
    trial_duration: chrono::Duration,
    clock: Arc<dyn Clock>,
}

impl PublishPipeline {
    pub fn new(
        storage: Arc<dyn SiteStorage>,
        store: Arc<dyn ProjectStore>,
        css_policy: CssPolicy,
        trial_duration: chrono::Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            storage,
            store,
            css_policy,
            trial_duration,
            clock,
        }
    }

    /// Publish the project's current site version.
    ///
    /// Nothing is committed unless the upload succeeds; the project, the
    /// trial expiry, and the publish log entry are then written together.
    /// Validation failures here do not force `Error`, so a hand edit can
    /// fix them. On success `project` is updated in place.
    pub async fn publish(
        &self,
        project: &mut Project,
        user: &User,
    ) -> Result<PublishOutcome, CoreError> {
        if !project.is_owned_by(user.id) {
            return Err(CoreError::Forbidden("Project belongs to another user".into()));
        }

        if project.state == ProjectState::Published {
            return self.existing_publication(project, user).await;
        }

        ensure_transition(project.state, ProjectState::Published)?;
        Guard::HasSiteVersion.check(project)?;
        let Some(version) = project.site_version.clone() else {
            return Err(CoreError::Internal("site version vanished".into()));
        };

        validate_site(&version.html, &version.css, &self.css_policy)?;
        let page = render_final_page(&version.html, &version.css);

        let path = storage_path(project.id, version.version);
        let stored_path = self
            .storage
            .upload(&path, page.into_bytes(), HTML_CONTENT_TYPE)
            .await
            .inspect_err(|e| {
                tracing::error!(project_id = project.id, path = %path, error = %e, "Site upload failed");
            })?;
        let public_url = self.storage.public_url(&stored_path);

        let now = self.clock.now();
        let mut published = project.clone();
        transition(&mut published, ProjectState::Published, now)?;
        published.published_at = Some(now);
        if let Some(v) = published.site_version.as_mut() {
            v.is_published = true;
        }

        let trial_ends_at = user
            .plan
            .has_publish_trial()
            .then(|| trial_end(now, self.trial_duration));

        let site = self
            .store
            .commit_publication(
                &published,
                trial_ends_at,
                NewPublishedSite {
                    project_id: project.id,
                    version: version.version,
                    storage_path: stored_path,
                    public_url,
                    html_hash: sha256_hex(&version.html),
                    css_hash: sha256_hex(&version.css),
                    published_at: now,
                },
            )
            .await?;

        *project = published;
        tracing::info!(
            project_id = project.id,
            user_id = user.id,
            version = version.version,
            public_url = %site.public_url,
            "Project published",
        );

        Ok(PublishOutcome {
            site,
            trial_ends_at,
            already_published: false,
        })
    }

    /// Re-publishing the same version returns the existing entry.
    ///
    /// An owner whose plan no longer carries a trial gets the trial lifted,
    /// which also unpauses the site.
    async fn existing_publication(
        &self,
        project: &Project,
        user: &User,
    ) -> Result<PublishOutcome, CoreError> {
        let current = project.site_version.as_ref().map(|v| v.version);
        let site = self.store.latest_published_site(project.id).await?;
        match site {
            Some(site) if Some(site.version) == current => {
                let mut trial_ends_at = self
                    .store
                    .get_project_row(project.id)
                    .await?
                    .and_then(|row| row.trial_ends_at);
                if trial_ends_at.is_some() && !user.plan.has_publish_trial() {
                    self.store.update_project_trial(project.id, None).await?;
                    trial_ends_at = None;
                    tracing::info!(project_id = project.id, user_id = user.id, "Trial lifted");
                }
                Ok(PublishOutcome {
                    site,
                    trial_ends_at,
                    already_published: true,
                })
            }
            _ => Err(CoreError::InvalidStateTransition {
                from: ProjectState::Published,
                to: ProjectState::Published,
            }),
        }
    }

    /// Resolve what the public address of `project_id` serves, pausing the
    /// site when its trial has expired.
    pub async fn view_site(&self, project_id: DbId) -> Result<PublicSite, CoreError> {
        let Some(row) = self.store.get_project_row(project_id).await? else {
            return Ok(PublicSite::NotFound);
        };
        if row.project.state != ProjectState::Published {
            return Ok(PublicSite::NotFound);
        }

        if should_pause_site(row.trial_ends_at, self.clock.now()) {
            if !row.is_paused {
                tracing::info!(project_id, "Trial expired, pausing site");
                self.store.set_project_paused(project_id, true).await?;
            }
            return Ok(PublicSite::Paused {
                html: paused_page_html(row.project.business_name()),
            });
        }

        Ok(match self.store.latest_published_site(project_id).await? {
            Some(site) => PublicSite::Live {
                public_url: site.public_url,
            },
            None => PublicSite::NotFound,
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Duration;

    use super::*;
    use crate::brand_memory::BrandMemory;
    use crate::clock::ManualClock;
    use crate::plans::PlanTier;
    use crate::project::SiteVersion;
    use crate::publishing::InMemorySiteStorage;
    use crate::store::InMemoryProjectStore;

    const HTML: &str = "<!DOCTYPE html><html><head><title>Acme</title></head><body><nav></nav><footer></footer></body></html>";

    struct Harness {
        clock: Arc<ManualClock>,
        storage: Arc<InMemorySiteStorage>,
        store: Arc<InMemoryProjectStore>,
        pipeline: PublishPipeline,
    }

    fn harness() -> Harness {
        let clock = Arc::new(ManualClock::new(chrono::Utc::now()));
        let storage = Arc::new(InMemorySiteStorage::new("https://sites.test"));
        let store = Arc::new(InMemoryProjectStore::new());
        let pipeline = PublishPipeline::new(
            storage.clone(),
            store.clone(),
            CssPolicy::default(),
            Duration::days(15),
            clock.clone(),
        );
        Harness {
            clock,
            storage,
            store,
            pipeline,
        }
    }

    fn user(plan: PlanTier) -> User {
        User {
            id: 1,
            email: "owner@acme.test".into(),
            plan,
        }
    }

    async fn preview_project(h: &Harness, html: &str) -> Project {
        let mut p = h.store.create_project(1, h.clock.now()).await.unwrap();
        p.state = ProjectState::Preview;
        p.brand_memory = Some(BrandMemory::new("Acme", "bakery", "walk-ins"));
        p.site_version = Some(SiteVersion {
            html: html.into(),
            css: "body{color:#2563eb}".into(),
            version: 1,
            is_published: false,
        });
        h.store.save_project(&p).await.unwrap();
        p
    }

    #[tokio::test]
    async fn publish_commits_everything() {
        let h = harness();
        let mut p = preview_project(&h, HTML).await;
        let outcome = h.pipeline.publish(&mut p, &user(PlanTier::Free)).await.unwrap();

        assert_eq!(p.state, ProjectState::Published);
        assert_eq!(p.published_at, Some(h.clock.now()));
        assert!(p.site_version.as_ref().unwrap().is_published);
        assert_eq!(outcome.trial_ends_at, Some(h.clock.now() + Duration::days(15)));
        assert_eq!(outcome.site.storage_path, format!("{}/v1/index.html", p.id));
        assert_eq!(outcome.site.html_hash, sha256_hex(HTML));
        assert_eq!(outcome.site.html_hash.len(), 64);

        let uploaded = h.storage.get(&outcome.site.storage_path).unwrap();
        let uploaded = String::from_utf8(uploaded).unwrap();
        assert!(uploaded.contains("<style>\nbody{color:#2563eb}\n</style>"));
        assert!(uploaded.contains("menu-btn"));

        let row = h.store.get_project_row(p.id).await.unwrap().unwrap();
        assert_eq!(row.project.state, ProjectState::Published);
        assert_eq!(row.trial_ends_at, outcome.trial_ends_at);
    }

    #[tokio::test]
    async fn paid_owner_gets_no_trial() {
        let h = harness();
        let mut p = preview_project(&h, HTML).await;
        let outcome = h.pipeline.publish(&mut p, &user(PlanTier::Paid)).await.unwrap();
        assert_eq!(outcome.trial_ends_at, None);
    }

    #[tokio::test]
    async fn failed_upload_commits_nothing() {
        let h = harness();
        h.storage.fail_uploads(true);
        let mut p = preview_project(&h, HTML).await;

        assert_matches!(
            h.pipeline.publish(&mut p, &user(PlanTier::Free)).await,
            Err(CoreError::Storage(_))
        );
        assert_eq!(p.state, ProjectState::Preview);
        let row = h.store.get_project_row(p.id).await.unwrap().unwrap();
        assert_eq!(row.project.state, ProjectState::Preview);
        assert!(row.trial_ends_at.is_none());
        assert!(h.store.latest_published_site(p.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn invalid_html_rejected_without_error_state() {
        let h = harness();
        let mut p = preview_project(&h, "<!DOCTYPE html><body><script>x</script></body>").await;
        assert_matches!(
            h.pipeline.publish(&mut p, &user(PlanTier::Free)).await,
            Err(CoreError::AiValidation { issues }) if issues.len() == 3
        );
        assert_eq!(p.state, ProjectState::Preview);
        assert!(h.storage.is_empty());
    }

    #[tokio::test]
    async fn publish_requires_preview() {
        let h = harness();
        let mut p = preview_project(&h, HTML).await;
        p.state = ProjectState::SiteGenerated;
        assert_matches!(
            h.pipeline.publish(&mut p, &user(PlanTier::Free)).await,
            Err(CoreError::InvalidStateTransition { .. })
        );
    }

    #[tokio::test]
    async fn republish_is_idempotent() {
        let h = harness();
        let mut p = preview_project(&h, HTML).await;
        let first = h.pipeline.publish(&mut p, &user(PlanTier::Free)).await.unwrap();
        h.clock.advance(Duration::hours(1));
        let second = h.pipeline.publish(&mut p, &user(PlanTier::Free)).await.unwrap();

        assert!(second.already_published);
        assert_eq!(second.site, first.site);
        assert_eq!(second.trial_ends_at, first.trial_ends_at);
        assert_eq!(h.store.published_sites(p.id).len(), 1);
        assert_eq!(h.storage.len(), 1);
    }

    #[tokio::test]
    async fn expired_trial_pauses_site() {
        let h = harness();
        let mut p = preview_project(&h, HTML).await;
        let outcome = h.pipeline.publish(&mut p, &user(PlanTier::Free)).await.unwrap();

        assert_eq!(
            h.pipeline.view_site(p.id).await.unwrap(),
            PublicSite::Live {
                public_url: outcome.site.public_url.clone()
            }
        );

        h.clock.advance(Duration::days(15));
        assert_matches!(
            h.pipeline.view_site(p.id).await.unwrap(),
            PublicSite::Paused { html } if html.contains("Acme")
        );
        assert!(h.store.get_project_row(p.id).await.unwrap().unwrap().is_paused);
    }

    #[tokio::test]
    async fn upgraded_owner_republishing_lifts_trial_and_pause() {
        let h = harness();
        let mut p = preview_project(&h, HTML).await;
        let outcome = h.pipeline.publish(&mut p, &user(PlanTier::Free)).await.unwrap();
        h.clock.advance(Duration::days(16));
        h.pipeline.view_site(p.id).await.unwrap();
        assert!(h.store.get_project_row(p.id).await.unwrap().unwrap().is_paused);

        let again = h.pipeline.publish(&mut p, &user(PlanTier::Paid)).await.unwrap();
        assert!(again.already_published);
        assert_eq!(again.trial_ends_at, None);

        let row = h.store.get_project_row(p.id).await.unwrap().unwrap();
        assert_eq!(row.trial_ends_at, None);
        assert!(!row.is_paused);
        assert_eq!(
            h.pipeline.view_site(p.id).await.unwrap(),
            PublicSite::Live {
                public_url: outcome.site.public_url
            }
        );
    }

    #[tokio::test]
    async fn unpublished_site_not_found() {
        let h = harness();
        let p = preview_project(&h, HTML).await;
        assert_eq!(h.pipeline.view_site(p.id).await.unwrap(), PublicSite::NotFound);
        assert_eq!(h.pipeline.view_site(999).await.unwrap(), PublicSite::NotFound);
    }
}
