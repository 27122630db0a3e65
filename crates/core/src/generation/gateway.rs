//! The single entry point for AI calls.
//!
//! Every call runs the same sequence: preflight, usage guards, collaborator
//! calls, output validation, attach result, count usage, transition. Guard
//! and preflight failures leave the project untouched. Collaborator and
//! validation failures force the project into `Error` and never consume
//! quota.
//!
//! The gateway mutates the project in place; callers persist it afterwards
//! and serialize access per project.

use std::sync::Arc;

use super::{
    CopyWriter, GenerationStage, RenderedSite, SiteGenerator, SitePlanner, StageFailure,
    TemplateRenderer,
};
use crate::brand_memory::BrandMemory;
use crate::clock::Clock;
use crate::error::CoreError;
use crate::lifecycle::{ensure_transition, transition, transition_to_error, Guard, ProjectState};
use crate::limits::{AiAction, UsageGuards};
use crate::project::{Project, SiteVersion, User};
use crate::site_plan::SitePlan;
use crate::validation::{self, strip_style_tags, CssPolicy};

/// The external generation services the gateway drives.
#[derive(Clone)]
pub struct Collaborators {
    pub planner: Arc<dyn SitePlanner>,
    pub generator: Arc<dyn SiteGenerator>,
    pub copy_writer: Arc<dyn CopyWriter>,
    pub renderer: Arc<dyn TemplateRenderer>,
}

/// A change to one template image slot. `Some("")` clears the field.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
pub struct ImageSlotEdit {
    pub keyword: Option<String>,
    pub override_url: Option<String>,
}

#[derive(Clone)]
pub struct GenerationGateway {
    collaborators: Collaborators,
    guards: UsageGuards,
    css_policy: CssPolicy,
    clock: Arc<dyn Clock>,
}

impl GenerationGateway {
    pub fn new(
        collaborators: Collaborators,
        guards: UsageGuards,
        css_policy: CssPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            collaborators,
            guards,
            css_policy,
            clock,
        }
    }

    pub fn guards(&self) -> &UsageGuards {
        &self.guards
    }

    pub fn css_policy(&self) -> &CssPolicy {
        &self.css_policy
    }

    /// `MemoryReady -> PlanReady` through one planner call.
    pub async fn generate_plan(
        &self,
        project: &mut Project,
        user: &User,
    ) -> Result<SitePlan, CoreError> {
        let memory = preflight(
            project,
            user,
            ProjectState::MemoryReady,
            ProjectState::PlanReady,
        )?;
        self.guards
            .check(&project.ai_usage, user, AiAction::Planner, self.clock.now())?;

        tracing::info!(project_id = project.id, user_id = user.id, "Generating site plan");

        let plan = match self.collaborators.planner.plan(&memory).await {
            Ok(plan) => plan,
            Err(e) => return Err(self.fail_stage(project, GenerationStage::Planner, e)),
        };
        if let Err(e) = plan.validate() {
            return Err(self.fail_validation(project, GenerationStage::Planner, e));
        }

        project.site_plan = Some(plan.clone());
        self.finish(project, user, AiAction::Planner, ProjectState::PlanReady)?;
        Ok(plan)
    }

    /// `PlanApproved -> SiteGenerated` through an HTML call followed by a
    /// CSS call. Counts as one generation.
    pub async fn generate_site(
        &self,
        project: &mut Project,
        user: &User,
    ) -> Result<SiteVersion, CoreError> {
        let memory = preflight(
            project,
            user,
            ProjectState::PlanApproved,
            ProjectState::SiteGenerated,
        )?;
        Guard::HasSitePlan.check(project)?;
        let plan = project.site_plan.clone().ok_or_else(missing_plan)?;
        self.guards
            .check(&project.ai_usage, user, AiAction::Generation, self.clock.now())?;

        tracing::info!(project_id = project.id, user_id = user.id, "Generating site");

        let html = match self.collaborators.generator.generate_html(&plan, &memory).await {
            Ok(html) => strip_style_tags(&html),
            Err(e) => return Err(self.fail_stage(project, GenerationStage::HtmlGenerator, e)),
        };
        if let Err(e) = validation::validate_html(&html) {
            return Err(self.fail_validation(project, GenerationStage::HtmlGenerator, e));
        }

        let css = match self.collaborators.generator.generate_css(&html, &memory).await {
            Ok(css) => css,
            Err(e) => return Err(self.fail_stage(project, GenerationStage::CssGenerator, e)),
        };
        if let Err(e) = validation::validate_css(&css, &self.css_policy) {
            return Err(self.fail_validation(project, GenerationStage::CssGenerator, e));
        }

        let version = SiteVersion {
            html,
            css,
            version: SiteVersion::next_number(project.site_version.as_ref()),
            is_published: false,
        };
        project.site_version = Some(version.clone());
        self.finish(project, user, AiAction::Generation, ProjectState::SiteGenerated)?;
        Ok(version)
    }

    /// `MemoryReady -> SiteGenerated` through the template flow: one copy
    /// writer call picks a template and writes its copy, then the template is
    /// rendered locally. Counts as one generation.
    pub async fn generate_and_render(
        &self,
        project: &mut Project,
        user: &User,
    ) -> Result<SiteVersion, CoreError> {
        let memory = preflight(
            project,
            user,
            ProjectState::MemoryReady,
            ProjectState::SiteGenerated,
        )?;
        self.guards
            .check(&project.ai_usage, user, AiAction::Generation, self.clock.now())?;

        tracing::info!(project_id = project.id, user_id = user.id, "Writing copy for template");

        let summary = self.collaborators.renderer.catalog_summary();
        let plan = match self.collaborators.copy_writer.write_copy(&memory, &summary).await {
            Ok(plan) => plan,
            Err(e) => return Err(self.fail_stage(project, GenerationStage::CopyWriter, e)),
        };
        if let Err(e) = plan.validate() {
            return Err(self.fail_validation(project, GenerationStage::CopyWriter, e));
        }
        let Some(template_id) = plan.template_id().map(str::to_string) else {
            let e = StageFailure::Schema("no template selected".into());
            return Err(self.fail_stage(project, GenerationStage::CopyWriter, e));
        };

        let rendered = match self.collaborators.renderer.render(&template_id, &plan, &memory) {
            Ok(rendered) => rendered,
            Err(e) => return Err(self.fail_stage(project, GenerationStage::TemplateRenderer, e)),
        };
        if let Err(e) = validation::validate_site(&rendered.html, &rendered.css, &self.css_policy)
        {
            return Err(self.fail_validation(project, GenerationStage::TemplateRenderer, e));
        }

        let version = SiteVersion {
            html: rendered.html,
            css: rendered.css,
            version: SiteVersion::next_number(project.site_version.as_ref()),
            is_published: false,
        };
        project.site_plan = Some(plan);
        project.template_id = Some(template_id);
        project.site_version = Some(version.clone());
        self.finish(project, user, AiAction::Generation, ProjectState::SiteGenerated)?;
        Ok(version)
    }

    /// Re-render the current template-bound plan after an edit. No AI call,
    /// no quota, no state change. A failure leaves the project untouched.
    pub fn rerender(&self, project: &mut Project) -> Result<SiteVersion, CoreError> {
        ensure_editable(project)?;
        let memory = project.brand_memory.as_ref().ok_or_else(|| missing(Guard::HasBrandMemory))?;
        let plan = project.site_plan.as_ref().ok_or_else(missing_plan)?;
        let template_id = project
            .template_id
            .as_deref()
            .or_else(|| plan.template_id())
            .ok_or_else(|| CoreError::GuardFailure {
                guard: "has_template",
                reason: "Project was not generated from a template".into(),
            })?;

        let RenderedSite { html, css } = self
            .collaborators
            .renderer
            .render(template_id, plan, memory)
            .map_err(|e| CoreError::AiGeneration {
                stage: GenerationStage::TemplateRenderer,
                detail: e.to_string(),
            })?;
        validation::validate_site(&html, &css, &self.css_policy)?;

        let version = SiteVersion {
            html,
            css,
            version: SiteVersion::next_number(project.site_version.as_ref()),
            is_published: false,
        };
        project.site_version = Some(version.clone());
        project.updated_at = self.clock.now();
        tracing::debug!(project_id = project.id, version = version.version, "Site re-rendered");
        Ok(version)
    }

    /// Change the keyword or uploaded override of one image slot, then
    /// re-render. The plan is restored if rendering fails.
    pub fn set_image_slot(
        &self,
        project: &mut Project,
        slot: &str,
        edit: &ImageSlotEdit,
    ) -> Result<SiteVersion, CoreError> {
        ensure_editable(project)?;
        let slot = slot.trim();
        if slot.is_empty() {
            return Err(CoreError::Validation("Image slot name is required".into()));
        }
        if let Some(url) = edit.override_url.as_deref().map(str::trim) {
            if !url.is_empty() && !url.starts_with("https://") && !url.starts_with('/') {
                return Err(CoreError::Validation(
                    "Image override must be an https:// or site-relative URL".into(),
                ));
            }
        }

        let plan = project.site_plan.as_mut().ok_or_else(missing_plan)?;
        let previous = plan.clone();
        apply_slot_edit(&mut plan.image_keywords, slot, edit.keyword.as_deref());
        apply_slot_edit(&mut plan.image_overrides, slot, edit.override_url.as_deref());

        self.rerender(project).inspect_err(|_| {
            project.site_plan = Some(previous);
        })
    }

    /// Count the call, then move to `target`. Usage is only touched here,
    /// after every stage succeeded.
    fn finish(
        &self,
        project: &mut Project,
        user: &User,
        action: AiAction,
        target: ProjectState,
    ) -> Result<(), CoreError> {
        let now = self.clock.now();
        self.guards
            .record_success(&mut project.ai_usage, user, action, now);
        transition(project, target, now)?;
        tracing::info!(
            project_id = project.id,
            user_id = user.id,
            action = %action,
            state = %project.state,
            "Generation succeeded",
        );
        Ok(())
    }

    fn fail_stage(&self, project: &mut Project, stage: GenerationStage, e: StageFailure) -> CoreError {
        tracing::error!(project_id = project.id, stage = %stage, error = %e, "Generation stage failed");
        transition_to_error(project, self.clock.now());
        CoreError::AiGeneration {
            stage,
            detail: e.to_string(),
        }
    }

    fn fail_validation(
        &self,
        project: &mut Project,
        stage: GenerationStage,
        e: CoreError,
    ) -> CoreError {
        tracing::warn!(project_id = project.id, stage = %stage, error = %e, "Generated output rejected");
        transition_to_error(project, self.clock.now());
        e
    }
}

/// Ownership, source state, reachability of `target`, and brand memory.
/// Returns the memory the call will consume.
fn preflight(
    project: &Project,
    user: &User,
    source: ProjectState,
    target: ProjectState,
) -> Result<BrandMemory, CoreError> {
    if !project.is_owned_by(user.id) {
        return Err(CoreError::Forbidden("Project belongs to another user".into()));
    }
    if project.state != source {
        return Err(CoreError::InvalidStateTransition {
            from: project.state,
            to: target,
        });
    }
    ensure_transition(project.state, target)?;
    project
        .brand_memory
        .clone()
        .ok_or_else(|| missing(Guard::HasBrandMemory))
}

fn ensure_editable(project: &Project) -> Result<(), CoreError> {
    if matches!(project.state, ProjectState::SiteGenerated | ProjectState::Preview) {
        Ok(())
    } else {
        Err(CoreError::GuardFailure {
            guard: "editable_state",
            reason: format!("Site cannot be edited in state {}", project.state),
        })
    }
}

fn apply_slot_edit(
    map: &mut std::collections::BTreeMap<String, String>,
    slot: &str,
    value: Option<&str>,
) {
    match value.map(str::trim) {
        None => {}
        Some("") => {
            map.remove(slot);
        }
        Some(v) => {
            map.insert(slot.to_string(), v.to_string());
        }
    }
}

fn missing(guard: Guard) -> CoreError {
    CoreError::GuardFailure {
        guard: guard.name(),
        reason: format!("Missing data required by {}", guard.name()),
    }
}

fn missing_plan() -> CoreError {
    missing(Guard::HasSitePlan)
}
