//! User-driven lifecycle steps that involve no AI call.
//!
//! Each function mutates the project in place and leaves persistence to the
//! caller.

use super::engine::{transition, transition_to_error};
use super::states::ProjectState;
use crate::brand_memory::BrandMemory;
use crate::error::CoreError;
use crate::lifecycle::guards::Guard;
use crate::project::Project;
use crate::types::Timestamp;

/// A literal text replacement inside the current site HTML.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct TextEdit {
    pub old_text: String,
    pub new_text: String,
}

/// Attach (or replace) the project's brand memory and walk it forward to
/// `MemoryReady`.
///
/// Editing the memory of a project that already has a plan or a site forces
/// it through `Error` back to `Draft`, so every downstream artifact has to be
/// regenerated from the new facts. Published projects are frozen.
pub fn attach_brand_memory(
    project: &mut Project,
    mut memory: BrandMemory,
    now: Timestamp,
) -> Result<(), CoreError> {
    memory.validate()?;
    memory.normalize_assets();

    match project.state {
        ProjectState::Published => {
            return Err(CoreError::InvalidStateTransition {
                from: ProjectState::Published,
                to: ProjectState::InputReady,
            });
        }
        ProjectState::PlanReady
        | ProjectState::PlanApproved
        | ProjectState::SiteGenerated
        | ProjectState::Preview => {
            tracing::info!(project_id = project.id, "Brand memory re-edited, restarting lifecycle");
            transition_to_error(project, now);
            transition(project, ProjectState::Draft, now)?;
        }
        ProjectState::Error => transition(project, ProjectState::Draft, now)?,
        ProjectState::Draft | ProjectState::InputReady | ProjectState::MemoryReady => {}
    }

    project.brand_memory = Some(memory);
    project.updated_at = now;

    if project.state == ProjectState::Draft {
        transition(project, ProjectState::InputReady, now)?;
    }
    if project.state == ProjectState::InputReady {
        transition(project, ProjectState::MemoryReady, now)?;
    }
    Ok(())
}

/// `PlanReady -> PlanApproved`.
pub fn approve_plan(project: &mut Project, now: Timestamp) -> Result<(), CoreError> {
    transition(project, ProjectState::PlanApproved, now)
}

/// `SiteGenerated -> Preview`.
pub fn move_to_preview(project: &mut Project, now: Timestamp) -> Result<(), CoreError> {
    transition(project, ProjectState::Preview, now)
}

/// `Error -> Draft`. Brand memory and usage counters are kept.
pub fn restart(project: &mut Project, now: Timestamp) -> Result<(), CoreError> {
    transition(project, ProjectState::Draft, now)
}

/// Apply literal text replacements to the current site HTML without any AI
/// call. Returns how many occurrences were replaced.
///
/// Only allowed while the site is editable (`SiteGenerated` or `Preview`).
/// Replacement text may not contain markup.
pub fn apply_text_edits(
    project: &mut Project,
    edits: &[TextEdit],
    now: Timestamp,
) -> Result<usize, CoreError> {
    if !matches!(project.state, ProjectState::SiteGenerated | ProjectState::Preview) {
        return Err(CoreError::GuardFailure {
            guard: "editable_state",
            reason: format!("Text edits are not allowed in state {}", project.state),
        });
    }
    Guard::HasSiteVersion.check(project)?;

    for edit in edits {
        if edit.old_text.is_empty() {
            return Err(CoreError::Validation("Original text is required".into()));
        }
        if edit.new_text.contains(['<', '>']) {
            return Err(CoreError::Validation(
                "Replacement text may not contain markup".into(),
            ));
        }
    }

    let Some(version) = project.site_version.as_mut() else {
        return Ok(0);
    };

    let mut replaced = 0;
    for edit in edits {
        replaced += version.html.matches(edit.old_text.as_str()).count();
        version.html = version.html.replace(&edit.old_text, &edit.new_text);
    }

    if replaced > 0 {
        project.updated_at = now;
    }
    Ok(replaced)
}
