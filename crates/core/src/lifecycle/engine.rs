//! Applying transitions to a project.

use super::guards::run_guards;
use super::states::ProjectState;
use super::transitions::can_transition;
use crate::error::CoreError;
use crate::project::Project;
use crate::types::Timestamp;

/// Move `project` to `target`.
///
/// Rejects targets outside the transition table, then runs the guards for
/// `target`. The project is only mutated once both pass.
pub fn transition(
    project: &mut Project,
    target: ProjectState,
    now: Timestamp,
) -> Result<(), CoreError> {
    ensure_transition(project.state, target)?;
    run_guards(project, target)?;

    tracing::debug!(
        project_id = project.id,
        from = %project.state,
        to = %target,
        "Project state transition",
    );
    project.state = target;
    project.updated_at = now;
    Ok(())
}

/// Force `project` into `Error`. Always succeeds.
pub fn transition_to_error(project: &mut Project, now: Timestamp) {
    if project.state != ProjectState::Error {
        tracing::warn!(
            project_id = project.id,
            from = %project.state,
            "Project forced into error state",
        );
    }
    project.state = ProjectState::Error;
    project.updated_at = now;
}

/// Fail with [`CoreError::InvalidStateTransition`] unless `from -> to` is in
/// the table. Does not look at guards.
pub fn ensure_transition(from: ProjectState, to: ProjectState) -> Result<(), CoreError> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(CoreError::InvalidStateTransition { from, to })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::brand_memory::BrandMemory;
    use crate::lifecycle::transitions::valid_transitions;
    use crate::project::SiteVersion;
    use crate::site_plan::{SectionPlan, SitePlan};

    fn now() -> Timestamp {
        chrono::Utc::now()
    }

    /// A project holding every piece of data any guard asks for.
    fn complete_project(state: ProjectState) -> Project {
        let mut p = Project::new(1, 1, now());
        p.state = state;
        p.brand_memory = Some(BrandMemory::new("Acme", "bakery", "walk-ins"));
        p.site_plan = Some(SitePlan::new("Acme", vec![SectionPlan::new("hero", "Hero")]));
        p.site_version = Some(SiteVersion {
            html: "<!DOCTYPE html>".into(),
            css: String::new(),
            version: 1,
            is_published: false,
        });
        p
    }

    #[test]
    fn every_table_pair_succeeds_when_guards_pass() {
        for from in ProjectState::ALL {
            for &to in valid_transitions(from) {
                let mut p = complete_project(from);
                transition(&mut p, to, now()).unwrap();
                assert_eq!(p.state, to);
            }
        }
    }

    #[test]
    fn every_other_pair_is_rejected_without_mutation() {
        for from in ProjectState::ALL {
            for to in ProjectState::ALL {
                if valid_transitions(from).contains(&to) {
                    continue;
                }
                let mut p = complete_project(from);
                let before = p.clone();
                assert_matches!(
                    transition(&mut p, to, now()),
                    Err(CoreError::InvalidStateTransition { from: f, to: t }) if f == from && t == to
                );
                assert_eq!(p, before);
            }
        }
    }

    #[test]
    fn guard_failure_leaves_state_untouched() {
        let mut p = Project::new(1, 1, now());
        p.state = ProjectState::MemoryReady;
        assert_matches!(
            transition(&mut p, ProjectState::PlanReady, now()),
            Err(CoreError::GuardFailure { .. })
        );
        assert_eq!(p.state, ProjectState::MemoryReady);
    }

    #[test]
    fn missing_artifact_fails_its_guard() {
        let cases: [(ProjectState, ProjectState, fn(&mut Project), &str); 4] = [
            (ProjectState::MemoryReady, ProjectState::SiteGenerated, |p| p.site_plan = None, "has_site_plan"),
            (ProjectState::PlanApproved, ProjectState::SiteGenerated, |p| p.site_plan = None, "has_site_plan"),
            (ProjectState::SiteGenerated, ProjectState::Preview, |p| p.site_version = None, "has_site_version"),
            (ProjectState::Preview, ProjectState::Published, |p| p.site_version = None, "has_site_version"),
        ];

        for (from, to, strip, expected) in cases {
            let mut p = complete_project(from);
            strip(&mut p);
            let before = p.clone();
            assert_matches!(
                transition(&mut p, to, now()),
                Err(CoreError::GuardFailure { guard, .. }) if guard == expected,
                "{from:?} -> {to:?}"
            );
            assert_eq!(p, before, "{from:?} -> {to:?}");
        }
    }

    #[test]
    fn transition_to_error_from_every_state() {
        for state in ProjectState::ALL {
            let mut p = complete_project(state);
            transition_to_error(&mut p, now());
            assert_eq!(p.state, ProjectState::Error);
        }
    }

    #[test]
    fn error_recovers_only_to_draft() {
        let mut p = complete_project(ProjectState::Error);
        assert!(transition(&mut p, ProjectState::MemoryReady, now()).is_err());
        transition(&mut p, ProjectState::Draft, now()).unwrap();
        assert_eq!(p.state, ProjectState::Draft);
    }

    #[test]
    fn transition_stamps_updated_at() {
        let mut p = complete_project(ProjectState::Draft);
        let later = p.updated_at + chrono::Duration::minutes(5);
        transition(&mut p, ProjectState::InputReady, later).unwrap();
        assert_eq!(p.updated_at, later);
    }
}
