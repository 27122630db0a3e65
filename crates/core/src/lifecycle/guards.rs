//! Preconditions for entering a state, keyed by the target state.

use super::states::ProjectState;
use crate::error::CoreError;
use crate::project::Project;

/// A named precondition checked before a project may enter a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    HasBrandMemory,
    HasSitePlan,
    HasSiteVersion,
}

impl Guard {
    pub fn name(self) -> &'static str {
        match self {
            Self::HasBrandMemory => "has_brand_memory",
            Self::HasSitePlan => "has_site_plan",
            Self::HasSiteVersion => "has_site_version",
        }
    }

    fn reason(self) -> &'static str {
        match self {
            Self::HasBrandMemory => "Project must have brand memory before planning",
            Self::HasSitePlan => "Project must have a site plan before generation",
            Self::HasSiteVersion => "Project must have a generated site before preview",
        }
    }

    fn is_met(self, project: &Project) -> bool {
        match self {
            Self::HasBrandMemory => project.brand_memory.is_some(),
            Self::HasSitePlan => project.site_plan.is_some(),
            Self::HasSiteVersion => project.site_version.is_some(),
        }
    }

    /// Fail with [`CoreError::GuardFailure`] if `project` does not satisfy
    /// this guard.
    pub fn check(self, project: &Project) -> Result<(), CoreError> {
        if self.is_met(project) {
            Ok(())
        } else {
            Err(CoreError::GuardFailure {
                guard: self.name(),
                reason: self.reason().to_string(),
            })
        }
    }
}

/// Guards registered for entering `target`.
pub fn guards_for(target: ProjectState) -> &'static [Guard] {
    match target {
        ProjectState::PlanReady => &[Guard::HasBrandMemory],
        ProjectState::SiteGenerated => &[Guard::HasSitePlan],
        ProjectState::Preview | ProjectState::Published => &[Guard::HasSiteVersion],
        _ => &[],
    }
}

/// Run every guard for `target`, stopping at the first unmet one.
pub fn run_guards(project: &Project, target: ProjectState) -> Result<(), CoreError> {
    guards_for(target)
        .iter()
        .try_for_each(|guard| guard.check(project))
}
