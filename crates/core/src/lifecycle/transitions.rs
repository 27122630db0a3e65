//! The transition table.
//!
//! Forward-only, with `Error` as the escape hatch: any state may be forced
//! into `Error` (see [`super::engine::transition_to_error`]), and `Error` may
//! only go back to `Draft`.

use super::states::ProjectState;
use crate::limits::AiAction;

/// Returns the states reachable from `from` through a normal transition.
///
/// `MemoryReady` has two successors: `PlanReady` for the plan-then-approve
/// flow and `SiteGenerated` for the template flow. `Published` is terminal.
pub fn valid_transitions(from: ProjectState) -> &'static [ProjectState] {
    use ProjectState::*;
    match from {
        Draft => &[InputReady],
        InputReady => &[MemoryReady],
        MemoryReady => &[PlanReady, SiteGenerated],
        PlanReady => &[PlanApproved],
        PlanApproved => &[SiteGenerated],
        SiteGenerated => &[Preview],
        Preview => &[Published],
        Published => &[],
        Error => &[Draft],
    }
}

/// Check whether a transition from `from` to `to` is in the table.
pub fn can_transition(from: ProjectState, to: ProjectState) -> bool {
    valid_transitions(from).contains(&to)
}

/// The AI action a project in `state` is waiting on, if any.
pub fn ai_action_for(state: ProjectState) -> Option<AiAction> {
    match state {
        ProjectState::MemoryReady => Some(AiAction::Planner),
        ProjectState::PlanApproved => Some(AiAction::Generation),
        _ => None,
    }
}
