use crate::generation::GenerationStage;
use crate::lifecycle::ProjectState;
use crate::limits::AiAction;
use crate::plans::PlanTier;
use crate::types::DbId;

/// Every failure the core can report.
///
/// Callers branch on the variant, so each lifecycle and usage condition gets
/// its own kind rather than a shared string bucket:
///
/// - lifecycle ordering: [`InvalidStateTransition`](Self::InvalidStateTransition),
///   [`GuardFailure`](Self::GuardFailure)
/// - soft usage limits: [`AiLimitExceeded`](Self::AiLimitExceeded),
///   [`AiCooldownActive`](Self::AiCooldownActive),
///   [`AiRateLimited`](Self::AiRateLimited)
/// - unusable model output: [`AiGeneration`](Self::AiGeneration),
///   [`AiValidation`](Self::AiValidation)
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Cannot transition from {from} to {to}")]
    InvalidStateTransition { from: ProjectState, to: ProjectState },

    #[error("Guard '{guard}' failed: {reason}")]
    GuardFailure { guard: &'static str, reason: String },

    #[error("AI limit exceeded for {action} on {plan} plan")]
    AiLimitExceeded { action: AiAction, plan: PlanTier },

    #[error("AI cooldown active. Wait {} seconds.", .seconds_remaining.ceil())]
    AiCooldownActive { seconds_remaining: f64 },

    #[error("AI rate limit exceeded. Try again later.")]
    AiRateLimited,

    #[error("AI generation failed at {stage}: {detail}")]
    AiGeneration { stage: GenerationStage, detail: String },

    #[error("AI output validation failed: {}", .issues.join("; "))]
    AiValidation { issues: Vec<String> },

    #[error("Project limit reached for the {plan} plan")]
    ProjectLimitReached { plan: PlanTier },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Whether this error was raised by a usage guard (quota, cooldown, or
    /// rate limit). These never mutate the project.
    pub fn is_usage_limit(&self) -> bool {
        matches!(
            self,
            Self::AiLimitExceeded { .. } | Self::AiCooldownActive { .. } | Self::AiRateLimited
        )
    }

    /// Whether this error means the AI produced something unusable. The
    /// gateway forces the project into `ERROR` before returning these.
    pub fn is_ai_failure(&self) -> bool {
        matches!(self, Self::AiGeneration { .. } | Self::AiValidation { .. })
    }
}
