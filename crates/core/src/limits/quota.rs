//! Per-project AI call quota.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::plans::{PlanLimits, PlanTier};
use crate::project::AiUsage;

/// The kind of AI call being metered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiAction {
    /// Producing a site plan.
    Planner,
    /// Producing a site (HTML + CSS, or copy + template render).
    Generation,
}

impl AiAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Planner => "planner",
            Self::Generation => "generation",
        }
    }
}

impl fmt::Display for AiAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A quota value. Top tiers are unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Bounded(u32),
    Unbounded,
}

impl Limit {
    /// Whether one more use is allowed after `used` uses.
    pub fn allows(self, used: u32) -> bool {
        match self {
            Self::Bounded(max) => used < max,
            Self::Unbounded => true,
        }
    }
}

/// Calls already made for `action`.
pub fn calls_for(usage: &AiUsage, action: AiAction) -> u32 {
    match action {
        AiAction::Planner => usage.planner_calls,
        AiAction::Generation => usage.generation_calls,
    }
}

/// Fail with [`CoreError::AiLimitExceeded`] once the project has used its
/// quota for `action`.
pub fn check_quota(
    usage: &AiUsage,
    action: AiAction,
    plan: PlanTier,
    limits: &PlanLimits,
) -> Result<(), CoreError> {
    if limits.for_action(action).allows(calls_for(usage, action)) {
        Ok(())
    } else {
        Err(CoreError::AiLimitExceeded { action, plan })
    }
}

/// Count one successful call for `action`.
pub fn increment_usage(usage: &mut AiUsage, action: AiAction) {
    let counter = match action {
        AiAction::Planner => &mut usage.planner_calls,
        AiAction::Generation => &mut usage.generation_calls,
    };
    *counter = counter.saturating_add(1);
}
