//! Plan tiers and their limit table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::limits::{AiAction, Limit};

/// A user's billing tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanTier {
    Free,
    Paid,
    Agency,
}

impl PlanTier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Paid => "paid",
            Self::Agency => "agency",
        }
    }

    /// Free-tier sites get a trial window after publishing and are paused
    /// when it ends. Paid and agency sites stay live.
    pub fn has_publish_trial(self) -> bool {
        matches!(self, Self::Free)
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanTier {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "paid" => Ok(Self::Paid),
            "agency" => Ok(Self::Agency),
            other => Err(CoreError::Validation(format!(
                "Unknown plan '{other}'. Must be one of: free, paid, agency"
            ))),
        }
    }
}

/// Limits applied to one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanLimits {
    /// Planner calls allowed per project.
    pub planner_calls: Limit,
    /// Site generation calls allowed per project.
    pub generation_calls: Limit,
    /// Projects a user on this tier may own.
    pub max_projects: Limit,
    /// Trusted tiers bypass cooldown and rate limiting. Quota still applies.
    pub skip_throttles: bool,
}

impl PlanLimits {
    /// The quota for `action`.
    pub fn for_action(&self, action: AiAction) -> Limit {
        match action {
            AiAction::Planner => self.planner_calls,
            AiAction::Generation => self.generation_calls,
        }
    }
}

/// Limits for every tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanLimitTable {
    pub free: PlanLimits,
    pub paid: PlanLimits,
    pub agency: PlanLimits,
}

impl PlanLimitTable {
    pub fn for_tier(&self, tier: PlanTier) -> &PlanLimits {
        match tier {
            PlanTier::Free => &self.free,
            PlanTier::Paid => &self.paid,
            PlanTier::Agency => &self.agency,
        }
    }
}

impl Default for PlanLimitTable {
    fn default() -> Self {
        Self {
            free: PlanLimits {
                planner_calls: Limit::Bounded(1),
                generation_calls: Limit::Bounded(1),
                max_projects: Limit::Bounded(1),
                skip_throttles: false,
            },
            paid: PlanLimits {
                planner_calls: Limit::Bounded(5),
                generation_calls: Limit::Bounded(5),
                max_projects: Limit::Bounded(10),
                skip_throttles: false,
            },
            agency: PlanLimits {
                planner_calls: Limit::Unbounded,
                generation_calls: Limit::Unbounded,
                max_projects: Limit::Unbounded,
                skip_throttles: true,
            },
        }
    }
}

/// Fail with [`CoreError::ProjectLimitReached`] when a user on `tier`
/// already owns as many projects as the tier allows.
pub fn ensure_can_create_project(
    table: &PlanLimitTable,
    tier: PlanTier,
    existing_projects: i64,
) -> Result<(), CoreError> {
    let used = u32::try_from(existing_projects.max(0)).unwrap_or(u32::MAX);
    if table.for_tier(tier).max_projects.allows(used) {
        Ok(())
    } else {
        Err(CoreError::ProjectLimitReached { plan: tier })
    }
}
