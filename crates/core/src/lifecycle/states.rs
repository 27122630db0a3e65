//! Project lifecycle states.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Where a project is in its draft-to-published lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectState {
    Draft,
    InputReady,
    MemoryReady,
    PlanReady,
    PlanApproved,
    SiteGenerated,
    Preview,
    Published,
    Error,
}

impl ProjectState {
    /// Every state, in forward lifecycle order with `Error` last.
    pub const ALL: [ProjectState; 9] = [
        Self::Draft,
        Self::InputReady,
        Self::MemoryReady,
        Self::PlanReady,
        Self::PlanApproved,
        Self::SiteGenerated,
        Self::Preview,
        Self::Published,
        Self::Error,
    ];

    /// Stable string form used in the database and API payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::InputReady => "input_ready",
            Self::MemoryReady => "memory_ready",
            Self::PlanReady => "plan_ready",
            Self::PlanApproved => "plan_approved",
            Self::SiteGenerated => "site_generated",
            Self::Preview => "preview",
            Self::Published => "published",
            Self::Error => "error",
        }
    }

    /// `true` for states with no outgoing transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Published)
    }

    /// `true` once a site version exists and can be viewed or edited.
    pub fn has_generated_site(self) -> bool {
        matches!(self, Self::SiteGenerated | Self::Preview | Self::Published)
    }
}

impl fmt::Display for ProjectState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectState {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown project state '{s}'")))
    }
}
