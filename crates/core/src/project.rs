//! The project aggregate and its owned value types.

use serde::{Deserialize, Serialize};

use crate::brand_memory::BrandMemory;
use crate::lifecycle::ProjectState;
use crate::plans::PlanTier;
use crate::site_plan::SitePlan;
use crate::types::{DbId, Timestamp, VersionNumber};

/// The acting user, as far as the core cares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub plan: PlanTier,
}

/// Per-project AI call counters. The unit of quota and cooldown enforcement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiUsage {
    #[serde(default)]
    pub planner_calls: u32,
    #[serde(default)]
    pub generation_calls: u32,
    #[serde(default)]
    pub last_ai_call_at: Option<Timestamp>,
}

/// A rendered HTML + CSS artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteVersion {
    pub html: String,
    pub css: String,
    pub version: VersionNumber,
    #[serde(default)]
    pub is_published: bool,
}

impl SiteVersion {
    /// The version that follows `current` (1 when there is none).
    pub fn next_number(current: Option<&SiteVersion>) -> VersionNumber {
        current.map_or(1, |v| v.version + 1)
    }
}

/// A user's website project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: DbId,
    pub user_id: DbId,
    pub state: ProjectState,
    pub brand_memory: Option<BrandMemory>,
    pub ai_usage: AiUsage,
    pub site_plan: Option<SitePlan>,
    pub site_version: Option<SiteVersion>,
    pub template_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub published_at: Option<Timestamp>,
}

impl Project {
    /// A fresh project in `Draft`.
    pub fn new(id: DbId, user_id: DbId, now: Timestamp) -> Self {
        Self {
            id,
            user_id,
            state: ProjectState::Draft,
            brand_memory: None,
            ai_usage: AiUsage::default(),
            site_plan: None,
            site_version: None,
            template_id: None,
            created_at: now,
            updated_at: now,
            published_at: None,
        }
    }

    pub fn is_owned_by(&self, user_id: DbId) -> bool {
        self.user_id == user_id
    }

    /// Display name for paused pages and logs.
    pub fn business_name(&self) -> &str {
        self.brand_memory
            .as_ref()
            .map(|m| m.business_name.as_str())
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_project_starts_in_draft() {
        let now = chrono::Utc::now();
        let project = Project::new(1, 7, now);
        assert_eq!(project.state, ProjectState::Draft);
        assert_eq!(project.ai_usage, AiUsage::default());
        assert_eq!(project.created_at, now);
        assert!(project.is_owned_by(7));
        assert!(!project.is_owned_by(8));
        assert_eq!(project.business_name(), "");
    }

    #[test]
    fn version_numbering() {
        assert_eq!(SiteVersion::next_number(None), 1);
        let v = SiteVersion {
            html: String::new(),
            css: String::new(),
            version: 3,
            is_published: false,
        };
        assert_eq!(SiteVersion::next_number(Some(&v)), 4);
    }

    #[test]
    fn usage_document_without_timestamp_reads() {
        let usage: AiUsage = serde_json::from_str(r#"{"planner_calls":2}"#).unwrap();
        assert_eq!(usage.planner_calls, 2);
        assert_eq!(usage.generation_calls, 0);
        assert!(usage.last_ai_call_at.is_none());
    }
}
