//! Row and column models for the `projects` table.

use serde_json::Value;
use sqlx::FromRow;
use sitegen_core::error::CoreError;
use sitegen_core::project::Project;
use sitegen_core::store::ProjectRecord;
use sitegen_core::types::{DbId, Timestamp};

use crate::envelope::{decode, decode_opt, encode, encode_opt, EnvelopeError};

/// A row from the `projects` table, document columns still encoded.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    pub id: DbId,
    pub user_id: DbId,
    pub state: String,
    pub brand_memory: Option<Value>,
    pub ai_usage: Value,
    pub site_plan: Option<Value>,
    pub site_version: Option<Value>,
    pub template_id: Option<String>,
    pub trial_ends_at: Option<Timestamp>,
    pub is_paused: bool,
    pub published_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

fn corrupt(id: DbId, column: &str, err: EnvelopeError) -> CoreError {
    CoreError::Internal(format!("Project {id} has an unreadable {column} column: {err}"))
}

impl TryFrom<ProjectRow> for ProjectRecord {
    type Error = CoreError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let project = Project {
            id,
            user_id: row.user_id,
            state: row.state.parse()?,
            brand_memory: decode_opt(row.brand_memory).map_err(|e| corrupt(id, "brand_memory", e))?,
            ai_usage: decode(row.ai_usage).map_err(|e| corrupt(id, "ai_usage", e))?,
            site_plan: decode_opt(row.site_plan).map_err(|e| corrupt(id, "site_plan", e))?,
            site_version: decode_opt(row.site_version)
                .map_err(|e| corrupt(id, "site_version", e))?,
            template_id: row.template_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            published_at: row.published_at,
        };
        Ok(ProjectRecord {
            project,
            trial_ends_at: row.trial_ends_at,
            is_paused: row.is_paused,
        })
    }
}

/// The mutable columns of a project, encoded for writing.
#[derive(Debug, Clone)]
pub struct ProjectColumns {
    pub state: &'static str,
    pub brand_memory: Option<Value>,
    pub ai_usage: Value,
    pub site_plan: Option<Value>,
    pub site_version: Option<Value>,
    pub template_id: Option<String>,
    pub published_at: Option<Timestamp>,
    pub updated_at: Timestamp,
}

impl TryFrom<&Project> for ProjectColumns {
    type Error = CoreError;

    fn try_from(project: &Project) -> Result<Self, Self::Error> {
        let encode_err = |e: EnvelopeError| {
            CoreError::Internal(format!("Failed to encode project {}: {e}", project.id))
        };
        Ok(Self {
            state: project.state.as_str(),
            brand_memory: encode_opt(project.brand_memory.as_ref()).map_err(encode_err)?,
            ai_usage: encode(&project.ai_usage).map_err(encode_err)?,
            site_plan: encode_opt(project.site_plan.as_ref()).map_err(encode_err)?,
            site_version: encode_opt(project.site_version.as_ref()).map_err(encode_err)?,
            template_id: project.template_id.clone(),
            published_at: project.published_at,
            updated_at: project.updated_at,
        })
    }
}
