use sqlx::FromRow;
use sitegen_core::store::PublishedSite;
use sitegen_core::types::{DbId, Timestamp, VersionNumber};

/// A row from the `published_sites` table.
#[derive(Debug, Clone, FromRow)]
pub struct PublishedSiteRow {
    pub id: DbId,
    pub project_id: DbId,
    pub version: VersionNumber,
    pub storage_path: String,
    pub public_url: String,
    pub html_hash: String,
    pub css_hash: String,
    pub published_at: Timestamp,
    pub created_at: Timestamp,
}

impl From<PublishedSiteRow> for PublishedSite {
    fn from(row: PublishedSiteRow) -> Self {
        Self {
            id: row.id,
            project_id: row.project_id,
            version: row.version,
            storage_path: row.storage_path,
            public_url: row.public_url,
            html_hash: row.html_hash,
            css_hash: row.css_hash,
            published_at: row.published_at,
        }
    }
}
