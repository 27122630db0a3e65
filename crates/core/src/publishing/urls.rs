use crate::types::{DbId, VersionNumber};

/// Object key of a published page.
pub fn storage_path(project_id: DbId, version: VersionNumber) -> String {
    format!("{project_id}/v{version}/index.html")
}
