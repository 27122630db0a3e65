//! Published pages on local disk.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sitegen_core::error::CoreError;
use sitegen_core::publishing::SiteStorage;

use crate::config::join_url;
use crate::error::{check_object_path, StorageError};

/// Writes objects under a root directory, mirroring their keys as relative
/// paths. Content type is implied by the file extension when served.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalStorage {
    /// Create the root directory if needed.
    pub async fn open(
        root: impl Into<PathBuf>,
        public_base_url: &str,
    ) -> Result<Self, StorageError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|source| StorageError::Io {
                path: root.clone(),
                source,
            })?;
        Ok(Self {
            root,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn write(&self, path: &str, bytes: &[u8]) -> Result<(), StorageError> {
        check_object_path(path)?;
        let target = self.root.join(path);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StorageError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
        tokio::fs::write(&target, bytes)
            .await
            .map_err(|source| StorageError::Io {
                path: target.clone(),
                source,
            })
    }
}

#[async_trait]
impl SiteStorage for LocalStorage {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, CoreError> {
        self.write(path, &bytes).await?;
        tracing::debug!(path, content_type, size = bytes.len(), "Stored object on disk");
        Ok(path.to_string())
    }

    fn public_url(&self, path: &str) -> String {
        join_url(&self.public_base_url, path)
    }
}
