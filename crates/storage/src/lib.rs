//! Object storage backends for published pages.

pub mod config;
pub mod error;
pub mod local;
pub mod s3;

use std::sync::Arc;

use sitegen_core::publishing::SiteStorage;

pub use config::{StorageBackend, StorageConfig};
pub use error::StorageError;
pub use local::LocalStorage;
pub use s3::S3Storage;

/// Build the configured backend.
pub async fn build_storage(config: &StorageConfig) -> Result<Arc<dyn SiteStorage>, StorageError> {
    let storage: Arc<dyn SiteStorage> = match &config.backend {
        StorageBackend::Local { root } => {
            Arc::new(LocalStorage::open(root.clone(), &config.public_base_url).await?)
        }
        StorageBackend::S3 {
            bucket,
            region,
            endpoint_url,
        } => Arc::new(
            S3Storage::connect(
                bucket,
                region,
                endpoint_url.as_deref(),
                &config.public_base_url,
            )
            .await,
        ),
    };
    tracing::info!(backend = config.backend.name(), "Site storage ready");
    Ok(storage)
}
