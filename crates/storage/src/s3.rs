//! Published pages in an S3 bucket.

use async_trait::async_trait;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use sitegen_core::error::CoreError;
use sitegen_core::publishing::SiteStorage;

use crate::config::join_url;
use crate::error::{check_object_path, StorageError};

/// Uploads objects with `PutObject`. Public URLs assume the bucket (or a
/// CDN in front of it) is readable at `public_base_url`.
#[derive(Debug, Clone)]
pub struct S3Storage {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_base_url: String,
}

impl S3Storage {
    /// Build a client from the default AWS credential chain.
    pub async fn connect(
        bucket: &str,
        region: &str,
        endpoint_url: Option<&str>,
        public_base_url: &str,
    ) -> Self {
        let shared = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self::with_client(
            aws_sdk_s3::Client::from_conf(builder.build()),
            bucket,
            public_base_url,
        )
    }

    pub fn with_client(client: aws_sdk_s3::Client, bucket: &str, public_base_url: &str) -> Self {
        Self {
            client,
            bucket: bucket.to_string(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), StorageError> {
        check_object_path(key)?;
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::S3(DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl SiteStorage for S3Storage {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, CoreError> {
        let size = bytes.len();
        self.put(path, bytes, content_type).await?;
        tracing::debug!(bucket = %self.bucket, key = path, size, "Uploaded object to S3");
        Ok(path.to_string())
    }

    fn public_url(&self, path: &str) -> String {
        join_url(&self.public_base_url, path)
    }
}
