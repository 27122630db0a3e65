use std::path::PathBuf;

/// Where published pages are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// A directory on local disk, served by the API.
    Local { root: PathBuf },
    /// An S3 (or S3-compatible) bucket.
    S3 {
        bucket: String,
        region: String,
        /// Custom endpoint for S3-compatible services.
        endpoint_url: Option<String>,
    },
}

impl StorageBackend {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Local { .. } => "local",
            Self::S3 { .. } => "s3",
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Prefix of every public URL; the object path is appended.
    pub public_base_url: String,
}

impl StorageConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                            |
    /// |---------------------------|------------------------------------|
    /// | `STORAGE_BACKEND`         | `local` (or `s3`)                  |
    /// | `STORAGE_LOCAL_DIR`       | `./published`                      |
    /// | `STORAGE_PUBLIC_BASE_URL` | `http://localhost:3000/published`  |
    /// | `S3_BUCKET`               | required when backend is `s3`      |
    /// | `S3_REGION`               | `us-east-1`                        |
    /// | `S3_ENDPOINT_URL`         | unset                              |
    pub fn from_env() -> Self {
        let backend = match std::env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "local".into())
            .as_str()
        {
            "s3" => StorageBackend::S3 {
                bucket: std::env::var("S3_BUCKET")
                    .expect("S3_BUCKET must be set when STORAGE_BACKEND=s3"),
                region: std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".into()),
                endpoint_url: std::env::var("S3_ENDPOINT_URL").ok(),
            },
            "local" => StorageBackend::Local {
                root: std::env::var("STORAGE_LOCAL_DIR")
                    .unwrap_or_else(|_| "./published".into())
                    .into(),
            },
            other => panic!("STORAGE_BACKEND must be 'local' or 's3', got '{other}'"),
        };

        let public_base_url = std::env::var("STORAGE_PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000/published".into())
            .trim_end_matches('/')
            .to_string();

        Self {
            backend,
            public_base_url,
        }
    }
}

/// Join a base URL and an object path with exactly one slash.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
