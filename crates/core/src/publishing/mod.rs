//! Publishing a previewed site and serving it afterwards.

pub mod pause;
pub mod pipeline;
pub mod renderer;
pub mod trial;
pub mod urls;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

pub use pipeline::{PublicSite, PublishOutcome, PublishPipeline};
pub use renderer::render_final_page;

use crate::error::CoreError;

/// Durable object storage for published pages.
#[async_trait]
pub trait SiteStorage: Send + Sync {
    /// Store `bytes` at `path`, replacing any existing object. Returns the
    /// path actually written.
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, CoreError>;

    /// Public address of an uploaded object.
    fn public_url(&self, path: &str) -> String;
}

/// [`SiteStorage`] kept in memory, for tests.
pub struct InMemorySiteStorage {
    base_url: String,
    objects: Mutex<HashMap<String, Vec<u8>>>,
    failing: AtomicBool,
}

impl InMemorySiteStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            objects: Mutex::new(HashMap::new()),
            failing: AtomicBool::new(false),
        }
    }

    /// Make every following upload fail.
    pub fn fail_uploads(&self, fail: bool) {
        self.failing.store(fail, Ordering::SeqCst);
    }

    pub fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(path)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SiteStorage for InMemorySiteStorage {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, CoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CoreError::Storage(format!("upload of {path} rejected")));
        }
        self.objects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path.to_string(), bytes);
        Ok(path.to_string())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}
