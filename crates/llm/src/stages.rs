//! Generation stages backed by a chat completion endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use sitegen_core::brand_memory::BrandMemory;
use sitegen_core::generation::{CopyWriter, SiteGenerator, SitePlanner, StageFailure};
use sitegen_core::site_plan::SitePlan;

use crate::api::{ChatBackend, LlmApiError};
use crate::config::LlmConfig;
use crate::parse::{parse_copy_plan, parse_plan, strip_markdown_fences};
use crate::prompts;

/// Token ceiling for stylesheet and copy writer responses.
const LONG_RESPONSE_MAX_TOKENS: u32 = 4000;

fn request_failure(err: LlmApiError) -> StageFailure {
    match err {
        LlmApiError::EmptyResponse => StageFailure::MalformedResponse(err.to_string()),
        other => StageFailure::Request(other.to_string()),
    }
}

/// Plans sections from brand memory.
pub struct LlmPlanner {
    backend: Arc<dyn ChatBackend>,
    model: String,
}

impl LlmPlanner {
    pub fn new(backend: Arc<dyn ChatBackend>, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
        }
    }

    pub fn from_config(backend: Arc<dyn ChatBackend>, config: &LlmConfig) -> Self {
        Self::new(backend, config.model.clone())
    }
}

#[async_trait]
impl SitePlanner for LlmPlanner {
    async fn plan(&self, memory: &BrandMemory) -> Result<SitePlan, StageFailure> {
        let prompt = prompts::planner_prompt(memory);
        let raw = self
            .backend
            .complete(&self.model, &prompt, None)
            .await
            .map_err(request_failure)?;
        parse_plan(&raw)
    }
}

/// Writes page markup and its stylesheet.
pub struct LlmSiteGenerator {
    backend: Arc<dyn ChatBackend>,
    model: String,
}

impl LlmSiteGenerator {
    pub fn new(backend: Arc<dyn ChatBackend>, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
        }
    }

    pub fn from_config(backend: Arc<dyn ChatBackend>, config: &LlmConfig) -> Self {
        Self::new(backend, config.code_model.clone())
    }
}

#[async_trait]
impl SiteGenerator for LlmSiteGenerator {
    async fn generate_html(
        &self,
        plan: &SitePlan,
        memory: &BrandMemory,
    ) -> Result<String, StageFailure> {
        let prompt = prompts::html_prompt(plan, memory);
        let raw = self
            .backend
            .complete(&self.model, &prompt, None)
            .await
            .map_err(request_failure)?;
        Ok(strip_markdown_fences(&raw).to_string())
    }

    async fn generate_css(&self, html: &str, memory: &BrandMemory) -> Result<String, StageFailure> {
        let prompt = prompts::css_prompt(html, memory);
        let raw = self
            .backend
            .complete(&self.model, &prompt, Some(LONG_RESPONSE_MAX_TOKENS))
            .await
            .map_err(request_failure)?;
        Ok(strip_markdown_fences(&raw).to_string())
    }
}

/// Picks a template and writes its copy.
pub struct LlmCopyWriter {
    backend: Arc<dyn ChatBackend>,
    model: String,
}

impl LlmCopyWriter {
    pub fn new(backend: Arc<dyn ChatBackend>, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
        }
    }

    pub fn from_config(backend: Arc<dyn ChatBackend>, config: &LlmConfig) -> Self {
        Self::new(backend, config.copy_model.clone())
    }
}

#[async_trait]
impl CopyWriter for LlmCopyWriter {
    async fn write_copy(
        &self,
        memory: &BrandMemory,
        catalog_summary: &str,
    ) -> Result<SitePlan, StageFailure> {
        let prompt = prompts::copy_writer_prompt(memory, catalog_summary);
        let raw = self
            .backend
            .complete(&self.model, &prompt, Some(LONG_RESPONSE_MAX_TOKENS))
            .await
            .map_err(request_failure)?;
        parse_copy_plan(&raw, memory)
    }
}
