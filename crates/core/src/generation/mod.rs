//! AI and template generation: the collaborator traits and the gateway that
//! sequences them.

pub mod gateway;

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;

use crate::brand_memory::BrandMemory;
use crate::site_plan::SitePlan;

pub use gateway::{Collaborators, GenerationGateway, ImageSlotEdit};

/// The step of a generation sequence that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStage {
    Planner,
    HtmlGenerator,
    CssGenerator,
    CopyWriter,
    TemplateRenderer,
}

impl GenerationStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Planner => "planner",
            Self::HtmlGenerator => "html_generator",
            Self::CssGenerator => "css_generator",
            Self::CopyWriter => "copy_writer",
            Self::TemplateRenderer => "template_renderer",
        }
    }
}

impl fmt::Display for GenerationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a collaborator could not produce its output.
#[derive(Debug, thiserror::Error)]
pub enum StageFailure {
    /// Transport failure, timeout, or a non-success response.
    #[error("Request failed: {0}")]
    Request(String),

    /// The response could not be parsed.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The response parsed but is missing required fields.
    #[error("Response does not match schema: {0}")]
    Schema(String),

    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Render failed: {0}")]
    Render(String),
}

/// A rendered page, HTML and stylesheet kept apart until publishing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSite {
    pub html: String,
    pub css: String,
}

/// Produces a section plan from brand memory.
#[async_trait]
pub trait SitePlanner: Send + Sync {
    async fn plan(&self, memory: &BrandMemory) -> Result<SitePlan, StageFailure>;
}

/// Produces free-form HTML and then CSS for a plan. The two calls are
/// separate so a failure names the right stage.
#[async_trait]
pub trait SiteGenerator: Send + Sync {
    async fn generate_html(
        &self,
        plan: &SitePlan,
        memory: &BrandMemory,
    ) -> Result<String, StageFailure>;

    async fn generate_css(&self, html: &str, memory: &BrandMemory) -> Result<String, StageFailure>;
}

/// Picks a template and writes its copy in a single model call.
#[async_trait]
pub trait CopyWriter: Send + Sync {
    async fn write_copy(
        &self,
        memory: &BrandMemory,
        catalog_summary: &str,
    ) -> Result<SitePlan, StageFailure>;
}

/// Renders a template-bound plan. Pure, no network.
pub trait TemplateRenderer: Send + Sync {
    /// Human-readable description of the available templates, fed to the
    /// copy writer.
    fn catalog_summary(&self) -> String;

    /// Fails with [`StageFailure::TemplateNotFound`] for unknown ids.
    fn render(
        &self,
        template_id: &str,
        plan: &SitePlan,
        memory: &BrandMemory,
    ) -> Result<RenderedSite, StageFailure>;
}
