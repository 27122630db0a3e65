//! File-based page templates: a catalog loaded from disk and a Handlebars
//! renderer that fills them from a copy-writer plan.
//!
//! Each template lives in its own directory holding `manifest.json`,
//! `template.html`, and optionally `style.css`.

pub mod catalog;
pub mod error;
pub mod renderer;

pub use catalog::{Template, TemplateCatalog, TemplateManifest};
pub use error::CatalogError;
pub use renderer::HandlebarsRenderer;
