//! Deterministic page rendering: no model calls.

use std::sync::Arc;

use handlebars::Handlebars;
use serde_json::{Map, Value};
use sitegen_core::brand_memory::BrandMemory;
use sitegen_core::generation::{RenderedSite, StageFailure, TemplateRenderer};
use sitegen_core::images::{resolve_slot_url, ImageSource};
use sitegen_core::site_plan::{SitePlan, LIST_COPY_KEYS};

use crate::catalog::{Template, TemplateCatalog};
use crate::error::CatalogError;

fn html_name(id: &str) -> String {
    format!("{id}/html")
}

fn css_name(id: &str) -> String {
    format!("{id}/css")
}

/// Renders catalog templates with Handlebars.
///
/// Markup is HTML-escaped. Stylesheets are not, so color values and other
/// brand fields pass through untouched.
pub struct HandlebarsRenderer {
    catalog: Arc<TemplateCatalog>,
    markup: Handlebars<'static>,
    styles: Handlebars<'static>,
    images: Arc<dyn ImageSource>,
}

impl std::fmt::Debug for HandlebarsRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlebarsRenderer")
            .field("templates", &self.catalog.len())
            .finish_non_exhaustive()
    }
}

impl HandlebarsRenderer {
    /// Compile every template in `catalog` up front.
    pub fn new(
        catalog: Arc<TemplateCatalog>,
        images: Arc<dyn ImageSource>,
    ) -> Result<Self, CatalogError> {
        let mut markup = Handlebars::new();
        let mut styles = Handlebars::new();
        styles.register_escape_fn(handlebars::no_escape);

        for template in catalog.iter() {
            let id = template.id();
            let compile = |source| CatalogError::Compile {
                id: id.to_string(),
                source: Box::new(source),
            };
            markup
                .register_template_string(&html_name(id), &template.html)
                .map_err(compile)?;
            if let Some(css) = &template.css {
                styles
                    .register_template_string(&css_name(id), css)
                    .map_err(compile)?;
            }
        }

        Ok(Self {
            catalog,
            markup,
            styles,
            images,
        })
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    fn context(&self, template: &Template, plan: &SitePlan, memory: &BrandMemory) -> Value {
        let mut copy = Map::new();
        for block in &plan.copy_blocks {
            let value = if LIST_COPY_KEYS.contains(&block.key.as_str()) {
                match serde_json::from_str::<Value>(&block.content) {
                    Ok(list @ Value::Array(_)) => list,
                    _ => Value::Array(Vec::new()),
                }
            } else {
                Value::String(block.content.clone())
            };
            copy.insert(block.key.clone(), value);
        }

        let mut context = copy.clone();
        context.insert("copy".into(), Value::Object(copy));

        for section in &plan.active_sections {
            context.insert(format!("section_{section}"), Value::Bool(true));
        }

        for (key, value) in [
            ("business_name", &memory.business_name),
            ("tagline", &memory.tagline),
            ("contact_email", &memory.contact_email),
            ("contact_phone", &memory.contact_phone),
            ("address", &memory.address),
            ("primary_color", &memory.primary_color),
            ("secondary_color", &memory.secondary_color),
            ("page_title", &plan.page_title),
            ("meta_description", &plan.meta_description),
        ] {
            context.insert(key.into(), Value::String(value.clone()));
        }

        for (slot, orientation) in &template.slots {
            let url = resolve_slot_url(
                plan,
                slot,
                *orientation,
                &template.manifest.keywords,
                self.images.as_ref(),
            );
            context.insert(format!("{slot}_url"), Value::String(url));
        }

        Value::Object(context)
    }
}

impl TemplateRenderer for HandlebarsRenderer {
    fn catalog_summary(&self) -> String {
        self.catalog.summary()
    }

    fn render(
        &self,
        template_id: &str,
        plan: &SitePlan,
        memory: &BrandMemory,
    ) -> Result<RenderedSite, StageFailure> {
        let template = self
            .catalog
            .get(template_id)
            .ok_or_else(|| StageFailure::TemplateNotFound(template_id.to_string()))?;

        let context = self.context(template, plan, memory);
        let render_failure = |e: handlebars::RenderError| StageFailure::Render(e.to_string());

        let html = self
            .markup
            .render(&html_name(template_id), &context)
            .map_err(render_failure)?;
        let css = if template.css.is_some() {
            self.styles
                .render(&css_name(template_id), &context)
                .map_err(render_failure)?
        } else {
            String::new()
        };

        tracing::debug!(template_id, html_len = html.len(), css_len = css.len(), "Rendered template");
        Ok(RenderedSite { html, css })
    }
}
