//! Turn raw model output into core types.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;
use sitegen_core::brand_memory::BrandMemory;
use sitegen_core::generation::StageFailure;
use sitegen_core::site_plan::{title_from_id, CopyBlock, SectionPlan, SitePlan, LIST_COPY_KEYS};

/// Remove a surrounding markdown code fence (with optional language tag).
pub fn strip_markdown_fences(text: &str) -> &str {
    let mut text = text.trim();
    if text.starts_with("```") {
        text = match text.find('\n') {
            Some(newline) => &text[newline + 1..],
            None => "",
        };
    }
    if let Some(inner) = text.strip_suffix("```") {
        text = inner;
    }
    text.trim()
}

/// Parse JSON, classifying syntax errors as malformed and type or missing
/// field errors as schema violations.
fn parse_json<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T, StageFailure> {
    serde_json::from_str(strip_markdown_fences(raw)).map_err(classify)
}

fn classify(err: serde_json::Error) -> StageFailure {
    match err.classify() {
        serde_json::error::Category::Data => StageFailure::Schema(err.to_string()),
        _ => StageFailure::MalformedResponse(err.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Planner
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct PlannerResponse {
    page_title: String,
    meta_description: String,
    sections: Vec<SectionPlan>,
}

/// Parse planner output. Page title, meta description, and each section's
/// id and title are required.
pub fn parse_plan(raw: &str) -> Result<SitePlan, StageFailure> {
    let response: PlannerResponse = parse_json(raw)?;
    let mut plan = SitePlan::new(response.page_title, response.sections);
    plan.meta_description = response.meta_description;
    Ok(plan)
}

// ---------------------------------------------------------------------------
// Copy writer
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CopyResponse {
    #[serde(default)]
    selected_template: Option<String>,
    #[serde(default)]
    page_title: Option<String>,
    #[serde(default)]
    meta_description: String,
    #[serde(default)]
    active_sections: Vec<String>,
    #[serde(default)]
    copy_blocks: Vec<CopyBlock>,
    #[serde(default)]
    image_keywords: BTreeMap<String, String>,
}

/// Parse copy writer output into a template-bound plan.
///
/// Sections are derived from `active_sections`. Non-empty list fields
/// (`features_list`, ...) are stored as JSON-encoded copy blocks so the
/// renderer can expand them. A missing page title falls back to the
/// business name.
pub fn parse_copy_plan(raw: &str, memory: &BrandMemory) -> Result<SitePlan, StageFailure> {
    let value: Value = parse_json(raw)?;
    let response = CopyResponse::deserialize(&value).map_err(classify)?;

    let sections = response
        .active_sections
        .iter()
        .map(|id| SectionPlan::new(id.as_str(), title_from_id(id)))
        .collect();

    let page_title = response
        .page_title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| memory.business_name.clone());

    let mut plan = SitePlan::new(page_title, sections);
    plan.meta_description = response.meta_description;
    plan.copy_blocks = response.copy_blocks;
    plan.active_sections = response.active_sections;
    plan.selected_template = response.selected_template;
    plan.image_keywords = response.image_keywords;

    for key in LIST_COPY_KEYS {
        match value.get(*key) {
            Some(Value::Array(items)) if !items.is_empty() => {
                plan.set_copy(*key, Value::Array(items.clone()).to_string());
            }
            _ => {}
        }
    }

    Ok(plan)
}
