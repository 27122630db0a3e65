//! Prompt text for each generation stage.
//!
//! Blank optional brand facts render as `N/A` so the model never sees an
//! empty field label.

use sitegen_core::brand_memory::BrandMemory;
use sitegen_core::site_plan::SitePlan;

fn or_na(value: &str) -> &str {
    if value.trim().is_empty() {
        "N/A"
    } else {
        value
    }
}

fn services(memory: &BrandMemory) -> String {
    if memory.services.is_empty() {
        "N/A".to_string()
    } else {
        memory.services.join(", ")
    }
}

fn brand_facts(memory: &BrandMemory) -> String {
    format!(
        "Business name: {}\n\
         Tagline: {}\n\
         Website type: {}\n\
         Primary goal: {}\n\
         Description: {}\n\
         Services: {}",
        memory.business_name,
        or_na(&memory.tagline),
        memory.website_type,
        memory.primary_goal,
        or_na(&memory.description),
        services(memory),
    )
}

/// Ask for a JSON site plan: sections, page title, meta description.
pub fn planner_prompt(memory: &BrandMemory) -> String {
    format!(
        "You are planning a single-page marketing website.\n\n\
         {facts}\n\n\
         Respond with JSON only, no prose, in exactly this shape:\n\
         {{\n  \"page_title\": string,\n  \"meta_description\": string,\n  \
         \"sections\": [{{\"id\": snake_case string, \"title\": string, \
         \"purpose\": string, \"content_notes\": string}}]\n}}\n\n\
         Use 4 to 7 sections. The first section must be a hero. Section ids must be unique.",
        facts = brand_facts(memory),
    )
}

/// Ask for the page markup following an approved plan.
pub fn html_prompt(plan: &SitePlan, memory: &BrandMemory) -> String {
    let sections = plan
        .sections
        .iter()
        .map(|s| {
            format!(
                "- id=\"{}\" title=\"{}\" purpose: {} notes: {}",
                s.id,
                s.title,
                or_na(&s.purpose),
                or_na(&s.content_notes)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Write the complete HTML for a single-page website.\n\n\
         {facts}\n\
         Contact email: {email}\n\
         Contact phone: {phone}\n\
         Address: {address}\n\n\
         Page title: {title}\n\
         Meta description: {meta}\n\
         Sections, in order:\n{sections}\n\n\
         Rules:\n\
         - Start with <!DOCTYPE html>.\n\
         - Include a <nav> with a button id=\"menu-btn\" and a list id=\"nav-links\" linking to each section.\n\
         - Include a <footer>.\n\
         - No <script> tags, no inline event handlers, no <style> blocks, no inline styles.\n\
         - Give every section its id as the element id.\n\
         Respond with the HTML only.",
        facts = brand_facts(memory),
        email = or_na(&memory.contact_email),
        phone = or_na(&memory.contact_phone),
        address = or_na(&memory.address),
        title = plan.page_title,
        meta = or_na(&plan.meta_description),
    )
}

/// Ask for a stylesheet for already-generated markup.
pub fn css_prompt(html: &str, memory: &BrandMemory) -> String {
    format!(
        "Write the CSS for the following HTML page.\n\n\
         Theme: {theme}\n\
         Primary color: {primary}\n\
         Secondary color: {secondary}\n\n\
         Rules:\n\
         - Mobile first. Hide #nav-links below 768px unless it has the class \"open\".\n\
         - No @import rules and no external URLs.\n\
         Respond with the CSS only.\n\n\
         HTML:\n{html}",
        theme = or_na(&memory.theme),
        primary = memory.primary_color,
        secondary = memory.secondary_color,
    )
}

/// Ask the copy writer to pick a template and fill its placeholders.
pub fn copy_writer_prompt(memory: &BrandMemory, catalog_summary: &str) -> String {
    let assets = if memory.labeled_assets.is_empty() {
        "None".to_string()
    } else {
        memory
            .labeled_assets
            .iter()
            .map(|a| format!("- {} ({}, {}x{})", a.label, a.orientation, a.width, a.height))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "You write copy for a single-page website built from a template.\n\n\
         {facts}\n\
         Theme: {theme}\n\
         Contact email: {email}\n\
         Contact phone: {phone}\n\
         Address: {address}\n\
         Uploaded images:\n{assets}\n\n\
         Available templates:\n{catalog}\n\n\
         Pick the one template that best fits the business. Write every required copy key \
         of that template and turn on only the optional sections the business needs.\n\n\
         Respond with JSON only, in this shape:\n\
         {{\n  \"selected_template\": template id,\n  \"page_title\": string,\n  \
         \"meta_description\": string,\n  \"active_sections\": [section name],\n  \
         \"copy_blocks\": [{{\"key\": string, \"content\": string}}],\n  \
         \"image_keywords\": {{slot name: one or two search words}},\n  \
         \"features_list\": [{{\"title\": string, \"description\": string}}],\n  \
         \"services_list\": [{{\"title\": string, \"description\": string}}],\n  \
         \"testimonials_list\": [{{\"quote\": string, \"author\": string}}],\n  \
         \"faq_list\": [{{\"question\": string, \"answer\": string}}]\n}}\n\
         Omit any list the template does not use.",
        facts = brand_facts(memory),
        theme = or_na(&memory.theme),
        email = or_na(&memory.contact_email),
        phone = or_na(&memory.contact_phone),
        address = or_na(&memory.address),
        catalog = catalog_summary,
    )
}
