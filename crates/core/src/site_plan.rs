//! Structured output of the planning / copy-writing stage.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Copy-block keys whose content is a JSON array rather than plain text.
pub const LIST_COPY_KEYS: &[&str] = &[
    "features_list",
    "services_list",
    "testimonials_list",
    "faq_list",
];

/// One planned page section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionPlan {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub purpose: String,
    #[serde(default)]
    pub content_notes: String,
}

impl SectionPlan {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            purpose: String::new(),
            content_notes: String::new(),
        }
    }
}

/// A piece of written copy bound to a template placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CopyBlock {
    pub key: String,
    pub content: String,
}

/// The page plan.
///
/// The plan-then-approve flow only fills `sections` and the page metadata.
/// The template flow also fills the copy blocks, active sections, selected
/// template, and image keyword map. `image_overrides` holds URLs of images
/// the user uploaded for a slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SitePlan {
    pub sections: Vec<SectionPlan>,
    pub page_title: String,
    #[serde(default)]
    pub meta_description: String,
    #[serde(default)]
    pub copy_blocks: Vec<CopyBlock>,
    #[serde(default)]
    pub active_sections: Vec<String>,
    #[serde(default)]
    pub selected_template: Option<String>,
    #[serde(default)]
    pub image_keywords: BTreeMap<String, String>,
    #[serde(default)]
    pub image_overrides: BTreeMap<String, String>,
}

impl SitePlan {
    pub fn new(page_title: impl Into<String>, sections: Vec<SectionPlan>) -> Self {
        Self {
            sections,
            page_title: page_title.into(),
            meta_description: String::new(),
            copy_blocks: Vec::new(),
            active_sections: Vec::new(),
            selected_template: None,
            image_keywords: BTreeMap::new(),
            image_overrides: BTreeMap::new(),
        }
    }

    /// Every broken invariant: at least one section, a non-empty page
    /// title, unique section ids.
    pub fn issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.sections.is_empty() {
            issues.push("Site plan must have at least one section".to_string());
        }

        if self.page_title.trim().is_empty() {
            issues.push("Site plan must have a page title".to_string());
        }

        let mut seen = HashSet::new();
        let duplicates: Vec<&str> = self
            .sections
            .iter()
            .filter(|s| !seen.insert(s.id.as_str()))
            .map(|s| s.id.as_str())
            .collect();
        if !duplicates.is_empty() {
            issues.push(format!(
                "Section IDs must be unique (duplicated: {})",
                duplicates.join(", ")
            ));
        }

        issues
    }

    /// Fail with [`CoreError::AiValidation`] listing every broken invariant.
    pub fn validate(&self) -> Result<(), CoreError> {
        let issues = self.issues();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(CoreError::AiValidation { issues })
        }
    }

    /// The template this plan is bound to, if the copy writer picked one.
    pub fn template_id(&self) -> Option<&str> {
        self.selected_template
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Content of the copy block with `key`.
    pub fn copy(&self, key: &str) -> Option<&str> {
        self.copy_blocks
            .iter()
            .find(|b| b.key == key)
            .map(|b| b.content.as_str())
    }

    /// Insert or replace a copy block.
    pub fn set_copy(&mut self, key: impl Into<String>, content: impl Into<String>) {
        let key = key.into();
        let content = content.into();
        match self.copy_blocks.iter_mut().find(|b| b.key == key) {
            Some(block) => block.content = content,
            None => self.copy_blocks.push(CopyBlock { key, content }),
        }
    }

    /// Whether the template section `name` is switched on.
    pub fn is_section_active(&self, name: &str) -> bool {
        self.active_sections.iter().any(|s| s == name)
    }
}

/// Turn `snake_case` ids into a display title (`"our_story"` -> `"Our Story"`).
pub fn title_from_id(id: &str) -> String {
    id.split(['_', '-'])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
