//! Template manifests and the on-disk catalog.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use sitegen_core::images::Orientation;

use crate::error::CatalogError;

pub const MANIFEST_FILE: &str = "manifest.json";
pub const HTML_FILE: &str = "template.html";
pub const CSS_FILE: &str = "style.css";

/// `{{ name_url }}` references in template markup.
static URL_SLOT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*(\w+)_url\s*\}\}").expect("valid regex"));

fn default_intent() -> String {
    "general".to_string()
}

/// What a template declares about itself in `manifest.json`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TemplateManifest {
    pub id: String,
    pub name: String,
    #[serde(default = "default_intent")]
    pub intent: String,
    pub description: String,
    #[serde(default)]
    pub optional_sections: Vec<String>,
    #[serde(default)]
    pub copy_keys: Vec<String>,
    /// List copy key -> item field names.
    #[serde(default)]
    pub list_keys: BTreeMap<String, Vec<String>>,
    /// Image slot name -> orientation (`landscape`, `portrait`, `square`).
    #[serde(default)]
    pub slots: BTreeMap<String, String>,
    /// Default image keywords for slots the plan leaves blank.
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// A loaded template: manifest plus sources.
#[derive(Debug, Clone)]
pub struct Template {
    pub manifest: TemplateManifest,
    pub html: String,
    pub css: Option<String>,
    /// Declared slots merged with `{{ x_url }}` references found in the
    /// markup. Undeclared slots are landscape.
    pub slots: BTreeMap<String, Orientation>,
}

impl Template {
    pub fn new(manifest: TemplateManifest, html: String, css: Option<String>) -> Self {
        let mut slots: BTreeMap<String, Orientation> = manifest
            .slots
            .iter()
            .map(|(name, kind)| (name.clone(), Orientation::from_slot_type(kind)))
            .collect();
        for capture in URL_SLOT_RE.captures_iter(&html) {
            slots
                .entry(capture[1].to_string())
                .or_insert(Orientation::Landscape);
        }
        Self {
            manifest,
            html,
            css,
            slots,
        }
    }

    pub fn id(&self) -> &str {
        &self.manifest.id
    }

    /// One catalog entry in the copy writer's prompt format.
    pub fn summary(&self) -> String {
        let m = &self.manifest;
        let list_keys = if m.list_keys.is_empty() {
            "none".to_string()
        } else {
            m.list_keys
                .iter()
                .map(|(name, fields)| format!("{name} (fields: {})", fields.join(", ")))
                .collect::<Vec<_>>()
                .join("; ")
        };
        format!(
            "- ID: {}\n  Name: {}\n  Intent: {}\n  Description: {}\n  Optional sections: {}\n  Required copy keys: {}\n  List keys: {}",
            m.id,
            m.name,
            m.intent,
            m.description,
            m.optional_sections.join(", "),
            m.copy_keys.join(", "),
            list_keys,
        )
    }
}

/// All templates found under one root directory, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    templates: BTreeMap<String, Template>,
}

impl TemplateCatalog {
    /// Load every `*/manifest.json` under `root`.
    ///
    /// A missing root yields an empty catalog. Directories without a
    /// manifest are skipped.
    pub fn load(root: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let root = root.as_ref();
        let mut catalog = Self::default();
        if !root.is_dir() {
            tracing::warn!(root = %root.display(), "Template directory not found");
            return Ok(catalog);
        }

        let mut dirs: Vec<PathBuf> = fs::read_dir(root)
            .map_err(|source| io_error(root, source))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.join(MANIFEST_FILE).is_file())
            .collect();
        dirs.sort();

        for dir in dirs {
            catalog.insert(load_template(&dir)?)?;
        }

        tracing::info!(
            root = %root.display(),
            count = catalog.len(),
            "Loaded template catalog"
        );
        Ok(catalog)
    }

    pub fn insert(&mut self, template: Template) -> Result<(), CatalogError> {
        let id = template.id().to_string();
        if self.templates.contains_key(&id) {
            return Err(CatalogError::DuplicateId(id));
        }
        self.templates.insert(id, template);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Template> {
        self.templates.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.values()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Every template summarized for the copy writer prompt.
    pub fn summary(&self) -> String {
        if self.templates.is_empty() {
            return "No templates available.".to_string();
        }
        self.iter()
            .map(Template::summary)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

fn io_error(path: &Path, source: std::io::Error) -> CatalogError {
    CatalogError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn read(path: &Path) -> Result<String, CatalogError> {
    fs::read_to_string(path).map_err(|source| io_error(path, source))
}

fn load_template(dir: &Path) -> Result<Template, CatalogError> {
    let manifest_path = dir.join(MANIFEST_FILE);
    let manifest: TemplateManifest =
        serde_json::from_str(&read(&manifest_path)?).map_err(|source| CatalogError::Manifest {
            path: manifest_path.clone(),
            source,
        })?;

    let html = read(&dir.join(HTML_FILE))?;
    let css_path = dir.join(CSS_FILE);
    let css = if css_path.is_file() {
        Some(read(&css_path)?)
    } else {
        None
    };

    Ok(Template::new(manifest, html, css))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const MANIFEST: &str = r#"{
        "id": "bakery-warm",
        "name": "Warm Bakery",
        "description": "Cozy single page for food shops",
        "optional_sections": ["faq", "testimonials"],
        "copy_keys": ["hero_heading", "about_text"],
        "list_keys": {"faq_list": ["question", "answer"]},
        "slots": {"hero": "landscape", "baker": "portrait"},
        "keywords": ["bread", "pastry"]
    }"#;

    fn write_template(root: &Path, dir: &str, manifest: &str, html: &str) {
        let path = root.join(dir);
        fs::create_dir_all(&path).unwrap();
        fs::write(path.join(MANIFEST_FILE), manifest).unwrap();
        fs::write(path.join(HTML_FILE), html).unwrap();
    }

    #[test]
    fn loads_templates_and_scans_extra_slots() {
        let root = tempfile::tempdir().unwrap();
        write_template(
            root.path(),
            "bakery-warm",
            MANIFEST,
            "<img src=\"{{hero_url}}\"><img src=\"{{ gallery_url }}\">",
        );
        fs::create_dir_all(root.path().join("not-a-template")).unwrap();

        let catalog = TemplateCatalog::load(root.path()).unwrap();
        assert_eq!(catalog.len(), 1);

        let template = catalog.get("bakery-warm").unwrap();
        assert_eq!(template.manifest.intent, "general");
        assert!(template.css.is_none());
        assert_eq!(template.slots.get("baker"), Some(&Orientation::Portrait));
        assert_eq!(template.slots.get("gallery"), Some(&Orientation::Landscape));
        assert_eq!(template.slots.len(), 3);
    }

    #[test]
    fn summary_format() {
        let manifest: TemplateManifest = serde_json::from_str(MANIFEST).unwrap();
        let summary = Template::new(manifest, String::new(), None).summary();
        assert_eq!(
            summary,
            "- ID: bakery-warm\n  Name: Warm Bakery\n  Intent: general\n  Description: Cozy single page for food shops\n  Optional sections: faq, testimonials\n  Required copy keys: hero_heading, about_text\n  List keys: faq_list (fields: question, answer)"
        );
    }

    #[test]
    fn empty_catalog_summary() {
        let catalog = TemplateCatalog::load("/definitely/not/here").unwrap();
        assert!(catalog.is_empty());
        assert_eq!(catalog.summary(), "No templates available.");
    }

    #[test]
    fn bad_manifest_is_reported() {
        let root = tempfile::tempdir().unwrap();
        write_template(root.path(), "broken", "{\"id\": 1}", "");
        assert_matches!(
            TemplateCatalog::load(root.path()),
            Err(CatalogError::Manifest { .. })
        );
    }

    #[test]
    fn duplicate_ids_rejected() {
        let root = tempfile::tempdir().unwrap();
        write_template(root.path(), "a", MANIFEST, "");
        write_template(root.path(), "b", MANIFEST, "");
        assert_matches!(
            TemplateCatalog::load(root.path()),
            Err(CatalogError::DuplicateId(id)) if id == "bakery-warm"
        );
    }
}
