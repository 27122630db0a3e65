//! Business facts collected from the user and fed to every generation stage.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;
use crate::images::Orientation;

/// Default visual theme.
pub const DEFAULT_THEME: &str = "professional";

/// Default primary brand color.
pub const DEFAULT_PRIMARY_COLOR: &str = "#2563eb";

/// Default secondary brand color.
pub const DEFAULT_SECONDARY_COLOR: &str = "#1e40af";

/// Maximum number of services kept from user input.
pub const MAX_SERVICES: usize = 20;

/// Maximum number of uploaded images per project.
pub const MAX_LABELED_ASSETS: usize = 4;

/// Structured facts about a business.
///
/// Only the first three fields are required. Everything else was added over
/// time and is default-filled when an older stored document is read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandMemory {
    pub business_name: String,
    pub website_type: String,
    pub primary_goal: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_primary_color")]
    pub primary_color: String,
    #[serde(default = "default_secondary_color")]
    pub secondary_color: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default)]
    pub contact_phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub tagline: String,
    /// Accepts a list or a comma-separated string.
    #[serde(default, deserialize_with = "deserialize_services")]
    pub services: Vec<String>,
    #[serde(default)]
    pub labeled_assets: Vec<LabeledAsset>,
}

/// A user-uploaded image with a label the copy writer can reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledAsset {
    /// Left blank by uploads that were not labeled; filled by
    /// [`BrandMemory::normalize_assets`].
    #[serde(default)]
    pub label: String,
    pub url: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub orientation: Orientation,
}

impl LabeledAsset {
    pub fn new(url: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            label: String::new(),
            url: url.into(),
            width,
            height,
            orientation: Orientation::from_dimensions(width, height),
        }
    }

    /// `https://` or site-relative.
    fn has_allowed_url(&self) -> bool {
        let url = self.url.trim();
        url.starts_with("https://") || (url.starts_with('/') && !url.starts_with("//"))
    }
}

/// Label for an unlabeled upload, from its shape and upload position.
///
/// Very wide images and large landscape images read as hero shots, tall ones
/// as portraits. The first upload is the hero unless its shape says
/// otherwise, later ones are product shots.
pub fn auto_label(width: u32, height: u32, index: usize) -> &'static str {
    let ratio = if height == 0 {
        1.0
    } else {
        f64::from(width) / f64::from(height)
    };
    if ratio >= 1.8 {
        "hero"
    } else if ratio <= 0.65 {
        "portrait"
    } else if width >= 1200 && ratio >= 1.2 {
        "hero"
    } else if index == 0 {
        "hero"
    } else {
        "product"
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ServicesInput {
    List(Vec<String>),
    Csv(String),
}

fn deserialize_services<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match ServicesInput::deserialize(deserializer)? {
        ServicesInput::List(list) => list
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        ServicesInput::Csv(csv) => services_from_csv(&csv),
    })
}

fn default_theme() -> String {
    DEFAULT_THEME.to_string()
}

fn default_primary_color() -> String {
    DEFAULT_PRIMARY_COLOR.to_string()
}

fn default_secondary_color() -> String {
    DEFAULT_SECONDARY_COLOR.to_string()
}

impl BrandMemory {
    /// Build a memory from the three required facts, defaulting the rest.
    pub fn new(
        business_name: impl Into<String>,
        website_type: impl Into<String>,
        primary_goal: impl Into<String>,
    ) -> Self {
        Self {
            business_name: business_name.into(),
            website_type: website_type.into(),
            primary_goal: primary_goal.into(),
            description: String::new(),
            theme: default_theme(),
            primary_color: default_primary_color(),
            secondary_color: default_secondary_color(),
            contact_email: String::new(),
            contact_phone: String::new(),
            address: String::new(),
            tagline: String::new(),
            services: Vec::new(),
            labeled_assets: Vec::new(),
        }
    }

    /// Check required fields, color formats and uploaded assets.
    ///
    /// Reports every problem at once so a form can highlight all of them.
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut problems = Vec::new();

        for (label, value) in [
            ("Business name", &self.business_name),
            ("Website type", &self.website_type),
            ("Primary goal", &self.primary_goal),
        ] {
            if value.trim().is_empty() {
                problems.push(format!("{label} is required"));
            }
        }

        for (label, value) in [
            ("Primary color", &self.primary_color),
            ("Secondary color", &self.secondary_color),
        ] {
            if !is_hex_color(value) {
                problems.push(format!("{label} must be a hex color like #1a2b3c, got '{value}'"));
            }
        }

        if self.services.len() > MAX_SERVICES {
            problems.push(format!("At most {MAX_SERVICES} services are allowed"));
        }

        if self.labeled_assets.len() > MAX_LABELED_ASSETS {
            problems.push(format!("At most {MAX_LABELED_ASSETS} images are allowed"));
        }
        for asset in &self.labeled_assets {
            if !asset.has_allowed_url() {
                problems.push(format!(
                    "Image '{}' must be an https:// or site-relative URL",
                    asset.url
                ));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Validation(problems.join("; ")))
        }
    }

    /// Recompute asset orientation from dimensions and label unlabeled
    /// uploads.
    pub fn normalize_assets(&mut self) {
        for (index, asset) in self.labeled_assets.iter_mut().enumerate() {
            asset.url = asset.url.trim().to_string();
            if asset.width > 0 && asset.height > 0 {
                asset.orientation = Orientation::from_dimensions(asset.width, asset.height);
            }
            if asset.label.trim().is_empty() {
                asset.label = auto_label(asset.width, asset.height, index).to_string();
            } else {
                asset.label = asset.label.trim().to_string();
            }
        }
    }
}

/// Split a comma-separated services field, dropping blanks.
pub fn services_from_csv(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// `#rgb` or `#rrggbb`.
fn is_hex_color(value: &str) -> bool {
    let Some(hex) = value.strip_prefix('#') else {
        return false;
    };
    matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
}
