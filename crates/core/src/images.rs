//! Image slot URL resolution.
//!
//! Templates declare named image slots (`hero`, `about`, ...). A slot's URL
//! comes from, in priority order: an uploaded override stored on the plan, a
//! keyword the user or copy writer chose, or a default keyword picked
//! deterministically from the template's keyword list. The final keyword is
//! turned into a URL by a pluggable [`ImageSource`].

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::site_plan::SitePlan;

/// Fallback keyword when neither the plan nor the template supplies one.
pub const FALLBACK_KEYWORD: &str = "business";

/// Default base URL for [`SeededPlaceholderSource`].
pub const DEFAULT_PLACEHOLDER_BASE_URL: &str = "https://picsum.photos";

// ---------------------------------------------------------------------------
// Orientation
// ---------------------------------------------------------------------------

/// Aspect class of an image or image slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Landscape,
    Portrait,
    Square,
}

impl Orientation {
    /// Classify by pixel dimensions. Within 10% of 1:1 counts as square.
    pub fn from_dimensions(width: u32, height: u32) -> Self {
        if width == 0 || height == 0 {
            return Self::Landscape;
        }
        let ratio = width as f64 / height as f64;
        if (0.9..=1.1).contains(&ratio) {
            Self::Square
        } else if ratio > 1.0 {
            Self::Landscape
        } else {
            Self::Portrait
        }
    }

    /// Requested pixel size for a generated image of this orientation.
    pub fn target_size(self) -> (u32, u32) {
        match self {
            Self::Landscape => (1600, 900),
            Self::Portrait => (900, 1600),
            Self::Square => (800, 800),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Landscape => "landscape",
            Self::Portrait => "portrait",
            Self::Square => "square",
        }
    }

    /// Parse a template manifest slot type; unknown types are landscape.
    pub fn from_slot_type(slot_type: &str) -> Self {
        match slot_type {
            "portrait" => Self::Portrait,
            "square" => Self::Square,
            _ => Self::Landscape,
        }
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Image source strategy
// ---------------------------------------------------------------------------

/// A slot whose URL needs resolving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSlot<'a> {
    pub name: &'a str,
    pub orientation: Orientation,
    pub keyword: &'a str,
}

/// Turns a keyworded slot into an image URL.
pub trait ImageSource: Send + Sync {
    fn url_for(&self, slot: &ImageSlot<'_>) -> String;
}

/// Deterministic placeholder images: the same keyword and size always yield
/// the same picture (`{base}/seed/{keyword}/{w}/{h}`).
#[derive(Debug, Clone)]
pub struct SeededPlaceholderSource {
    base_url: String,
}

impl SeededPlaceholderSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for SeededPlaceholderSource {
    fn default() -> Self {
        Self::new(DEFAULT_PLACEHOLDER_BASE_URL)
    }
}

impl ImageSource for SeededPlaceholderSource {
    fn url_for(&self, slot: &ImageSlot<'_>) -> String {
        let (w, h) = slot.orientation.target_size();
        let keyword = slugify_keyword(slot.keyword);
        format!("{}/seed/{keyword}/{w}/{h}", self.base_url)
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolve the URL for `slot_name` on `plan`.
///
/// Uploaded overrides win outright. Otherwise the plan's keyword for the slot
/// is used, falling back to one of `default_keywords` chosen by a stable hash
/// of the slot name (so a slot keeps its picture across re-renders).
pub fn resolve_slot_url(
    plan: &SitePlan,
    slot_name: &str,
    orientation: Orientation,
    default_keywords: &[String],
    source: &dyn ImageSource,
) -> String {
    if let Some(url) = plan
        .image_overrides
        .get(slot_name)
        .filter(|u| !u.trim().is_empty())
    {
        return url.clone();
    }

    let keyword = plan
        .image_keywords
        .get(slot_name)
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .unwrap_or_else(|| default_keyword(slot_name, default_keywords));

    source.url_for(&ImageSlot {
        name: slot_name,
        orientation,
        keyword,
    })
}

/// Pick a stable default keyword for a slot.
fn default_keyword<'a>(slot_name: &str, default_keywords: &'a [String]) -> &'a str {
    if default_keywords.is_empty() {
        return FALLBACK_KEYWORD;
    }
    let digest = Sha256::digest(slot_name.as_bytes());
    let index = u64::from_be_bytes([
        digest[0], digest[1], digest[2], digest[3], digest[4], digest[5], digest[6], digest[7],
    ]) as usize
        % default_keywords.len();
    &default_keywords[index]
}

/// Make a keyword safe for a URL path segment.
fn slugify_keyword(keyword: &str) -> String {
    let slug: String = keyword
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let slug = slug
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        FALLBACK_KEYWORD.to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> SitePlan {
        SitePlan::new("Acme", vec![crate::site_plan::SectionPlan::new("hero", "Hero")])
    }

    #[test]
    fn orientation_from_dimensions() {
        assert_eq!(Orientation::from_dimensions(1920, 1080), Orientation::Landscape);
        assert_eq!(Orientation::from_dimensions(1080, 1920), Orientation::Portrait);
        assert_eq!(Orientation::from_dimensions(1000, 1050), Orientation::Square);
        assert_eq!(Orientation::from_dimensions(0, 10), Orientation::Landscape);
    }

    #[test]
    fn override_wins() {
        let mut plan = plan();
        plan.image_overrides
            .insert("hero".into(), "https://cdn.example.com/hero.jpg".into());
        plan.image_keywords.insert("hero".into(), "bread".into());
        let url = resolve_slot_url(
            &plan,
            "hero",
            Orientation::Landscape,
            &[],
            &SeededPlaceholderSource::default(),
        );
        assert_eq!(url, "https://cdn.example.com/hero.jpg");
    }

    #[test]
    fn plan_keyword_used_with_orientation_size() {
        let mut plan = plan();
        plan.image_keywords.insert("about".into(), "Fresh Bread".into());
        let url = resolve_slot_url(
            &plan,
            "about",
            Orientation::Portrait,
            &[],
            &SeededPlaceholderSource::default(),
        );
        assert_eq!(url, "https://picsum.photos/seed/fresh-bread/900/1600");
    }

    #[test]
    fn default_keyword_is_stable() {
        let keywords = vec!["cafe".to_string(), "pastry".to_string(), "oven".to_string()];
        let source = SeededPlaceholderSource::new("https://img.example.com/");
        let a = resolve_slot_url(&plan(), "gallery_1", Orientation::Square, &keywords, &source);
        let b = resolve_slot_url(&plan(), "gallery_1", Orientation::Square, &keywords, &source);
        assert_eq!(a, b);
        assert!(a.starts_with("https://img.example.com/seed/"));
        assert!(a.ends_with("/800/800"));
    }

    #[test]
    fn no_keywords_falls_back() {
        let url = resolve_slot_url(
            &plan(),
            "hero",
            Orientation::Landscape,
            &[],
            &SeededPlaceholderSource::default(),
        );
        assert_eq!(url, "https://picsum.photos/seed/business/1600/900");
    }

    #[test]
    fn blank_override_is_ignored() {
        let mut plan = plan();
        plan.image_overrides.insert("hero".into(), "  ".into());
        let url = resolve_slot_url(
            &plan,
            "hero",
            Orientation::Landscape,
            &["bakery".to_string()],
            &SeededPlaceholderSource::default(),
        );
        assert_eq!(url, "https://picsum.photos/seed/bakery/1600/900");
    }
}
