//! Checks run on untrusted model output before it is stored, and again
//! before it is published. Pure functions, no I/O.

pub mod css;
pub mod html;

pub use css::{css_issues, CssPolicy};
pub use html::{html_issues, strip_style_tags};

use crate::error::CoreError;

fn into_result(issues: Vec<String>) -> Result<(), CoreError> {
    if issues.is_empty() {
        Ok(())
    } else {
        Err(CoreError::AiValidation { issues })
    }
}

/// Fail with [`CoreError::AiValidation`] listing every HTML issue.
pub fn validate_html(html: &str) -> Result<(), CoreError> {
    into_result(html_issues(html))
}

/// Fail with [`CoreError::AiValidation`] listing every CSS issue.
pub fn validate_css(css: &str, policy: &CssPolicy) -> Result<(), CoreError> {
    into_result(css_issues(css, policy))
}

/// Validate a full page, reporting HTML and CSS issues together.
pub fn validate_site(html: &str, css: &str, policy: &CssPolicy) -> Result<(), CoreError> {
    let mut issues = html_issues(html);
    issues.extend(css_issues(css, policy));
    into_result(issues)
}
