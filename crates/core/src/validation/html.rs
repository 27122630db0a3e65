//! Structural and safety rules for generated HTML.

use std::sync::LazyLock;

use regex::Regex;

static NAV_ROLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)role\s*=\s*["']?navigation\b"#).expect("valid regex")
});

static FOOTER_ROLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)role\s*=\s*["']?contentinfo\b"#).expect("valid regex")
});

static STYLE_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style[\s>].*?</style>").expect("valid regex"));

/// Every rule `html` breaks, in a stable order. Empty means valid.
pub fn html_issues(html: &str) -> Vec<String> {
    let mut issues = Vec::new();
    let lower = html.to_ascii_lowercase();

    if !lower.trim_start().starts_with("<!doctype html") {
        issues.push("HTML must start with <!DOCTYPE html>".to_string());
    }

    if !lower.contains("<nav") && !NAV_ROLE_RE.is_match(html) {
        issues.push("HTML must contain a <nav> element".to_string());
    }

    if !lower.contains("<footer") && !FOOTER_ROLE_RE.is_match(html) {
        issues.push("HTML must contain a <footer> element".to_string());
    }

    if lower.contains("<script") {
        issues.push("HTML must not contain <script> tags".to_string());
    }

    if has_inline_handler(html) {
        issues.push("HTML must not contain inline event handlers".to_string());
    }

    issues
}

/// Whether any start tag carries an `on*=` attribute.
///
/// Walks the tags instead of matching them with a pattern: quoted attribute
/// values may contain `>`, and `/` separates attributes as well as
/// whitespace does (`<svg/onload=...>`).
fn has_inline_handler(html: &str) -> bool {
    let bytes = html.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let opens_tag = bytes[i] == b'<' && bytes.get(i + 1).is_some_and(u8::is_ascii_alphabetic);
        i += 1;
        if !opens_tag {
            continue;
        }

        let mut quote: Option<u8> = None;
        let mut at_boundary = false;
        while i < bytes.len() {
            let b = bytes[i];
            match quote {
                Some(q) if b == q => {
                    quote = None;
                    at_boundary = true;
                }
                Some(_) => {}
                None => match b {
                    b'>' => break,
                    b'"' | b'\'' => quote = Some(b),
                    b'/' => at_boundary = true,
                    _ if b.is_ascii_whitespace() => at_boundary = true,
                    _ => {
                        if at_boundary && is_handler_attribute(&bytes[i..]) {
                            return true;
                        }
                        at_boundary = false;
                    }
                },
            }
            i += 1;
        }
    }
    false
}

/// `rest` starts with `on<letters>` followed by optional space and `=`.
fn is_handler_attribute(rest: &[u8]) -> bool {
    if rest.len() < 3 || !rest[..2].eq_ignore_ascii_case(b"on") {
        return false;
    }
    let name_end = 2 + rest[2..].iter().take_while(|b| b.is_ascii_alphabetic()).count();
    if name_end == 2 {
        return false;
    }
    let value_start = name_end
        + rest[name_end..]
            .iter()
            .take_while(|b| b.is_ascii_whitespace())
            .count();
    rest.get(value_start) == Some(&b'=')
}

/// Remove `<style>` blocks a model emitted even though CSS is produced
/// separately.
pub fn strip_style_tags(html: &str) -> String {
    STYLE_BLOCK_RE.replace_all(html, "").into_owned()
}
