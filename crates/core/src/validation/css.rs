//! Safety rules for generated CSS.

use std::sync::LazyLock;

use regex::Regex;

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)url\(\s*["']?([^"')]*?)["']?\s*\)"#).expect("valid regex")
});

/// Hosts CSS may load images from over HTTPS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssPolicy {
    allowed_hosts: Vec<String>,
}

impl CssPolicy {
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed_hosts = hosts
            .into_iter()
            .map(|h| h.as_ref().trim().to_ascii_lowercase())
            .filter(|h| !h.is_empty())
            .collect();
        Self { allowed_hosts }
    }

    /// Also allow `host`.
    pub fn with_host(mut self, host: &str) -> Self {
        let host = host.trim().to_ascii_lowercase();
        if !host.is_empty() && !self.allowed_hosts.contains(&host) {
            self.allowed_hosts.push(host);
        }
        self
    }

    pub fn allowed_hosts(&self) -> &[String] {
        &self.allowed_hosts
    }

    pub fn allows_host(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        self.allowed_hosts.iter().any(|h| *h == host)
    }
}

impl Default for CssPolicy {
    fn default() -> Self {
        Self::new(["picsum.photos", "fastly.picsum.photos"])
    }
}

/// Host part of an `https://` URL.
fn https_host(url: &str) -> Option<&str> {
    const SCHEME: &str = "https://";
    url.get(..SCHEME.len())
        .filter(|prefix| prefix.eq_ignore_ascii_case(SCHEME))?;
    let rest = &url[SCHEME.len()..];
    let end = rest.find(['/', '?', '#', ':']).unwrap_or(rest.len());
    Some(&rest[..end])
}

fn url_issue(url: &str, policy: &CssPolicy) -> Option<String> {
    let lower = url.to_ascii_lowercase();

    if url.is_empty() || lower.starts_with("data:") || lower.starts_with('#') {
        return None;
    }
    if url.starts_with("//") {
        return Some(format!("CSS must not reference external URLs: {url}"));
    }
    if url.starts_with('/') {
        return None;
    }
    if let Some(host) = https_host(url) {
        return (!policy.allows_host(host))
            .then(|| format!("CSS references a host that is not allowed: {host}"));
    }

    // Anything left with a scheme (http:, javascript:, ftp:) is rejected;
    // scheme-less values are relative paths.
    let has_scheme = url
        .split_once(':')
        .is_some_and(|(scheme, _)| !scheme.contains('/'));
    has_scheme.then(|| format!("CSS must not reference external URLs: {url}"))
}

/// Every rule `css` breaks. Empty means valid.
pub fn css_issues(css: &str, policy: &CssPolicy) -> Vec<String> {
    let mut issues = Vec::new();

    if css.to_ascii_lowercase().contains("@import") {
        issues.push("CSS must not contain @import rules".to_string());
    }

    for captures in URL_RE.captures_iter(css) {
        let url = captures.get(1).map_or("", |m| m.as_str().trim());
        if let Some(issue) = url_issue(url, policy) {
            issues.push(issue);
        }
    }

    issues
}
