//! Pausing published sites whose trial ran out.

use super::trial::is_trial_expired;
use crate::types::Timestamp;

/// Only sites with a trial that has passed are paused. Sites published
/// without a trial never pause.
pub fn should_pause_site(trial_ends_at: Option<Timestamp>, now: Timestamp) -> bool {
    is_trial_expired(trial_ends_at, now)
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Page served in place of a paused site.
pub fn paused_page_html(business_name: &str) -> String {
    let name = match business_name.trim() {
        "" => "This site".to_string(),
        name => escape_html(name),
    };
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{name} - Site Paused</title>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
            display: flex;
            justify-content: center;
            align-items: center;
            min-height: 100vh;
            margin: 0;
            background: #f9fafb;
            color: #374151;
        }}
        .container {{ text-align: center; padding: 2rem; }}
        h1 {{ font-size: 1.5rem; margin-bottom: 0.5rem; }}
        p {{ color: #6b7280; }}
    </style>
</head>
<body>
    <div class="container">
        <h1>{name}</h1>
        <p>This site is currently paused. The owner can reactivate it by upgrading their plan.</p>
    </div>
</body>
</html>"#
    )
}
