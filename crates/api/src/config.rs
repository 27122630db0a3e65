use std::path::PathBuf;
use std::str::FromStr;

use sitegen_core::images::DEFAULT_PLACEHOLDER_BASE_URL;
use sitegen_core::limits::cooldown::DEFAULT_COOLDOWN_SECONDS;
use sitegen_core::limits::rate_limit::{DEFAULT_MAX_CALLS, DEFAULT_WINDOW_SECONDS};
use sitegen_core::limits::Limit;
use sitegen_core::plans::PlanLimitTable;
use sitegen_core::publishing::trial::DEFAULT_TRIAL_DAYS;
use sitegen_core::validation::CssPolicy;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `120`). Generation requests
    /// wait on model calls, so this is longer than a typical API timeout.
    pub request_timeout_secs: u64,
    /// Graceful shutdown timeout in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// JWT token configuration.
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `120`                      |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = split_list(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
        );

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt,
        }
    }
}

// ---------------------------------------------------------------------------
// Generation settings
// ---------------------------------------------------------------------------

/// Default hosts generated CSS may load images from.
const DEFAULT_CSS_ALLOWED_HOSTS: &str = "picsum.photos,images.unsplash.com";

/// Knobs for usage guards, validation, templates, and publishing.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub cooldown_secs: i64,
    pub rate_limit_max_calls: usize,
    pub rate_limit_window_secs: i64,
    pub trial_duration_days: i64,
    pub plans: PlanLimitTable,
    pub css_allowed_hosts: Vec<String>,
    pub templates_dir: PathBuf,
    pub placeholder_base_url: String,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            cooldown_secs: DEFAULT_COOLDOWN_SECONDS,
            rate_limit_max_calls: DEFAULT_MAX_CALLS,
            rate_limit_window_secs: DEFAULT_WINDOW_SECONDS,
            trial_duration_days: DEFAULT_TRIAL_DAYS,
            plans: PlanLimitTable::default(),
            css_allowed_hosts: split_list(DEFAULT_CSS_ALLOWED_HOSTS),
            templates_dir: PathBuf::from("templates"),
            placeholder_base_url: DEFAULT_PLACEHOLDER_BASE_URL.to_string(),
        }
    }
}

impl GenerationSettings {
    /// Load settings from environment variables with defaults.
    ///
    /// | Env Var                     | Default                              |
    /// |-----------------------------|--------------------------------------|
    /// | `AI_COOLDOWN_SECONDS`       | `30`                                 |
    /// | `RATE_LIMIT_MAX_CALLS`      | `10`                                 |
    /// | `RATE_LIMIT_WINDOW_SECONDS` | `60`                                 |
    /// | `TRIAL_DURATION_DAYS`       | `15`                                 |
    /// | `FREE_PLANNER_LIMIT`        | `1`                                  |
    /// | `FREE_GENERATION_LIMIT`     | `1`                                  |
    /// | `FREE_PROJECT_LIMIT`        | `1`                                  |
    /// | `PAID_PLANNER_LIMIT`        | `5`                                  |
    /// | `PAID_GENERATION_LIMIT`     | `5`                                  |
    /// | `PAID_PROJECT_LIMIT`        | `10`                                 |
    /// | `CSS_ALLOWED_HOSTS`         | `picsum.photos,images.unsplash.com`  |
    /// | `TEMPLATES_DIR`             | `templates`                          |
    /// | `PLACEHOLDER_IMAGE_BASE_URL`| `https://picsum.photos`              |
    ///
    /// The agency tier is always unbounded.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let mut plans = defaults.plans;
        plans.free.planner_calls = env_limit("FREE_PLANNER_LIMIT", plans.free.planner_calls);
        plans.free.generation_calls =
            env_limit("FREE_GENERATION_LIMIT", plans.free.generation_calls);
        plans.free.max_projects = env_limit("FREE_PROJECT_LIMIT", plans.free.max_projects);
        plans.paid.planner_calls = env_limit("PAID_PLANNER_LIMIT", plans.paid.planner_calls);
        plans.paid.generation_calls =
            env_limit("PAID_GENERATION_LIMIT", plans.paid.generation_calls);
        plans.paid.max_projects = env_limit("PAID_PROJECT_LIMIT", plans.paid.max_projects);

        Self {
            cooldown_secs: env_or("AI_COOLDOWN_SECONDS", defaults.cooldown_secs),
            rate_limit_max_calls: env_or("RATE_LIMIT_MAX_CALLS", defaults.rate_limit_max_calls),
            rate_limit_window_secs: env_or(
                "RATE_LIMIT_WINDOW_SECONDS",
                defaults.rate_limit_window_secs,
            ),
            trial_duration_days: env_or("TRIAL_DURATION_DAYS", defaults.trial_duration_days),
            plans,
            css_allowed_hosts: std::env::var("CSS_ALLOWED_HOSTS")
                .map(|v| split_list(&v))
                .unwrap_or(defaults.css_allowed_hosts),
            templates_dir: std::env::var("TEMPLATES_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.templates_dir),
            placeholder_base_url: std::env::var("PLACEHOLDER_IMAGE_BASE_URL")
                .unwrap_or(defaults.placeholder_base_url),
        }
    }

    pub fn css_policy(&self) -> CssPolicy {
        CssPolicy::new(&self.css_allowed_hosts)
    }

    pub fn trial_duration(&self) -> chrono::Duration {
        chrono::Duration::days(self.trial_duration_days)
    }

    pub fn rate_limit_window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.rate_limit_window_secs)
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// # Panics
///
/// Panics if the variable is set but does not parse.
fn env_or<T>(name: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{name} must be a valid number: {e}")),
        Err(_) => default,
    }
}

fn env_limit(name: &str, default: Limit) -> Limit {
    if std::env::var(name).is_ok() {
        Limit::Bounded(env_or(name, 0))
    } else {
        default
    }
}
