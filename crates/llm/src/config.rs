use std::time::Duration;

/// Chat completion endpoint settings.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Base URL up to and including the version segment, e.g.
    /// `https://api.openai.com/v1`.
    pub base_url: String,
    pub api_key: String,
    /// Model for planning.
    pub model: String,
    /// Model for HTML and CSS.
    pub code_model: String,
    /// Model for the template copy writer.
    pub copy_model: String,
    /// Attempts per request, including the first.
    pub max_retries: u32,
    pub timeout: Duration,
}

impl LlmConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var            | Default                      |
    /// |--------------------|------------------------------|
    /// | `LLM_BASE_URL`     | `https://api.openai.com/v1`  |
    /// | `LLM_API_KEY`      | empty                        |
    /// | `LLM_MODEL`        | `gpt-4o-mini`                |
    /// | `LLM_CODE_MODEL`   | value of `LLM_MODEL`         |
    /// | `LLM_COPY_MODEL`   | value of `LLM_MODEL`         |
    /// | `LLM_MAX_RETRIES`  | `5`                          |
    /// | `LLM_TIMEOUT_SECS` | `120`                        |
    pub fn from_env() -> Self {
        let base_url = std::env::var("LLM_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".into())
            .trim_end_matches('/')
            .to_string();
        let api_key = std::env::var("LLM_API_KEY").unwrap_or_default();
        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());
        let code_model = std::env::var("LLM_CODE_MODEL").unwrap_or_else(|_| model.clone());
        let copy_model = std::env::var("LLM_COPY_MODEL").unwrap_or_else(|_| model.clone());

        let max_retries: u32 = std::env::var("LLM_MAX_RETRIES")
            .unwrap_or_else(|_| "5".into())
            .parse()
            .expect("LLM_MAX_RETRIES must be a valid u32");

        let timeout_secs: u64 = std::env::var("LLM_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".into())
            .parse()
            .expect("LLM_TIMEOUT_SECS must be a valid u64");

        Self {
            base_url,
            api_key,
            model,
            code_model,
            copy_model,
            max_retries: max_retries.max(1),
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}
