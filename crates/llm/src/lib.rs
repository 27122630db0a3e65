//! OpenAI-compatible chat completions and the planner, HTML, CSS, and copy
//! writer stages built on them.

pub mod api;
pub mod config;
pub mod parse;
pub mod prompts;
pub mod retry;
pub mod stages;

pub use api::{ChatBackend, ChatClient, LlmApiError};
pub use config::LlmConfig;
pub use stages::{LlmCopyWriter, LlmPlanner, LlmSiteGenerator};
