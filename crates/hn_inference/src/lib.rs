use std::fmt;

pub mod models;
pub mod prompt;

pub use models::{create_model, ModelKind};

pub const DEFAULT_CONCURRENCY: usize = 4;

/// Settings for building a summarizer backend.
#[derive(Clone)]
pub struct Config {
    pub model: ModelKind,
    pub api_key: Option<String>,
    /// Backend model id, e.g. `claude-sonnet-4-20250514`.
    pub model_name: Option<String>,
    /// Backend base URL override.
    pub model_url: Option<String>,
    /// Maximum summarization requests in flight during one build.
    pub concurrency: usize,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("model_name", &self.model_name)
            .field("model_url", &self.model_url)
            .field("concurrency", &self.concurrency)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: ModelKind::default(),
            api_key: None,
            model_name: None,
            model_url: None,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

pub mod prelude {
    pub use super::models::{create_model, ChatBackend, LlmSummarizer, ModelKind};
    pub use super::Config;
    pub use hn_core::{Error, Result, StorySummary, Summarizer};
}
