use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use hn_core::{DigestEntry, Error, Result, StoryItem, StorySummary, Summarizer};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::{prompt, Config};

pub mod anthropic;
pub mod deepseek;
pub mod dummy;

pub use anthropic::AnthropicModel;
pub use deepseek::DeepSeekModel;
pub use dummy::DummyModel;

const SUMMARY_MAX_TOKENS: u32 = 600;
const INTRO_MAX_TOKENS: u32 = 800;
const MAX_ERROR_BODY: usize = 200;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ModelKind {
    #[default]
    Anthropic,
    DeepSeek,
    Dummy,
}

impl ModelKind {
    /// Environment variable consulted when no API key is configured.
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            ModelKind::Anthropic => Some("ANTHROPIC_API_KEY"),
            ModelKind::DeepSeek => Some("DEEPSEEK_API_KEY"),
            ModelKind::Dummy => None,
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModelKind::Anthropic => "anthropic",
            ModelKind::DeepSeek => "deepseek",
            ModelKind::Dummy => "dummy",
        };
        f.write_str(name)
    }
}

impl FromStr for ModelKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anthropic" | "claude" => Ok(ModelKind::Anthropic),
            "deepseek" => Ok(ModelKind::DeepSeek),
            "dummy" => Ok(ModelKind::Dummy),
            other => Err(Error::Config(format!(
                "Unknown model '{}'. Available models: anthropic (default), deepseek, dummy",
                other
            ))),
        }
    }
}

/// A text-in, text-out completion endpoint.
#[async_trait]
pub trait ChatBackend: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String>;
}

/// One turn of a chat-style request body.
#[derive(Serialize)]
pub(crate) struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

/// Turn a response into `T`, reporting non-2xx statuses with the start of the body.
pub(crate) async fn read_json<T: DeserializeOwned>(
    backend: &str,
    response: reqwest::Response,
) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let excerpt: String = body.chars().take(MAX_ERROR_BODY).collect();
        return Err(Error::Http(format!("{} returned {}: {}", backend, status, excerpt)));
    }
    Ok(response.json::<T>().await?)
}

pub(crate) fn parse_base_url(url: &str) -> Result<String> {
    Url::parse(url).map_err(|e| Error::Config(format!("Invalid model URL '{}': {}", url, e)))?;
    Ok(url.trim_end_matches('/').to_string())
}

/// Summarizer that prompts a chat backend once per story and once for the intro.
#[derive(Debug)]
pub struct LlmSummarizer<B> {
    backend: B,
    concurrency: usize,
}

impl<B: ChatBackend> LlmSummarizer<B> {
    pub fn new(backend: B, concurrency: usize) -> Self {
        Self {
            backend,
            concurrency: concurrency.max(1),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

#[async_trait]
impl<B: ChatBackend> Summarizer for LlmSummarizer<B> {
    fn name(&self) -> &str {
        self.backend.name()
    }

    async fn summarize(&self, story: &StoryItem) -> Result<StorySummary> {
        debug!(story_id = story.id, backend = self.backend.name(), "Requesting summary");
        let reply = self
            .backend
            .complete(&prompt::story_prompt(story), SUMMARY_MAX_TOKENS)
            .await
            .map_err(|e| Error::summarization(story.id, e.to_string()))?;
        prompt::parse_summary(story.id, &reply)
    }

    async fn summarize_all(&self, stories: &[StoryItem]) -> Vec<Result<StorySummary>> {
        let futures: Vec<_> = stories.iter().map(|story| self.summarize(story)).collect();
        stream::iter(futures)
            .buffered(self.concurrency)
            .collect::<Vec<_>>()
            .await
    }

    async fn write_intro(&self, date: NaiveDate, entries: &[DigestEntry]) -> Result<String> {
        let reply = self
            .backend
            .complete(&prompt::intro_prompt(date, entries), INTRO_MAX_TOKENS)
            .await?;
        let intro = reply.trim();
        if intro.is_empty() {
            return Err(Error::Serialization("intro reply was empty".to_string()));
        }
        Ok(intro.to_string())
    }
}

fn resolve_api_key(config: &Config) -> Result<String> {
    config
        .api_key
        .clone()
        .filter(|key| !key.trim().is_empty())
        .or_else(|| {
            config
                .model
                .api_key_env()
                .and_then(|name| std::env::var(name).ok())
                .filter(|key| !key.trim().is_empty())
        })
        .ok_or_else(|| {
            Error::Config(format!(
                "{} API key is required (set {})",
                config.model,
                config.model.api_key_env().unwrap_or("--api-key")
            ))
        })
}

/// Build the summarizer selected by `config.model`.
pub fn create_model(config: &Config) -> Result<Arc<dyn Summarizer>> {
    let model: Arc<dyn Summarizer> = match config.model {
        ModelKind::Anthropic => {
            let mut backend = AnthropicModel::new(resolve_api_key(config)?)?;
            if let Some(url) = &config.model_url {
                backend = backend.with_base_url(url)?;
            }
            if let Some(name) = &config.model_name {
                backend = backend.with_model(name);
            }
            Arc::new(LlmSummarizer::new(backend, config.concurrency))
        }
        ModelKind::DeepSeek => {
            let mut backend = DeepSeekModel::new(resolve_api_key(config)?)?;
            if let Some(url) = &config.model_url {
                backend = backend.with_base_url(url)?;
            }
            if let Some(name) = &config.model_name {
                backend = backend.with_model(name);
            }
            Arc::new(LlmSummarizer::new(backend, config.concurrency))
        }
        ModelKind::Dummy => Arc::new(DummyModel::new()),
    };
    Ok(model)
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::Router;

    /// Serve `router` on an ephemeral local port and return its base URL.
    pub(crate) async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }
}
