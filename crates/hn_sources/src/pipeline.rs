use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use hn_core::{
    Digest, DigestBuilder, DigestEntry, Error, Result, StoryItem, StorySource, Summarizer,
};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// How many stories to pull from the feed.
    pub fetch_limit: usize,
    /// How many of the highest-scoring stories get summarized.
    pub max_stories: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fetch_limit: 30,
            max_stories: 10,
        }
    }
}

/// Intro used when the summarizer cannot write one.
pub fn fallback_intro(date: NaiveDate, count: usize) -> String {
    format!("{} 的 Hacker News 精选，共 {} 篇，一起来看看今天大家在讨论什么。", date, count)
}

/// Fetch, summarize and assemble a digest.
pub struct DigestPipeline {
    source: Arc<dyn StorySource>,
    summarizer: Arc<dyn Summarizer>,
    config: PipelineConfig,
}

impl fmt::Debug for DigestPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigestPipeline")
            .field("source", &self.source.source())
            .field("summarizer", &self.summarizer.name())
            .field("config", &self.config)
            .finish()
    }
}

impl DigestPipeline {
    pub fn new(source: Arc<dyn StorySource>, summarizer: Arc<dyn Summarizer>) -> Self {
        Self {
            source,
            summarizer,
            config: PipelineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Fetch stories and keep the `max_stories` best-scoring unique ones.
    pub async fn select_stories(&self) -> Result<Vec<StoryItem>> {
        let mut seen = HashSet::new();
        let mut stories: Vec<StoryItem> = self
            .source
            .fetch_top_stories(self.config.fetch_limit)
            .await?
            .into_iter()
            .filter(|story| seen.insert(story.id))
            .collect();

        stories.sort_by(|a, b| b.score.cmp(&a.score));
        stories.truncate(self.config.max_stories);
        Ok(stories)
    }
}

#[async_trait]
impl DigestBuilder for DigestPipeline {
    async fn build(&self, date: NaiveDate) -> Result<Digest> {
        info!(%date, source = self.source.source(), "📡 Fetching stories");
        let stories = match self.select_stories().await {
            Ok(stories) => stories,
            Err(Error::EmptyResult) => {
                warn!(%date, "No stories to build a digest from");
                return Err(Error::DigestBuildFailed(
                    "the content API returned no stories".to_string(),
                ));
            }
            Err(e) => return Err(e),
        };

        info!(%date, count = stories.len(), model = self.summarizer.name(), "🤖 Summarizing stories");
        let summaries = self.summarizer.summarize_all(&stories).await;

        let entries: Vec<DigestEntry> = stories
            .into_iter()
            .zip(summaries)
            .filter_map(|(story, summary)| match summary {
                Ok(summary) => Some(DigestEntry { story, summary }),
                Err(e) => {
                    warn!(%date, story_id = story.id, error = %e, "Dropping story from digest");
                    None
                }
            })
            .collect();

        if entries.is_empty() {
            return Err(Error::DigestBuildFailed(
                "no story could be summarized".to_string(),
            ));
        }

        let intro = match self.summarizer.write_intro(date, &entries).await {
            Ok(intro) => intro,
            Err(e) => {
                warn!(%date, error = %e, "Intro generation failed, using fallback");
                fallback_intro(date, entries.len())
            }
        };

        let digest = Digest::new(date, intro, entries);
        info!(%date, count = digest.story_count(), "✨ Digest built");
        Ok(digest)
    }
}
