use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use hn_core::{Error, Result, StoryItem, StorySource};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;

pub const HN_API_BASE: &str = "https://hacker-news.firebaseio.com/v0";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Which ranked list to read from the API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Feed {
    #[default]
    Top,
    Best,
    Show,
}

impl Feed {
    fn endpoint(&self) -> &'static str {
        match self {
            Feed::Top => "topstories",
            Feed::Best => "beststories",
            Feed::Show => "showstories",
        }
    }
}

impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Feed::Top => "top",
            Feed::Best => "best",
            Feed::Show => "show",
        };
        f.write_str(name)
    }
}

impl FromStr for Feed {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" | "topstories" => Ok(Feed::Top),
            "best" | "beststories" => Ok(Feed::Best),
            "show" | "showstories" => Ok(Feed::Show),
            other => Err(Error::Config(format!(
                "Unknown feed '{}'. Expected one of: top, best, show",
                other
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct HnItem {
    id: u64,
    #[serde(rename = "type")]
    kind: Option<String>,
    title: Option<String>,
    url: Option<String>,
    score: Option<u32>,
    by: Option<String>,
    time: Option<i64>,
    descendants: Option<u32>,
    text: Option<String>,
    #[serde(default)]
    dead: bool,
    #[serde(default)]
    deleted: bool,
}

impl HnItem {
    /// Only live stories make it into a digest.
    fn into_story(self) -> Option<StoryItem> {
        if self.kind.as_deref() != Some("story") || self.dead || self.deleted {
            return None;
        }
        Some(StoryItem {
            id: self.id,
            title: self.title.unwrap_or_default(),
            url: self.url.filter(|u| !u.is_empty()),
            score: self.score.unwrap_or(0),
            comment_count: self.descendants.unwrap_or(0),
            author: self.by.unwrap_or_else(|| "unknown".to_string()),
            source_timestamp: self
                .time
                .and_then(|t| DateTime::from_timestamp(t, 0))
                .unwrap_or_else(Utc::now),
            text: self.text,
        })
    }
}

/// Reads ranked stories from the Hacker News Firebase API.
#[derive(Clone)]
pub struct HackerNewsSource {
    client: Client,
    base_url: String,
    feed: Feed,
}

impl fmt::Debug for HackerNewsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HackerNewsSource")
            .field("client", &"<reqwest::Client>")
            .field("base_url", &self.base_url)
            .field("feed", &self.feed)
            .finish()
    }
}

impl HackerNewsSource {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("hn-digest/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: HN_API_BASE.to_string(),
            feed: Feed::default(),
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        Url::parse(base_url)
            .map_err(|e| Error::Config(format!("Invalid content API URL '{}': {}", base_url, e)))?;
        self.base_url = base_url.trim_end_matches('/').to_string();
        Ok(self)
    }

    pub fn with_feed(mut self, feed: Feed) -> Self {
        self.feed = feed;
        self
    }

    pub fn feed(&self) -> Feed {
        self.feed
    }

    async fn fetch_ids(&self) -> Result<Vec<u64>> {
        let url = format!("{}/{}.json", self.base_url, self.feed.endpoint());
        let unavailable = |e: reqwest::Error| Error::UpstreamUnavailable(format!("{}: {}", url, e));

        self.client
            .get(&url)
            .send()
            .await
            .map_err(unavailable)?
            .error_for_status()
            .map_err(unavailable)?
            .json::<Vec<u64>>()
            .await
            .map_err(unavailable)
    }

    /// `Ok(None)` for ids that resolve to null, non-stories, or dead posts.
    pub async fn fetch_item(&self, id: u64) -> Result<Option<StoryItem>> {
        let url = format!("{}/item/{}.json", self.base_url, id);
        let item = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<Option<HnItem>>()
            .await?;
        Ok(item.and_then(HnItem::into_story))
    }
}

#[async_trait]
impl StorySource for HackerNewsSource {
    fn source(&self) -> &str {
        "Hacker News"
    }

    async fn fetch_top_stories(&self, limit: usize) -> Result<Vec<StoryItem>> {
        let ids: Vec<u64> = self.fetch_ids().await?.into_iter().take(limit).collect();
        debug!(feed = %self.feed, count = ids.len(), "Fetched story ids");

        let results = join_all(ids.iter().map(|id| self.fetch_item(*id))).await;
        let stories: Vec<StoryItem> = ids
            .iter()
            .zip(results)
            .filter_map(|(id, result)| match result {
                Ok(Some(story)) => Some(story),
                Ok(None) => {
                    debug!(story_id = id, "Skipping item that is not a live story");
                    None
                }
                Err(e) => {
                    debug!(story_id = id, error = %e, "Skipping item that failed to load");
                    None
                }
            })
            .collect();

        if stories.is_empty() {
            warn!(feed = %self.feed, "Content API returned no usable stories");
            return Err(Error::EmptyResult);
        }

        info!(feed = %self.feed, count = stories.len(), "📡 Fetched stories");
        Ok(stories)
    }
}
