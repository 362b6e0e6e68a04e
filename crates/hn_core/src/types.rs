use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

pub const HN_ITEM_URL: &str = "https://news.ycombinator.com/item?id=";

/// A trending item as returned by the content API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryItem {
    pub id: u64,
    pub title: String,
    pub url: Option<String>,
    pub score: u32,
    pub comment_count: u32,
    pub author: String,
    pub source_timestamp: DateTime<Utc>,
    /// Body text for Ask HN / Show HN posts.
    pub text: Option<String>,
}

impl StoryItem {
    pub fn hn_url(&self) -> String {
        format!("{}{}", HN_ITEM_URL, self.id)
    }

    /// External link, or the discussion page for text posts.
    pub fn link(&self) -> String {
        self.url.clone().unwrap_or_else(|| self.hn_url())
    }

    pub fn is_ask_hn(&self) -> bool {
        self.title.starts_with("Ask HN:")
    }

    pub fn is_show_hn(&self) -> bool {
        self.title.starts_with("Show HN:")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Ai,
    Tech,
    Programming,
    Science,
    Business,
    Startup,
    Career,
    Other,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Ai,
        Category::Tech,
        Category::Programming,
        Category::Science,
        Category::Business,
        Category::Startup,
        Category::Career,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Ai => "ai",
            Category::Tech => "tech",
            Category::Programming => "programming",
            Category::Science => "science",
            Category::Business => "business",
            Category::Startup => "startup",
            Category::Career => "career",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == label)
            .ok_or_else(|| Error::Serialization(format!("unknown category: {}", s)))
    }
}

/// Importance score in `[1, 5]`, 5 being the most important.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Importance(u8);

impl Importance {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: i64) -> Result<Self, Error> {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(Error::Serialization(format!(
                "importance {} outside [{}, {}]",
                value,
                Self::MIN,
                Self::MAX
            )))
        }
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Importance {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Importance::new(value)
    }
}

impl From<Importance> for u8 {
    fn from(value: Importance) -> Self {
        value.0
    }
}

impl fmt::Display for Importance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorySummary {
    pub story_id: u64,
    pub summary_zh: String,
    pub category: Category,
    pub importance: Importance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestEntry {
    pub story: StoryItem,
    pub summary: StorySummary,
}

/// One day's digest. Build it with [`Digest::new`] so the story invariants hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Digest {
    pub date: NaiveDate,
    pub intro: String,
    pub stories: Vec<DigestEntry>,
    pub generated_at: DateTime<Utc>,
}

impl Digest {
    /// Drops repeated story ids (first occurrence wins) and orders entries by
    /// descending score, then descending importance.
    pub fn new(date: NaiveDate, intro: impl Into<String>, entries: Vec<DigestEntry>) -> Self {
        let mut seen = HashSet::new();
        let mut stories: Vec<DigestEntry> = entries
            .into_iter()
            .filter(|entry| seen.insert(entry.story.id))
            .collect();
        stories.sort_by(|a, b| {
            b.story
                .score
                .cmp(&a.story.score)
                .then_with(|| b.summary.importance.cmp(&a.summary.importance))
        });

        Self {
            date,
            intro: intro.into(),
            stories,
            generated_at: Utc::now(),
        }
    }

    pub fn story_count(&self) -> usize {
        self.stories.len()
    }

    pub fn story_ids(&self) -> Vec<u64> {
        self.stories.iter().map(|entry| entry.story.id).collect()
    }
}

/// The calendar date the digest for "now" is keyed on.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
