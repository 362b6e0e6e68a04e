use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{Category, Digest, DigestEntry, Importance};
use crate::Result;

/// Response body of `/digest` and `/digest/refresh`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestJson {
    pub date: NaiveDate,
    pub intro: String,
    pub story_count: usize,
    pub stories: Vec<StoryJson>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryJson {
    pub id: u64,
    pub title: String,
    pub url: String,
    pub hn_url: String,
    pub author: String,
    pub summary_zh: String,
    pub category: Category,
    pub importance: Importance,
    pub score: u32,
    pub comments: u32,
}

impl From<&DigestEntry> for StoryJson {
    fn from(entry: &DigestEntry) -> Self {
        Self {
            id: entry.story.id,
            title: entry.story.title.clone(),
            url: entry.story.link(),
            hn_url: entry.story.hn_url(),
            author: entry.story.author.clone(),
            summary_zh: entry.summary.summary_zh.clone(),
            category: entry.summary.category,
            importance: entry.summary.importance,
            score: entry.story.score,
            comments: entry.story.comment_count,
        }
    }
}

pub fn to_json(digest: &Digest) -> DigestJson {
    DigestJson {
        date: digest.date,
        intro: digest.intro.clone(),
        story_count: digest.story_count(),
        stories: digest.stories.iter().map(StoryJson::from).collect(),
    }
}

pub fn to_json_string(digest: &Digest) -> Result<String> {
    Ok(serde_json::to_string_pretty(&to_json(digest))?)
}
