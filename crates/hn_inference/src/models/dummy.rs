use std::fmt;

use chrono::NaiveDate;
use hn_core::{Category, DigestEntry, Importance, Result, StoryItem, StorySummary, Summarizer};

/// Offline summarizer with deterministic output, for local runs without an API key.
pub struct DummyModel;

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").finish()
    }
}

impl DummyModel {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DummyModel {
    fn default() -> Self {
        Self::new()
    }
}

fn importance_for_score(score: u32) -> i64 {
    match score {
        500.. => 5,
        300..=499 => 4,
        150..=299 => 3,
        50..=149 => 2,
        _ => 1,
    }
}

#[async_trait::async_trait]
impl Summarizer for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn summarize(&self, story: &StoryItem) -> Result<StorySummary> {
        let category = if story.is_show_hn() || story.is_ask_hn() {
            Category::Tech
        } else {
            Category::Other
        };
        Ok(StorySummary {
            story_id: story.id,
            summary_zh: format!(
                "{}（{} 分，{} 条评论）",
                story.title, story.score, story.comment_count
            ),
            category,
            importance: Importance::new(importance_for_score(story.score))?,
        })
    }

    async fn write_intro(&self, date: NaiveDate, entries: &[DigestEntry]) -> Result<String> {
        Ok(format!("{} 共收录 {} 篇热门文章。", date, entries.len()))
    }
}
