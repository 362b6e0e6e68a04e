use std::fmt;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::types::{DigestEntry, StoryItem, StorySummary};
use crate::Result;

#[async_trait]
pub trait Summarizer: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Summarize and classify one story. Unparseable replies are
    /// `Error::SummarizationFailed`.
    async fn summarize(&self, story: &StoryItem) -> Result<StorySummary>;

    /// Summarize a batch. The output has one result per input, in input order.
    async fn summarize_all(&self, stories: &[StoryItem]) -> Vec<Result<StorySummary>> {
        let mut results = Vec::with_capacity(stories.len());
        for story in stories {
            results.push(self.summarize(story).await);
        }
        results
    }

    /// Write the opening paragraph for a day's digest.
    async fn write_intro(&self, date: NaiveDate, entries: &[DigestEntry]) -> Result<String>;
}
