use async_trait::async_trait;

use crate::types::StoryItem;
use crate::Result;

#[async_trait]
pub trait StorySource: Send + Sync {
    /// Name of the upstream, for logs.
    fn source(&self) -> &str;

    /// Fetch at most `limit` trending stories in upstream ranking order.
    ///
    /// Fails with `UpstreamUnavailable` when the API cannot be reached or
    /// answers garbage, and with `EmptyResult` when nothing usable came back.
    async fn fetch_top_stories(&self, limit: usize) -> Result<Vec<StoryItem>>;
}
