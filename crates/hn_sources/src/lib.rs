pub mod hackernews;
pub mod pipeline;

pub use hackernews::{Feed, HackerNewsSource, HN_API_BASE};
pub use pipeline::{fallback_intro, DigestPipeline, PipelineConfig};

pub mod prelude {
    pub use super::hackernews::{Feed, HackerNewsSource};
    pub use super::pipeline::{DigestPipeline, PipelineConfig};
    pub use hn_core::{Error, Result, StoryItem, StorySource};
}
