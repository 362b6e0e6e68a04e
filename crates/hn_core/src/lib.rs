pub mod error;
pub mod format;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod source;
pub mod types;

pub use error::{Error, Result};
pub use models::Summarizer;
pub use pipeline::DigestBuilder;
pub use source::StorySource;
pub use types::{
    today, Category, Digest, DigestEntry, Importance, StoryItem, StorySummary,
};

pub mod prelude {
    pub use crate::format::{to_json, to_markdown, to_telegram_html, DigestJson};
    pub use crate::{Digest, DigestBuilder, Error, Result, StorySource, Summarizer};
}
