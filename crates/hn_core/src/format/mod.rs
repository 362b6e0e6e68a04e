//! Pure renderers for a [`Digest`](crate::Digest).

mod json;
mod markdown;
mod telegram;

pub use json::{to_json, to_json_string, DigestJson, StoryJson};
pub use markdown::to_markdown;
pub use telegram::{escape_html, to_telegram_html, TELEGRAM_MAX_STORIES};

/// Stories at or above this importance are called out as must-reads.
pub const MUST_READ_IMPORTANCE: u8 = 4;
