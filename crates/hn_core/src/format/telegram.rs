use std::fmt::Write;

use super::MUST_READ_IMPORTANCE;
use crate::types::Digest;

pub const TELEGRAM_MAX_STORIES: usize = 5;

/// Escape text for Telegram's HTML parse mode, which only knows `&`, `<`, `>`
/// and `"` entities.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn to_telegram_html(digest: &Digest) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "🍊 <b>HN 每日精选 | {}</b>", digest.date);
    out.push('\n');
    let _ = writeln!(out, "{}", escape_html(&digest.intro));
    out.push('\n');

    for (i, entry) in digest.stories.iter().take(TELEGRAM_MAX_STORIES).enumerate() {
        let story = &entry.story;
        let emoji = if entry.summary.importance.get() >= MUST_READ_IMPORTANCE {
            "🔥"
        } else {
            "📰"
        };
        let _ = writeln!(out, "{} <b>{}. {}</b>", emoji, i + 1, escape_html(&story.title));
        let _ = writeln!(
            out,
            "   📊 {} | 💬 {} | 🏷️ {}",
            story.score, story.comment_count, entry.summary.category
        );
        let _ = writeln!(out, "   {}", escape_html(&entry.summary.summary_zh));
        let _ = writeln!(
            out,
            "   <a href=\"{}\">原文</a> | <a href=\"{}\">讨论</a>",
            escape_html(&story.link()),
            escape_html(&story.hn_url())
        );
        out.push('\n');
    }

    if digest.stories.len() > TELEGRAM_MAX_STORIES {
        let _ = writeln!(
            out,
            "...还有 {} 篇，完整版见网页",
            digest.stories.len() - TELEGRAM_MAX_STORIES
        );
    }

    out
}
