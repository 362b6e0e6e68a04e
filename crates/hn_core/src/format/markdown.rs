use std::fmt::Write;

use super::MUST_READ_IMPORTANCE;
use crate::types::{Digest, DigestEntry};

pub fn to_markdown(digest: &Digest) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# 🍊 HN 每日精选 | {}", digest.date);
    out.push('\n');
    out.push_str(&digest.intro);
    out.push_str("\n\n---\n\n");

    let (important, others): (Vec<&DigestEntry>, Vec<&DigestEntry>) = digest
        .stories
        .iter()
        .partition(|e| e.summary.importance.get() >= MUST_READ_IMPORTANCE);

    if !important.is_empty() {
        out.push_str("## 🔥 今日必读\n\n");
        for entry in important {
            let story = &entry.story;
            let _ = writeln!(out, "### {}", story.title);
            let _ = writeln!(
                out,
                "📊 {} 分 | 💬 {} 评论 | 🏷️ {}",
                story.score, story.comment_count, entry.summary.category
            );
            out.push('\n');
            let _ = writeln!(out, "{}", entry.summary.summary_zh);
            out.push('\n');
            let _ = writeln!(out, "🔗 [原文]({}) | [HN 讨论]({})", story.link(), story.hn_url());
            out.push('\n');
        }
    }

    if !others.is_empty() {
        out.push_str("## 📰 其他值得一看\n\n");
        for entry in others {
            let story = &entry.story;
            let _ = writeln!(out, "- **{}** ({}分)", story.title, story.score);
            let _ = writeln!(out, "  {}", entry.summary.summary_zh);
            let _ = writeln!(out, "  [链接]({})", story.link());
            out.push('\n');
        }
    }

    out
}
