//! Prompt text for the summarizer and parsing of its replies.

use std::fmt::Write;

use chrono::NaiveDate;
use hn_core::{Category, DigestEntry, Error, Importance, Result, StoryItem, StorySummary};
use serde::Deserialize;
use serde_json::Value;

const MAX_TEXT_CHARS: usize = 500;

pub fn story_prompt(story: &StoryItem) -> String {
    let mut prompt = String::from(
        "你是一位资深科技编辑，负责为中国开发者编写每日 Hacker News 精选。\n\n文章信息：\n",
    );
    let _ = writeln!(prompt, "标题：{}", story.title);
    let _ = writeln!(
        prompt,
        "分数：{} | 评论：{} | 作者：{}",
        story.score, story.comment_count, story.author
    );
    let _ = writeln!(prompt, "链接：{}", story.link());
    if let Some(text) = story.text.as_deref().filter(|t| !t.trim().is_empty()) {
        let excerpt: String = text.chars().take(MAX_TEXT_CHARS).collect();
        let _ = writeln!(prompt, "正文：{}...", excerpt);
    }

    let labels: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
    let _ = write!(
        prompt,
        "\n请完成以下任务：\n\
         1. 用中文写一个简洁的摘要（2-3 句话），说明这篇文章为什么值得关注\n\
         2. 给文章分类：{}\n\
         3. 给文章打重要性分数 1-5（5 最重要）\n\n\
         输出格式（JSON）：\n\
         {{\"summary_zh\": \"中文摘要...\", \"category\": \"ai\", \"importance\": 4}}\n\n\
         只输出 JSON，不要其他内容。",
        labels.join("/")
    );
    prompt
}

pub fn intro_prompt(date: NaiveDate, entries: &[DigestEntry]) -> String {
    let mut prompt = format!(
        "你是一位资深科技编辑。以下是 {} 的 Hacker News 精选摘要：\n\n",
        date
    );
    for entry in entries {
        let _ = writeln!(
            prompt,
            "- {}（{}）：{}",
            entry.story.title, entry.summary.category, entry.summary.summary_zh
        );
    }
    prompt.push_str(
        "\n请写一段今日科技圈总结作为开场白（3-4 句话）。只输出开场白正文，不要标题或其他内容。",
    );
    prompt
}

/// Pull the JSON object out of a reply that may be fenced or padded with prose.
pub fn extract_json(reply: &str) -> &str {
    let mut text = reply.trim();
    if let Some(rest) = text.strip_prefix("```") {
        let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or(rest);
        text = body.rsplit_once("```").map(|(body, _)| body).unwrap_or(body).trim();
    }
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    }
}

#[derive(Debug, Deserialize)]
struct RawSummary {
    #[serde(alias = "summary")]
    summary_zh: String,
    category: String,
    importance: Value,
}

fn importance_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Parse a model reply into a summary. Anything that does not fit the
/// `{summary_zh, category, importance}` shape is `SummarizationFailed`.
pub fn parse_summary(story_id: u64, reply: &str) -> Result<StorySummary> {
    let raw: RawSummary = serde_json::from_str(extract_json(reply))
        .map_err(|e| Error::summarization(story_id, format!("unparseable reply: {}", e)))?;

    let summary_zh = raw.summary_zh.trim().to_string();
    if summary_zh.is_empty() {
        return Err(Error::summarization(story_id, "empty summary"));
    }
    let category = raw
        .category
        .parse::<Category>()
        .map_err(|e| Error::summarization(story_id, e.to_string()))?;
    let importance = importance_value(&raw.importance)
        .ok_or_else(|| Error::summarization(story_id, format!("bad importance: {}", raw.importance)))
        .and_then(|value| {
            Importance::new(value).map_err(|e| Error::summarization(story_id, e.to_string()))
        })?;

    Ok(StorySummary {
        story_id,
        summary_zh,
        category,
        importance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn story() -> StoryItem {
        StoryItem {
            id: 7,
            title: "Show HN: A tiny database".to_string(),
            url: None,
            score: 321,
            comment_count: 45,
            author: "alice".to_string(),
            source_timestamp: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            text: Some("x".repeat(800)),
        }
    }

    #[test]
    fn test_story_prompt_contents() {
        let prompt = story_prompt(&story());
        assert!(prompt.contains("标题：Show HN: A tiny database"));
        assert!(prompt.contains("分数：321 | 评论：45 | 作者：alice"));
        assert!(prompt.contains("链接：https://news.ycombinator.com/item?id=7"));
        assert!(prompt.contains("ai/tech/programming/science/business/startup/career/other"));
        assert!(prompt.contains(&format!("正文：{}...", "x".repeat(500))));
        assert!(!prompt.contains(&"x".repeat(501)));
    }

    #[test]
    fn test_parse_plain_json() {
        let summary = parse_summary(
            7,
            r#"{"summary_zh": "一个很小的数据库。", "category": "programming", "importance": 4}"#,
        )
        .unwrap();
        assert_eq!(summary.story_id, 7);
        assert_eq!(summary.category, Category::Programming);
        assert_eq!(summary.importance.get(), 4);
    }

    #[test]
    fn test_parse_fenced_reply_with_string_importance() {
        let reply = "```json\n{\"summary\": \"摘要\", \"category\": \"AI\", \"importance\": \"5\"}\n```";
        let summary = parse_summary(1, reply).unwrap();
        assert_eq!(summary.summary_zh, "摘要");
        assert_eq!(summary.category, Category::Ai);
        assert_eq!(summary.importance.get(), 5);
    }

    #[test]
    fn test_parse_reply_with_surrounding_prose() {
        let reply = "好的，结果如下：\n{\"summary_zh\": \"摘要\", \"category\": \"science\", \"importance\": 2.0}\n希望有帮助";
        let summary = parse_summary(1, reply).unwrap();
        assert_eq!(summary.category, Category::Science);
        assert_eq!(summary.importance.get(), 2);
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        let cases = [
            "not json at all",
            r#"{"summary_zh": "摘要", "category": "gardening", "importance": 3}"#,
            r#"{"summary_zh": "摘要", "category": "tech", "importance": 9}"#,
            r#"{"summary_zh": "摘要", "category": "tech", "importance": "high"}"#,
            r#"{"summary_zh": "  ", "category": "tech", "importance": 3}"#,
            r#"{"category": "tech", "importance": 3}"#,
        ];
        for reply in cases {
            let err = parse_summary(3, reply).unwrap_err();
            assert!(
                matches!(err, Error::SummarizationFailed { story_id: 3, .. }),
                "expected failure for {}",
                reply
            );
        }
    }

    #[test]
    fn test_intro_prompt_lists_entries() {
        let entry = DigestEntry {
            story: story(),
            summary: parse_summary(
                7,
                r#"{"summary_zh": "一个很小的数据库。", "category": "programming", "importance": 4}"#,
            )
            .unwrap(),
        };
        let prompt = intro_prompt(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), &[entry]);
        assert!(prompt.contains("2024-05-01"));
        assert!(prompt.contains("- Show HN: A tiny database（programming）：一个很小的数据库。"));
    }
}
