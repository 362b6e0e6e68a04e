use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use hn_core::{Error, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{parse_base_url, read_json, ChatBackend, ChatMessage};

pub const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Anthropic Messages API backend.
pub struct AnthropicModel {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl AnthropicModel {
    pub fn new(api_key: String) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(Error::Config("Anthropic API key is required".to_string()));
        }
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key,
            base_url: ANTHROPIC_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
        })
    }

    pub fn with_base_url(mut self, url: &str) -> Result<Self> {
        self.base_url = parse_base_url(url)?;
        Ok(self)
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }
}

impl fmt::Debug for AnthropicModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnthropicModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait]
impl ChatBackend for AnthropicModel {
    fn name(&self) -> &str {
        "Anthropic"
    }

    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?;
        let body: MessagesResponse = read_json(self.name(), response).await?;

        let text = body
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");
        if text.trim().is_empty() {
            return Err(Error::Serialization("Anthropic reply had no text content".to_string()));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_support::serve;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    async fn messages(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        if headers.get("x-api-key").and_then(|v| v.to_str().ok()) != Some("test-key")
            || headers.get("anthropic-version").is_none()
        {
            return (StatusCode::UNAUTHORIZED, Json(json!({"error": "bad key"})));
        }
        let prompt = body["messages"][0]["content"].as_str().unwrap_or_default();
        let reply = json!({
            "content": [
                {"type": "text", "text": format!("echo: {} ", prompt)},
                {"type": "text", "text": body["model"]},
            ]
        });
        (StatusCode::OK, Json(reply))
    }

    #[tokio::test]
    async fn test_complete_sends_messages_request() {
        let base = serve(Router::new().route("/v1/messages", post(messages))).await;
        let model = AnthropicModel::new("test-key".to_string())
            .unwrap()
            .with_base_url(&base)
            .unwrap()
            .with_model("claude-test");

        let reply = model.complete("hello", 100).await.unwrap();
        assert_eq!(reply, "echo: hello claude-test");
    }

    #[tokio::test]
    async fn test_complete_reports_http_errors() {
        let base = serve(Router::new().route("/v1/messages", post(messages))).await;
        let model = AnthropicModel::new("wrong-key".to_string())
            .unwrap()
            .with_base_url(&base)
            .unwrap();

        let err = model.complete("hello", 100).await.unwrap_err();
        match err {
            Error::Http(message) => assert!(message.contains("401")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_requires_api_key() {
        assert!(AnthropicModel::new(String::new()).is_err());
        let printed = format!("{:?}", AnthropicModel::new("sk-secret".to_string()).unwrap());
        assert!(!printed.contains("sk-secret"));
    }
}
