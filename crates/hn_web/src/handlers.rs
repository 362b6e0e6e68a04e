use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse},
    Json,
};
use chrono::Utc;
use hn_core::format::{to_json, to_markdown, to_telegram_html, DigestJson};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::{ApiError, AppState};

pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "HN Digest",
        "description": "AI-powered daily Hacker News digest in Chinese",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "/digest": "Get today's digest (JSON)",
            "/digest/markdown": "Get today's digest (Markdown)",
            "/digest/telegram": "Get today's digest (Telegram HTML)",
            "/digest/refresh": "Force refresh today's digest (POST)",
            "/health": "Liveness probe",
        }
    }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "timestamp": Utc::now().to_rfc3339() }))
}

pub async fn get_digest(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DigestJson>, ApiError> {
    let digest = state.cache.get_or_build(state.today()).await?;
    Ok(Json(to_json(&digest)))
}

pub async fn get_digest_markdown(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let digest = state.cache.get_or_build(state.today()).await?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        to_markdown(&digest),
    ))
}

pub async fn get_digest_telegram(
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, ApiError> {
    let digest = state.cache.get_or_build(state.today()).await?;
    Ok(Html(to_telegram_html(&digest)))
}

pub async fn refresh_digest(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DigestJson>, ApiError> {
    let digest = state.cache.refresh(state.today()).await?;
    Ok(Json(to_json(&digest)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_app;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use chrono::{DateTime, NaiveDate};
    use hn_core::{
        Category, Digest, DigestBuilder, DigestEntry, Error, Importance, StoryItem, StorySummary,
    };
    use hn_storage::DigestCache;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    struct FakeBuilder {
        calls: AtomicUsize,
        error: Option<Error>,
    }

    impl FakeBuilder {
        fn ok() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                error: None,
            }
        }

        fn failing(error: Error) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                error: Some(error),
            }
        }
    }

    #[async_trait]
    impl DigestBuilder for FakeBuilder {
        async fn build(&self, date: NaiveDate) -> hn_core::Result<Digest> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(err) = &self.error {
                return Err(err.clone());
            }
            let entry = DigestEntry {
                story: StoryItem {
                    id: 42,
                    title: "Rust & <friends>".to_string(),
                    url: Some("https://example.com/rust".to_string()),
                    score: 256,
                    comment_count: 64,
                    author: "ferris".to_string(),
                    source_timestamp: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
                    text: None,
                },
                summary: StorySummary {
                    story_id: 42,
                    summary_zh: "关于 Rust 的讨论。".to_string(),
                    category: Category::Programming,
                    importance: Importance::new(5).unwrap(),
                },
            };
            Ok(Digest::new(date, format!("第 {} 次生成", n), vec![entry]))
        }
    }

    fn fixed_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn app(builder: Arc<FakeBuilder>) -> Router {
        let cache = Arc::new(DigestCache::new(builder));
        create_app(AppState::new(cache).with_clock(fixed_day))
    }

    async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, String, Option<String>) {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap(), content_type)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = app(Arc::new(FakeBuilder::ok()));
        let (status, body, _) = send(&app, "GET", "/health").await;

        assert_eq!(status, StatusCode::OK);
        let value: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["status"], "ok");
        assert!(value["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_root_lists_endpoints() {
        let app = app(Arc::new(FakeBuilder::ok()));
        let (status, body, _) = send(&app, "GET", "/").await;

        assert_eq!(status, StatusCode::OK);
        let value: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["name"], "HN Digest");
        assert!(value["endpoints"]["/digest/refresh"].is_string());
    }

    #[tokio::test]
    async fn test_digest_is_built_once_and_cached() {
        let builder = Arc::new(FakeBuilder::ok());
        let app = app(builder.clone());

        let (status, body, _) = send(&app, "GET", "/digest").await;
        assert_eq!(status, StatusCode::OK);
        let digest: DigestJson = serde_json::from_str(&body).unwrap();
        assert_eq!(digest.date, fixed_day());
        assert_eq!(digest.intro, "第 1 次生成");
        assert_eq!(digest.stories[0].title, "Rust & <friends>");
        assert_eq!(digest.stories[0].comments, 64);

        send(&app, "GET", "/digest/markdown").await;
        send(&app, "GET", "/digest/telegram").await;
        assert_eq!(builder.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refresh_rebuilds_todays_digest() {
        let builder = Arc::new(FakeBuilder::ok());
        let app = app(builder.clone());

        send(&app, "GET", "/digest").await;
        let (status, body, _) = send(&app, "POST", "/digest/refresh").await;
        assert_eq!(status, StatusCode::OK);
        let refreshed: DigestJson = serde_json::from_str(&body).unwrap();
        assert_eq!(refreshed.intro, "第 2 次生成");

        let (_, body, _) = send(&app, "GET", "/digest").await;
        let current: DigestJson = serde_json::from_str(&body).unwrap();
        assert_eq!(current.intro, "第 2 次生成");
        assert_eq!(builder.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_refresh_requires_post() {
        let app = app(Arc::new(FakeBuilder::ok()));
        let (status, _, _) = send(&app, "GET", "/digest/refresh").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_markdown_and_telegram_formats() {
        let app = app(Arc::new(FakeBuilder::ok()));

        let (status, body, content_type) = send(&app, "GET", "/digest/markdown").await;
        assert_eq!(status, StatusCode::OK);
        assert!(content_type.unwrap().starts_with("text/plain"));
        assert!(body.starts_with("# 🍊 HN 每日精选 | 2024-05-01"));

        let (status, body, content_type) = send(&app, "GET", "/digest/telegram").await;
        assert_eq!(status, StatusCode::OK);
        assert!(content_type.unwrap().starts_with("text/html"));
        assert!(body.contains("Rust &amp; &lt;friends&gt;"));
    }

    #[tokio::test]
    async fn test_upstream_failure_is_bad_gateway() {
        let app = app(Arc::new(FakeBuilder::failing(Error::UpstreamUnavailable(
            "connection refused".to_string(),
        ))));

        let (status, body, _) = send(&app, "GET", "/digest").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let value: Value = serde_json::from_str(&body).unwrap();
        assert!(value["error"].as_str().unwrap().contains("unavailable"));
    }

    #[tokio::test]
    async fn test_build_failure_is_service_unavailable() {
        let app = app(Arc::new(FakeBuilder::failing(Error::DigestBuildFailed(
            "no story could be summarized".to_string(),
        ))));

        let (status, body, _) = send(&app, "POST", "/digest/refresh").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body.contains("no story could be summarized"));
    }
}
