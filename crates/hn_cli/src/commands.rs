use std::sync::Arc;

use anyhow::Context;
use hn_core::format::{to_json_string, to_markdown, to_telegram_html};
use hn_core::{today, DigestBuilder, StorySource, Summarizer};
use hn_sources::{DigestPipeline, HackerNewsSource, PipelineConfig};
use hn_storage::DigestCache;
use hn_web::{create_app, AppState};
use tracing::{info, warn};

use crate::{Cli, OutputFormat};

pub struct ServeOptions {
    pub host: String,
    pub port: u16,
    pub pipeline: PipelineConfig,
    pub retention_days: Option<u32>,
    pub warmup: bool,
}

fn story_source(cli: &Cli) -> anyhow::Result<HackerNewsSource> {
    let source = HackerNewsSource::new()?
        .with_base_url(&cli.hn_url)?
        .with_feed(cli.feed);
    Ok(source)
}

fn pipeline(cli: &Cli, config: PipelineConfig) -> anyhow::Result<DigestPipeline> {
    let source = Arc::new(story_source(cli)?);
    let summarizer = hn_inference::create_model(&cli.inference_config())
        .context("failed to initialize the summarizer")?;
    info!("🧠 Summarizer initialized (using {})", summarizer.name());
    Ok(DigestPipeline::new(source, summarizer).with_config(config))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("👋 HN Digest shutting down");
}

pub async fn serve(cli: &Cli, options: ServeOptions) -> anyhow::Result<()> {
    info!("🍊 HN Digest starting up...");
    let pipeline = pipeline(cli, options.pipeline)?;

    let mut cache = DigestCache::new(Arc::new(pipeline));
    if let Some(days) = options.retention_days {
        cache = cache.with_retention_days(days);
    }
    let cache = Arc::new(cache);

    if options.warmup {
        let cache = cache.clone();
        tokio::spawn(async move {
            match cache.get_or_build(today()).await {
                Ok(digest) => info!("✅ Initial digest generated: {} stories", digest.story_count()),
                Err(e) => warn!("⚠️ Failed to generate initial digest: {}", e),
            }
        });
    }

    let app = create_app(AppState::new(cache));
    let addr = format!("{}:{}", options.host, options.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("🌐 Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    Ok(())
}

pub async fn fetch(cli: &Cli, num: usize) -> anyhow::Result<()> {
    let stories = story_source(cli)?.fetch_top_stories(num).await?;
    for story in stories {
        println!("[{:4}] {}", story.score, story.title);
        println!("       {}", story.link());
        println!();
    }
    Ok(())
}

pub async fn digest(cli: &Cli, config: PipelineConfig, format: OutputFormat) -> anyhow::Result<()> {
    let digest = pipeline(cli, config)?.build(today()).await?;
    let rendered = match format {
        OutputFormat::Json => to_json_string(&digest)?,
        OutputFormat::Md => to_markdown(&digest),
        OutputFormat::Telegram => to_telegram_html(&digest),
    };
    println!("{}", rendered);
    Ok(())
}

pub async fn test_connection(cli: &Cli) -> anyhow::Result<()> {
    println!("🧪 Testing Hacker News API connection...");
    let stories = story_source(cli)?.fetch_top_stories(5).await?;
    println!("✅ Successfully fetched {} stories", stories.len());
    println!("\nTop {}:", stories.len());
    for story in stories {
        println!("  - {} ({} points)", story.title, story.score);
    }
    Ok(())
}
