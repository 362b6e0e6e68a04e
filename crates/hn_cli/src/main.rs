use clap::{Parser, ValueEnum};
use hn_inference::{ModelKind, DEFAULT_CONCURRENCY};
use hn_sources::{Feed, PipelineConfig, HN_API_BASE};

mod commands;

#[derive(Parser, Debug)]
#[command(
    name = "hn-digest",
    author,
    version,
    about = "AI-powered daily Hacker News digest in Chinese",
    long_about = None
)]
pub struct Cli {
    #[arg(
        long,
        env = "HN_DIGEST_MODEL",
        default_value = "anthropic",
        help = "Summarizer to use. Available models: anthropic (default), deepseek, dummy"
    )]
    model: ModelKind,
    /// API key for the summarizer (deepseek also reads DEEPSEEK_API_KEY)
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    /// Override the backend's model id
    #[arg(long, env = "HN_DIGEST_MODEL_NAME")]
    model_name: Option<String>,
    /// Override the backend's base URL
    #[arg(long, env = "HN_DIGEST_MODEL_URL")]
    model_url: Option<String>,
    /// Base URL of the Hacker News API
    #[arg(long, env = "HN_DIGEST_HN_URL", default_value = HN_API_BASE)]
    hn_url: String,
    /// Ranked list to read: top, best or show
    #[arg(long, env = "HN_DIGEST_FEED", default_value = "top")]
    feed: Feed,
    /// Stories pulled from the feed per build
    #[arg(long, env = "HN_DIGEST_FETCH_LIMIT", default_value_t = 30)]
    fetch_limit: usize,
    /// Summarization requests in flight at once
    #[arg(long, env = "HN_DIGEST_CONCURRENCY", default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Serve the digest over HTTP
    Serve {
        #[arg(long, env = "HN_DIGEST_HOST", default_value = "0.0.0.0")]
        host: String,
        #[arg(long, env = "PORT", default_value_t = 8080)]
        port: u16,
        /// Stories kept in each digest
        #[arg(long, env = "HN_DIGEST_MAX_STORIES", default_value_t = 10)]
        max_stories: usize,
        /// Keep cached digests for this many days (unbounded when unset)
        #[arg(long, env = "HN_DIGEST_RETENTION_DAYS")]
        retention_days: Option<u32>,
        /// Skip building today's digest at startup
        #[arg(long)]
        no_warmup: bool,
    },
    /// Print the current top stories
    Fetch {
        #[arg(short = 'n', long = "num", default_value_t = 10)]
        num: usize,
    },
    /// Build a digest once and print it
    Digest {
        #[arg(short = 'n', long = "num", default_value_t = 10)]
        num: usize,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Md)]
        format: OutputFormat,
    },
    /// Check connectivity to the Hacker News API
    Test,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Json,
    Md,
    Telegram,
}

impl Cli {
    fn inference_config(&self) -> hn_inference::Config {
        hn_inference::Config {
            model: self.model,
            api_key: self.api_key.clone(),
            model_name: self.model_name.clone(),
            model_url: self.model_url.clone(),
            concurrency: self.concurrency,
        }
    }

    fn pipeline_config(&self, max_stories: usize) -> PipelineConfig {
        PipelineConfig {
            fetch_limit: self.fetch_limit.max(max_stories),
            max_stories,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    hn_core::logging::init_logging();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Serve {
            host,
            port,
            max_stories,
            retention_days,
            no_warmup,
        } => {
            let options = commands::ServeOptions {
                host: host.clone(),
                port: *port,
                pipeline: cli.pipeline_config(*max_stories),
                retention_days: *retention_days,
                warmup: !no_warmup,
            };
            commands::serve(&cli, options).await
        }
        Commands::Fetch { num } => commands::fetch(&cli, *num).await,
        Commands::Digest { num, format } => {
            commands::digest(&cli, cli.pipeline_config(*num), *format).await
        }
        Commands::Test => commands::test_connection(&cli).await,
    }
}
