//! kisa command-line entry point.

use std::path::Path;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use kisa::{Client, QueryParams, StreamEndpoint, StreamEvent};
use kisa_common::{Config, Overrides};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const CONFIG_DIR: &str = "config";

#[derive(Debug, Parser)]
#[command(name = "kisa", version, about = "Client for Mastodon-compatible servers")]
struct Arguments {
    /// Base URL of the instance. Overrides `server.url`.
    #[arg(long, global = true)]
    url: Option<String>,

    /// Access token. Overrides `server.access_token`.
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print events from a streaming feed, one per line.
    Stream {
        /// user, health, notification, public, public-local or public-remote
        endpoint: StreamEndpoint,
    },
    /// Fetch statuses carrying a hashtag.
    Tag(TagArgs),
    /// Boost a status.
    Boost {
        status_id: String,
        #[arg(long, default_value = "public")]
        visibility: String,
    },
    /// Favourite a status.
    Favourite { status_id: String },
}

#[derive(Debug, Args)]
struct TagArgs {
    hashtag: String,
    #[arg(long)]
    any: Vec<String>,
    #[arg(long)]
    all: Vec<String>,
    #[arg(long)]
    none: Vec<String>,
    #[arg(long)]
    local: bool,
    #[arg(long)]
    remote: bool,
    #[arg(long)]
    only_media: bool,
    #[arg(long)]
    max_id: Option<String>,
    #[arg(long)]
    since_id: Option<String>,
    #[arg(long)]
    min_id: Option<String>,
    #[arg(long)]
    limit: Option<u32>,
}

impl TagArgs {
    fn query_params(&self) -> QueryParams {
        let mut params = QueryParams::new();

        for (key, values) in [("any", &self.any), ("all", &self.all), ("none", &self.none)] {
            if !values.is_empty() {
                params.insert(key, values.clone());
            }
        }
        for (key, flag) in [
            ("local", self.local),
            ("remote", self.remote),
            ("only_media", self.only_media),
        ] {
            if flag {
                params.insert(key, true);
            }
        }
        for (key, id) in [
            ("max_id", &self.max_id),
            ("since_id", &self.since_id),
            ("min_id", &self.min_id),
        ] {
            if let Some(id) = id {
                params.insert(key, id.as_str());
            }
        }
        if let Some(limit) = self.limit {
            params.insert("limit", limit);
        }

        params
    }
}

/// Load configuration from `dir`, with `--url` and `--token` taking precedence.
fn load_config(args: &Arguments, dir: &Path) -> anyhow::Result<Config> {
    let overrides = Overrides {
        url: args.url.clone(),
        access_token: args.token.clone(),
    };

    Config::load_with(dir, &overrides)
        .context("failed to load configuration; set KISA__SERVER__URL or pass --url")
}

fn print_event(event: StreamEvent) {
    println!("{}\t{}", event.event, event.data);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kisa=info".into()),
        )
        .init();

    let args = Arguments::parse();
    let config = load_config(&args, Path::new(CONFIG_DIR))?;
    let client = Client::from_config(&config)?;

    match args.command {
        Command::Stream { endpoint } => {
            tokio::select! {
                result = client.open_stream(endpoint, Some(print_event)) => result?,
                _ = signal::ctrl_c() => info!("Received SIGINT, closing stream"),
            }
        }
        Command::Tag(tag) => {
            let statuses = client
                .hashtag_timeline(&tag.hashtag, &tag.query_params())
                .await?;
            println!("{}", serde_json::to_string_pretty(&statuses)?);
        }
        Command::Boost {
            status_id,
            visibility,
        } => {
            let status = client.boost_with_visibility(&status_id, &visibility).await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Command::Favourite { status_id } => {
            let status = client.favourite(&status_id).await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
    }

    Ok(())
}
