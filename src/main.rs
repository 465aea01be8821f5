use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use iptv_media_source::{
    config::Config,
    services::{BrowseService, PlaylistCache},
    sources::{CatalogClient, HttpPlaylistFetcher},
    utils::url::UrlUtils,
    web::{AppState, WebServer},
};

#[derive(Parser)]
#[command(name = "iptv-media-source")]
#[command(version)]
#[command(about = "Browse IPTV M3U playlists as a two-level media tree")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Listening IP address
    #[arg(short = 'H', long, value_name = "IP")]
    host: Option<String>,

    /// Listening port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = if cli.log_level == "trace" {
        format!("iptv_media_source={},tower_http=trace", cli.log_level)
    } else {
        format!("iptv_media_source={}", cli.log_level)
    };
    let registry = tracing_subscriber::registry().with(
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| log_filter.into()),
    );
    if cli.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    info!("Starting IPTV Media Source v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_from_file(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config);

    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }

    let sources = config.resolve_sources()?;
    for source in &sources {
        info!(
            "Source '{}' ({}): {}",
            source.friendly_name,
            source.source_type,
            UrlUtils::obfuscate_credentials(&source.m3u_url)
        );
    }

    let fetcher = Arc::new(HttpPlaylistFetcher::from_config(&config.fetch)?);
    let cache = Arc::new(PlaylistCache::from_config(&config.cache));
    info!("Playlist cache TTL: {}s", cache.ttl().as_secs());

    let catalog_http = reqwest::Client::builder()
        .user_agent(config.fetch.user_agent.as_str())
        .timeout(config.fetch.timeout)
        .build()?;

    let state = AppState {
        browse: Arc::new(BrowseService::new(sources, cache, fetcher)),
        catalog: Arc::new(CatalogClient::new(catalog_http, config.catalog.clone())),
    };

    WebServer::new(&config.web, state)?.serve().await
}
