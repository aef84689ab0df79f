use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use emote_proxy::{
    cache::{CacheLayer, memory::MemoryKvStore},
    config::Config,
    ingestor::BatchIngestor,
    sources::seventv::SevenTvClient,
    storage::{ContentStore, fs::FsBlobBackend},
    utils::StandardHttpClient,
    web::{self, AppState},
};

#[derive(Parser)]
#[command(name = "emote-proxy")]
#[command(version)]
#[command(about = "A 7TV emote search proxy with normalizing ingestion and blob storage")]
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
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = if cli.log_level == "trace" {
        format!("emote_proxy={},tower_http=trace", cli.log_level)
    } else {
        format!("emote_proxy={}", cli.log_level)
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Emote Proxy v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_from_file(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config);

    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }

    let backend = FsBlobBackend::new(&config.storage.root_dir, &config.storage.public_base_url);
    let store = ContentStore::new(Arc::new(backend));
    info!("Blob storage root: {}", config.storage.root_dir.display());

    let cache = CacheLayer::new(Arc::new(MemoryKvStore::new()));

    let directory = Arc::new(SevenTvClient::new(&config.upstream));
    let http = Arc::new(StandardHttpClient::with_connect_timeout(
        config.upstream.connect_timeout,
    ));
    let ingestor = Arc::new(BatchIngestor::new(http, store.clone(), &config.ingest));

    let state = AppState::new(&config, directory, ingestor, store, cache);

    let addr: SocketAddr = format!("{}:{}", config.web.host, config.web.port).parse()?;
    web::serve(addr, state).await
}
