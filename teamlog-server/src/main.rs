use std::sync::Arc;

use clap::Parser;
use teamlog_core::config::DatabaseConfig;
use teamlog_core::TeamLogConfig;
use tokio::sync::broadcast;
use tracing_subscriber::{fmt, EnvFilter};

use teamlog_server::http::{self, HttpState};
use teamlog_server::subsystems::notify;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "teamlog.toml")]
    config: String,

    /// Check store connectivity and exit
    #[arg(long)]
    health: bool,

    /// Use the in-memory store regardless of `database.url`
    #[arg(long)]
    memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (dev convenience — production uses real env vars)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Load config
    let mut config = match TeamLogConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", args.config, e);
            std::process::exit(1);
        }
    };

    // Init logging; RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.service.log_level));
    fmt().with_env_filter(filter).init();

    if args.memory {
        config.database = DatabaseConfig::memory();
    }

    // Pool is created lazily; nothing connects until the first request
    let store = match teamlog_core::open_store(&config.database) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to open record store: {}", e);
            std::process::exit(1);
        }
    };

    if args.health {
        match store.health().await {
            Ok(v) => println!("✅ {} store reachable: {}", store.backend(), v),
            Err(e) => {
                println!("❌ {} store check failed: {}", store.backend(), e);
                std::process::exit(1);
            }
        }
        store.close().await;
        return Ok(());
    }

    let (tx, _rx) = broadcast::channel(1);
    let shutdown_tx = tx.clone();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(());
    });

    let state = Arc::new(HttpState {
        store: Arc::clone(&store),
        notifier: notify::notifier_from_config(&config.webhook),
    });

    tracing::info!(backend = store.backend(), "Starting team log service");
    let served = http::start_http_server(state, &config.http, tx.subscribe()).await;

    store.close().await;
    served
}
