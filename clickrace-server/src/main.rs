//! Click Race Server
//!
//! Runs fixed-length click rounds: players connect over WebSocket, click
//! during the round, and every round close credits the winners and pushes
//! the result to everyone connected.

mod api;
mod config;
mod server;
mod shutdown;
mod state;

use clap::Parser;
use clickrace_core::config::ConfigStore;
use clickrace_core::events::{ChannelBroadcaster, end_round_channel};
use clickrace_core::ledger::PgWinLedger;
use clickrace_core::processors::{ParticipationGateway, RoundScheduler};
use clickrace_core::tally::TallyStore;
use config::{ConfigLoader, get_database_url};
use server::{build_router, run_server};
use shutdown::spawn_config_reload_handler;
use sqlx::postgres::PgPoolOptions;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Click Race - timed click competition server
#[derive(Parser, Debug)]
#[command(name = "clickrace-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./clickrace-config.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Run database migrations on startup
    #[arg(long, default_value = "false")]
    migrate: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();

    tracing::info!("Starting clickrace-server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_loader = Arc::new(ConfigLoader::new(&args.config, args.listen));
    let loaded_config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;

    let listen_addr = loaded_config.server.listen;
    tracing::info!("Configuration loaded from {:?}", args.config);

    let game_config = ConfigStore::new(loaded_config.game);

    let database_url = get_database_url().map_err(|e| {
        tracing::error!("DATABASE_URL environment variable not set");
        e
    })?;

    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .map_err(|e| {
            tracing::error!("Failed to connect to database: {}", e);
            e
        })?;
    tracing::info!("Database connection established");

    if args.migrate {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("../migrations")
            .run(&db_pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to run migrations: {}", e);
                e
            })?;
        tracing::info!("Migrations completed successfully");
    }

    // Game engine
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (end_round_tx, _) = end_round_channel();
    let tally = TallyStore::new();
    let gateway = ParticipationGateway::new(tally.clone());

    let scheduler = RoundScheduler::new(
        tally,
        PgWinLedger::new(db_pool.clone()),
        ChannelBroadcaster::new(end_round_tx.clone()),
        game_config.clone(),
    );
    let scheduler_handle = tokio::spawn(scheduler.run(shutdown_rx.clone()));

    let state = AppState::new(
        db_pool.clone(),
        gateway,
        end_round_tx,
        game_config.clone(),
        shutdown_rx,
    );

    // Spawn config reload handler (listens for SIGHUP)
    let shutdown_notify = spawn_config_reload_handler(config_loader, game_config);

    let router = build_router(state);

    tracing::info!("Starting HTTP server on {}", listen_addr);
    let result = run_server(router, listen_addr, shutdown_tx.clone()).await;

    // Stop the round loop even if the server failed to start.
    shutdown_tx.send_replace(true);
    if let Err(e) = scheduler_handle.await {
        tracing::error!("Round scheduler task failed: {}", e);
    }

    shutdown_notify.notify_one();

    tracing::info!("Closing database connections...");
    db_pool.close().await;
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
