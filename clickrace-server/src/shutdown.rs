//! Signal handling for graceful shutdown and config reload.

use crate::config::ConfigLoader;
use clickrace_core::config::{ConfigStore, GameConfig};
use std::sync::Arc;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::{Notify, watch};

/// Creates a future that completes when a shutdown signal is received.
///
/// Listens for SIGTERM and SIGINT (Ctrl+C), then flips `shutdown_tx` so
/// the round scheduler and open WebSockets stop too.
pub async fn shutdown_signal(shutdown_tx: watch::Sender<bool>) {
    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");

    tokio::select! {
        _ = sigterm.recv() => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
        _ = sigint.recv() => {
            tracing::info!("Received SIGINT, initiating graceful shutdown");
        }
    }

    shutdown_tx.send_replace(true);
}

/// Spawns a task that listens for SIGHUP and reloads the configuration.
///
/// Only the game section is applied at runtime; a new round interval
/// reschedules the round that is currently running. Returns a Notify used
/// to stop the handler.
pub fn spawn_config_reload_handler(
    config_loader: Arc<ConfigLoader>,
    game_config: ConfigStore<GameConfig>,
) -> Arc<Notify> {
    let shutdown_notify = Arc::new(Notify::new());
    let shutdown_notify_clone = shutdown_notify.clone();

    tokio::spawn(async move {
        let mut sighup = signal(SignalKind::hangup()).expect("failed to install SIGHUP handler");

        loop {
            tokio::select! {
                _ = sighup.recv() => {
                    tracing::info!("Received SIGHUP, reloading configuration");
                    match config_loader.reload() {
                        Ok(loaded_config) => {
                            game_config.update(loaded_config.game).await;
                            tracing::info!(
                                round_interval_ms = loaded_config.game.round_interval_ms(),
                                "Configuration reloaded successfully"
                            );
                        }
                        Err(e) => {
                            tracing::error!("Failed to reload configuration: {}", e);
                        }
                    }
                }
                _ = shutdown_notify_clone.notified() => {
                    tracing::debug!("Config reload handler shutting down");
                    break;
                }
            }
        }
    });

    shutdown_notify
}
