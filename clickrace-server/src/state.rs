//! Application state shared across all request handlers.

use crate::api::game::PlayerConnections;
use clickrace_core::config::{ConfigStore, GameConfig};
use clickrace_core::events::EndRoundSender;
use clickrace_core::framework::DatabaseProcessor;
use clickrace_core::processors::ParticipationGateway;
use clickrace_core::tally::TallyStore;
use sqlx::PgPool;
use tokio::sync::watch;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: PgPool,
    /// Write path into the running round's tally.
    pub gateway: ParticipationGateway,
    /// Open sockets per player; decides when a player joins or leaves.
    pub connections: PlayerConnections,
    /// Round results; every WebSocket subscribes its own receiver.
    pub end_round_tx: EndRoundSender,
    /// Game configuration (can be reloaded via SIGHUP).
    pub game_config: ConfigStore<GameConfig>,
    /// Flips to `true` when the server is shutting down.
    pub shutdown_rx: watch::Receiver<bool>,
}

impl AppState {
    pub fn new(
        db: PgPool,
        gateway: ParticipationGateway,
        end_round_tx: EndRoundSender,
        game_config: ConfigStore<GameConfig>,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            db,
            connections: PlayerConnections::new(gateway.clone()),
            gateway,
            end_round_tx,
            game_config,
            shutdown_rx,
        }
    }

    pub fn processor(&self) -> DatabaseProcessor {
        DatabaseProcessor {
            pool: self.db.clone(),
        }
    }

    pub fn tally(&self) -> &TallyStore {
        self.gateway.tally()
    }
}
