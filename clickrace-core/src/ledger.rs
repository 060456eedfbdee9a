//! Win crediting and display-name lookup.
//!
//! The scheduler talks to persistence only through [`WinLedger`], so it
//! can run against Postgres in production and against an in-memory fake
//! in tests.

use crate::entities::players::{GetPlayerById, IncrementWinCount};
use crate::framework::DatabaseProcessor;
use crate::participant::ParticipantId;
use async_trait::async_trait;
use kanau::processor::Processor;
use sqlx::PgPool;
use thiserror::Error;

/// Errors that can occur while crediting a win or looking up a name.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// No player row exists for this participant
    #[error("player not found: {0}")]
    PlayerNotFound(ParticipantId),
}

/// Persistence collaborator of the round scheduler.
#[async_trait]
pub trait WinLedger: Send + Sync {
    /// Add one win to `participant`.
    async fn increment_win_count(&self, participant: ParticipantId) -> Result<(), LedgerError>;

    /// Display name shown to clients, or `None` if the player is unknown.
    async fn display_name_of(
        &self,
        participant: ParticipantId,
    ) -> Result<Option<String>, LedgerError>;
}

/// [`WinLedger`] backed by the `players` table.
#[derive(Debug, Clone)]
pub struct PgWinLedger {
    processor: DatabaseProcessor,
}

impl PgWinLedger {
    pub fn new(pool: PgPool) -> Self {
        Self {
            processor: DatabaseProcessor { pool },
        }
    }
}

#[async_trait]
impl WinLedger for PgWinLedger {
    async fn increment_win_count(&self, participant: ParticipantId) -> Result<(), LedgerError> {
        let updated = self
            .processor
            .process(IncrementWinCount {
                user_id: participant.as_uuid(),
            })
            .await?;
        if updated == 0 {
            return Err(LedgerError::PlayerNotFound(participant));
        }
        Ok(())
    }

    async fn display_name_of(
        &self,
        participant: ParticipantId,
    ) -> Result<Option<String>, LedgerError> {
        let player = self
            .processor
            .process(GetPlayerById {
                user_id: participant.as_uuid(),
            })
            .await?;
        Ok(player.map(|p| p.user_name))
    }
}
