//! Leaderboard types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One row of `GET /leaderboard`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub user_id: Uuid,
    pub user_name: String,
    pub nb_wins: i64,
}

/// Query string of `GET /leaderboard`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LeaderboardQuery {
    /// Maximum number of rows (default 10, capped at 100 by the server).
    pub limit: Option<u32>,
}
