use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use clickrace_core::entities::players::GetLeaderboard;
use clickrace_sdk::objects::{LeaderboardEntry, LeaderboardQuery};
use kanau::processor::Processor;

use super::GameApiError;
use crate::state::AppState;

const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 100;

/// `GET /leaderboard` — players with the most round wins.
pub(super) async fn get_leaderboard(
    state: State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<impl IntoResponse, GameApiError> {
    let limit = effective_limit(query.limit);

    let players = state
        .processor()
        .process(GetLeaderboard {
            limit: i64::from(limit),
        })
        .await
        .map_err(GameApiError::Database)?;

    let entries: Vec<LeaderboardEntry> = players
        .into_iter()
        .map(|p| LeaderboardEntry {
            user_id: p.user_id,
            user_name: p.user_name,
            nb_wins: p.nb_wins,
        })
        .collect();

    Ok(Json(entries))
}

fn effective_limit(requested: Option<u32>) -> u32 {
    requested.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}
