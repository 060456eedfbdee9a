use axum::{Json, extract::State, response::IntoResponse};
use clickrace_sdk::objects::RoundInfo;

use crate::state::AppState;

/// `GET /round` — participants in the running round and its length.
pub(super) async fn get_round(state: State<AppState>) -> impl IntoResponse {
    let participants = state.tally().participant_count().await;
    let game_config = state.game_config.current().await;

    Json(RoundInfo {
        participants,
        round_interval_ms: game_config.round_interval_ms(),
    })
}
