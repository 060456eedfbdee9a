//! Game API handlers.
//!
//! # Endpoints
//!
//! - `GET /game/ws?player={user_id}` – WebSocket: join the round, send clicks, receive results
//! - `GET /leaderboard`              – players ordered by number of wins
//! - `GET /round`                    – state of the running round

use axum::{Router, http::StatusCode, response::IntoResponse, routing::get};

use crate::state::AppState;

pub use connections::PlayerConnections;

mod connections;
mod leaderboard;
mod round;
mod ws;

/// Build the Game API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/game/ws", get(ws::game_ws))
        .route("/leaderboard", get(leaderboard::get_leaderboard))
        .route("/round", get(round::get_round))
}

// ---------------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------------

/// Errors that can occur in Game API handlers.
#[derive(Debug)]
enum GameApiError {
    /// A database query failed.
    Database(sqlx::Error),
    /// The player passed to the WebSocket endpoint does not exist.
    PlayerNotFound,
}

impl IntoResponse for GameApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            GameApiError::Database(e) => {
                tracing::error!(error = %e, "Game API database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
            GameApiError::PlayerNotFound => {
                (StatusCode::NOT_FOUND, "player not found").into_response()
            }
        }
    }
}
