use axum::{
    extract::{
        Query, State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use clickrace_core::entities::players::GetPlayerById;
use clickrace_core::events::ParticipationEvent;
use clickrace_core::participant::ParticipantId;
use clickrace_sdk::objects::{WsClientMessage, WsCloseCode, WsServerMessage};
use kanau::processor::Processor;
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use super::GameApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub(super) struct GameWsParams {
    player: Uuid,
}

/// `GET /game/ws?player={user_id}` — WebSocket game stream.
///
/// The player must exist; unknown players are rejected with 404 before
/// the upgrade. Once upgraded, the player is part of every round until
/// the connection closes.
pub(super) async fn game_ws(
    state: State<AppState>,
    Query(params): Query<GameWsParams>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, GameApiError> {
    let player = state
        .processor()
        .process(GetPlayerById {
            user_id: params.player,
        })
        .await
        .map_err(GameApiError::Database)?
        .ok_or(GameApiError::PlayerNotFound)?;

    let app_state = state.0.clone();
    let participant = ParticipantId::from(player.user_id);
    Ok(ws.on_upgrade(move |socket| handle_game_ws(socket, app_state, participant)))
}

/// Background task that drives a single WebSocket connection.
///
/// 1. Joins the participant to the running round, unless another socket
///    for the same player already did.
/// 2. Forwards every `EndRound` result to the client and every `Click`
///    frame to the tally.
/// 3. Removes the participant once its last socket closes.
async fn handle_game_ws(mut socket: WebSocket, state: AppState, participant: ParticipantId) {
    // Subscribe before joining so the first round result after the join
    // is never missed.
    let mut end_round_rx = state.end_round_tx.subscribe();
    let mut shutdown_rx = state.shutdown_rx.clone();
    let sockets = state.connections.connect(participant).await;
    tracing::info!(%participant, sockets, "WS: player connected");

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => {
                let _ = socket
                    .send(Message::Close(Some(CloseFrame {
                        code: WsCloseCode::NORMAL,
                        reason: "server shutting down".into(),
                    })))
                    .await;
                break;
            }

            result = end_round_rx.recv() => {
                match result {
                    Ok(payload) => {
                        let msg = WsServerMessage::EndRound(payload);
                        if send_json(&mut socket, &msg).await.is_err() {
                            tracing::warn!(%participant, "WS: failed to deliver EndRound, dropping connection");
                            break;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        tracing::warn!(
                            %participant,
                            skipped = n,
                            "WS: broadcast receiver lagged, skipping old results"
                        );
                    }
                    Err(RecvError::Closed) => {
                        break;
                    }
                }
            }

            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<WsClientMessage>(text.as_str()) {
                            Ok(WsClientMessage::Click) => {
                                let _ = state
                                    .gateway
                                    .process(ParticipationEvent::Clicked { participant })
                                    .await;
                            }
                            Err(e) => {
                                tracing::debug!(%participant, error = %e, "WS: invalid client message");
                                let msg = WsServerMessage::Error {
                                    code: WsCloseCode::INVALID_MESSAGE,
                                    reason: "invalid message".into(),
                                };
                                if send_json(&mut socket, &msg).await.is_err() {
                                    break;
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::debug!(%participant, error = %e, "WS: receive error");
                        break;
                    }
                }
            }
        }
    }

    let sockets = state.connections.disconnect(participant).await;
    tracing::info!(%participant, sockets, "WS: player disconnected");
}

/// Serialize `value` as JSON and send it as a text WebSocket frame.
///
/// Returns `Err(())` if the send fails (client disconnected).
async fn send_json<T: serde::Serialize>(socket: &mut WebSocket, value: &T) -> Result<(), ()> {
    let json = serde_json::to_string(value).map_err(|_| ())?;
    socket
        .send(Message::Text(json.into()))
        .await
        .map_err(|_| ())
}
