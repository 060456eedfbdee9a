//! Game client: leaderboard and round info over HTTP, the live round
//! stream over WebSocket.

use futures_util::{SinkExt, StreamExt};
use reqwest::Client;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;
use uuid::Uuid;

use super::ClientError;
use crate::objects::{LeaderboardEntry, RoundInfo, WsClientMessage, WsServerMessage};

/// Typed client for the Click Race HTTP API.
#[derive(Debug, Clone)]
pub struct GameClient {
    http: Client,
    base_url: Url,
}

impl GameClient {
    /// Create a new `GameClient` for the server rooted at `base_url`.
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `GET /leaderboard` – players ordered by number of round wins.
    pub async fn leaderboard(&self, limit: Option<u32>) -> Result<Vec<LeaderboardEntry>, ClientError> {
        let mut url = self.base_url.join("/leaderboard")?;
        if let Some(limit) = limit {
            url.query_pairs_mut().append_pair("limit", &limit.to_string());
        }
        let resp = self.http.get(url).send().await?;
        parse_response(resp).await
    }

    /// `GET /round` – state of the running round.
    pub async fn round_info(&self) -> Result<RoundInfo, ClientError> {
        let url = self.base_url.join("/round")?;
        let resp = self.http.get(url).send().await?;
        parse_response(resp).await
    }

    /// `GET /game/ws` – join the running round as `player`.
    ///
    /// The player takes part in rounds until the returned session is
    /// closed or dropped.
    pub async fn connect(&self, player: Uuid) -> Result<GameSession, ClientError> {
        let url = ws_url(&self.base_url, player)?;
        let (stream, _response) = connect_async(url.as_str()).await?;
        Ok(GameSession { stream })
    }
}

/// Map `http(s)://host/` to `ws(s)://host/game/ws?player={id}`.
fn ws_url(base_url: &Url, player: Uuid) -> Result<Url, ClientError> {
    let mut url = base_url.join("/game/ws")?;
    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => return Err(ClientError::UnsupportedScheme(other.to_owned())),
    };
    url.set_scheme(scheme)
        .map_err(|_| ClientError::UnsupportedScheme(scheme.to_owned()))?;
    url.query_pairs_mut()
        .append_pair("player", &player.to_string());
    Ok(url)
}

/// A live connection to the game stream.
pub struct GameSession {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl GameSession {
    /// Send one click for this player.
    pub async fn click(&mut self) -> Result<(), ClientError> {
        let json = serde_json::to_string(&WsClientMessage::Click)?;
        self.stream.send(Message::Text(json)).await?;
        Ok(())
    }

    /// Wait for the next server message.
    ///
    /// Returns `None` once the server has closed the connection. Control
    /// frames are skipped.
    pub async fn next_message(&mut self) -> Option<Result<WsServerMessage, ClientError>> {
        loop {
            let frame = match self.stream.next().await? {
                Ok(frame) => frame,
                Err(e) => return Some(Err(e.into())),
            };
            match frame {
                Message::Text(text) => {
                    return Some(serde_json::from_str(&text).map_err(ClientError::from));
                }
                Message::Close(_) => return None,
                _ => continue,
            }
        }
    }

    /// Leave the round and close the connection.
    pub async fn close(mut self) -> Result<(), ClientError> {
        self.stream.close(None).await?;
        Ok(())
    }
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::Api { status, body });
    }
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(ClientError::Json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ws_url_from_http_base() {
        let player = Uuid::nil();
        let url = ws_url(&Url::parse("http://localhost:8080").unwrap(), player).unwrap();
        assert_eq!(
            url.as_str(),
            "ws://localhost:8080/game/ws?player=00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_ws_url_from_https_base() {
        let url = ws_url(&Url::parse("https://race.example.com/").unwrap(), Uuid::nil()).unwrap();
        assert_eq!(url.scheme(), "wss");
        assert_eq!(url.path(), "/game/ws");
    }

    #[test]
    fn test_ws_url_rejects_other_schemes() {
        let result = ws_url(&Url::parse("ftp://example.com").unwrap(), Uuid::nil());
        assert!(matches!(result, Err(ClientError::UnsupportedScheme(_))));
    }
}
