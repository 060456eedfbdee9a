//! Open WebSocket connections per player.
//!
//! A player may have several sockets open at once. The tally only sees
//! the first connect and the last disconnect, so closing one tab does not
//! drop a player who is still connected elsewhere.

use clickrace_core::events::ParticipationEvent;
use clickrace_core::participant::ParticipantId;
use clickrace_core::processors::ParticipationGateway;
use kanau::processor::Processor;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
pub struct PlayerConnections {
    gateway: ParticipationGateway,
    open: Arc<Mutex<HashMap<ParticipantId, usize>>>,
}

impl PlayerConnections {
    pub fn new(gateway: ParticipationGateway) -> Self {
        Self {
            gateway,
            open: Arc::default(),
        }
    }

    /// Register one more socket for `participant`, joining the round on
    /// the first. Returns the number of sockets now open.
    pub async fn connect(&self, participant: ParticipantId) -> usize {
        // The gateway call stays under the lock so a concurrent
        // disconnect cannot reorder Joined and Left.
        let mut open = self.open.lock().await;
        let count = open.entry(participant).or_insert(0);
        *count += 1;
        let count = *count;
        if count == 1 {
            let _ = self
                .gateway
                .process(ParticipationEvent::Joined { participant })
                .await;
        }
        count
    }

    /// Release one socket for `participant`, leaving the round on the
    /// last. Returns the number of sockets still open.
    pub async fn disconnect(&self, participant: ParticipantId) -> usize {
        let mut open = self.open.lock().await;
        let Some(count) = open.get_mut(&participant) else {
            return 0;
        };
        *count -= 1;
        let remaining = *count;
        if remaining == 0 {
            open.remove(&participant);
            let _ = self
                .gateway
                .process(ParticipationEvent::Left { participant })
                .await;
        }
        remaining
    }
}
