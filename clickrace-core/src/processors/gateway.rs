//! ParticipationGateway processor.
//!
//! Translates inbound client events into [`TallyStore`] calls. It carries
//! no game logic of its own.

use crate::events::ParticipationEvent;
use crate::tally::{ClickResult, TallyStore};
use kanau::processor::Processor;
use std::convert::Infallible;
use tracing::debug;

/// Write path into the tally for connected clients.
#[derive(Debug, Clone)]
pub struct ParticipationGateway {
    tally: TallyStore,
}

impl ParticipationGateway {
    pub fn new(tally: TallyStore) -> Self {
        Self { tally }
    }

    pub fn tally(&self) -> &TallyStore {
        &self.tally
    }
}

impl Processor<ParticipationEvent> for ParticipationGateway {
    type Output = ();
    type Error = Infallible;

    async fn process(&self, event: ParticipationEvent) -> Result<(), Infallible> {
        match event {
            ParticipationEvent::Joined { participant } => {
                self.tally.join(participant).await;
                debug!(%participant, "Participant joined");
            }
            ParticipationEvent::Left { participant } => {
                let removed = self.tally.leave(participant).await;
                debug!(%participant, removed, "Participant left");
            }
            ParticipationEvent::Clicked { participant } => {
                if let ClickResult::UnknownParticipant = self.tally.record_click(participant).await {
                    debug!(%participant, "Ignoring click from participant not in the round");
                }
            }
        }
        Ok(())
    }
}
