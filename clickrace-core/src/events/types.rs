//! Event type definitions.

use crate::participant::ParticipantId;

/// Inbound participation event from a connected client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipationEvent {
    /// A client connected and takes part in rounds from now on.
    Joined { participant: ParticipantId },
    /// A client disconnected.
    Left { participant: ParticipantId },
    /// A client clicked once.
    Clicked { participant: ParticipantId },
}
