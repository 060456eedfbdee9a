//! Round outcome computation.

use crate::participant::ParticipantId;
use crate::tally::TallySnapshot;
use std::num::NonZeroU64;

/// Outcome of a closed round.
///
/// "Nobody clicked" is its own state rather than an empty winner list, so
/// a winning count of 0 cannot be paired with winners and vice versa.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
    /// No participant clicked during the round (or nobody joined).
    NoParticipation,
    /// One or more participants reached the highest count.
    Winners {
        /// Every participant tied at `winning_count`, sorted and unique.
        winners: Vec<ParticipantId>,
        winning_count: NonZeroU64,
    },
}

impl RoundOutcome {
    /// Winners of the round; empty for [`RoundOutcome::NoParticipation`].
    pub fn winners(&self) -> &[ParticipantId] {
        match self {
            RoundOutcome::NoParticipation => &[],
            RoundOutcome::Winners { winners, .. } => winners,
        }
    }

    pub fn winning_count(&self) -> u64 {
        match self {
            RoundOutcome::NoParticipation => 0,
            RoundOutcome::Winners { winning_count, .. } => winning_count.get(),
        }
    }

    pub fn is_no_participation(&self) -> bool {
        matches!(self, RoundOutcome::NoParticipation)
    }
}

/// Compute the outcome of a round from its final tally.
///
/// Every participant sharing the highest non-zero count wins; there is no
/// tie-break.
pub fn resolve(snapshot: &TallySnapshot) -> RoundOutcome {
    let Some(winning_count) = snapshot
        .iter()
        .map(|(_, count)| count)
        .max()
        .and_then(NonZeroU64::new)
    else {
        return RoundOutcome::NoParticipation;
    };

    let mut winners: Vec<ParticipantId> = snapshot
        .iter()
        .filter(|(_, count)| *count == winning_count.get())
        .map(|(id, _)| id)
        .collect();
    winners.sort_unstable();

    RoundOutcome::Winners {
        winners,
        winning_count,
    }
}
