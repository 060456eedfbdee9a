//! Click tally for the running round.
//!
//! [`TallyStore`] is the only shared mutable state of the game. Every
//! mutation (join, leave, click) and the round-close snapshot go through
//! the same mutex, so a snapshot is a clean cut: a click either lands in
//! the round being closed or in the next one, never both and never
//! neither.

use crate::participant::ParticipantId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Result of [`TallyStore::record_click`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickResult {
    /// The click was counted; carries the participant's new count.
    Counted(u64),
    /// The participant has not joined (or already left). The click is
    /// dropped and nothing is inserted.
    UnknownParticipant,
}

/// Shared handle to the per-round click counters.
///
/// Cloning is cheap and every clone points at the same tally.
#[derive(Debug, Clone, Default)]
pub struct TallyStore {
    counts: Arc<Mutex<HashMap<ParticipantId, u64>>>,
}

impl TallyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a participant with a count of 0.
    ///
    /// Joining again while already present resets the count to 0.
    pub async fn join(&self, participant: ParticipantId) {
        self.counts.lock().await.insert(participant, 0);
    }

    /// Remove a participant. Returns `false` if it was not present.
    pub async fn leave(&self, participant: ParticipantId) -> bool {
        self.counts.lock().await.remove(&participant).is_some()
    }

    /// Count one click for `participant`.
    pub async fn record_click(&self, participant: ParticipantId) -> ClickResult {
        let mut counts = self.counts.lock().await;
        match counts.get_mut(&participant) {
            Some(count) => {
                *count = count.saturating_add(1);
                ClickResult::Counted(*count)
            }
            None => ClickResult::UnknownParticipant,
        }
    }

    /// Copy the current tally and zero every count, in one critical
    /// section. Participants stay joined.
    pub async fn snapshot_and_reset(&self) -> TallySnapshot {
        let mut counts = self.counts.lock().await;
        let snapshot = TallySnapshot {
            counts: counts.clone(),
        };
        counts.values_mut().for_each(|count| *count = 0);
        snapshot
    }

    pub async fn participant_count(&self) -> usize {
        self.counts.lock().await.len()
    }

    pub async fn is_joined(&self, participant: ParticipantId) -> bool {
        self.counts.lock().await.contains_key(&participant)
    }
}

/// Owned copy of the tally taken when a round closes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TallySnapshot {
    counts: HashMap<ParticipantId, u64>,
}

impl TallySnapshot {
    pub fn get(&self, participant: ParticipantId) -> Option<u64> {
        self.counts.get(&participant).copied()
    }

    pub fn contains(&self, participant: ParticipantId) -> bool {
        self.counts.contains_key(&participant)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ParticipantId, u64)> + '_ {
        self.counts.iter().map(|(id, count)| (*id, *count))
    }

    pub fn total_clicks(&self) -> u64 {
        self.counts.values().sum()
    }
}

impl FromIterator<(ParticipantId, u64)> for TallySnapshot {
    fn from_iter<I: IntoIterator<Item = (ParticipantId, u64)>>(iter: I) -> Self {
        Self {
            counts: iter.into_iter().collect(),
        }
    }
}
