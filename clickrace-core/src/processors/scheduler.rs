//! RoundScheduler processor.
//!
//! The RoundScheduler is responsible for:
//! - Closing a round every `round_interval` (the first one as soon as it
//!   starts, unless `close_on_start` is disabled)
//! - Snapshotting and resetting the `TallyStore`, then resolving the round
//! - Crediting a win to every winner through the `WinLedger`
//! - Publishing the `EndRound` result through the `Broadcaster`
//!
//! Win crediting is per winner: one failed credit is logged and reported
//! in the [`RoundReport`] but does not stop the other credits, the
//! broadcast, or the next round. Nothing is retried.

use crate::config::{ConfigStore, ConfigWatcher, GameConfig};
use crate::events::Broadcaster;
use crate::ledger::{LedgerError, WinLedger};
use crate::participant::ParticipantId;
use crate::resolver::{RoundOutcome, resolve};
use crate::tally::TallyStore;
use clickrace_sdk::objects::EndRound;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Where the scheduler currently is in the round lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    /// Created, `run` not called yet.
    Idle,
    /// Taking the tally snapshot and computing the outcome.
    Resolving,
    /// Crediting winners and broadcasting the result.
    Publishing,
    /// Sleeping until the next round closes.
    Waiting(Duration),
    /// Shutdown observed; the loop has exited.
    Stopped,
}

/// A win credit that could not be written.
#[derive(Debug)]
pub struct CreditFailure {
    pub participant: ParticipantId,
    pub error: LedgerError,
}

/// Everything that happened while closing one round.
#[derive(Debug)]
pub struct RoundReport {
    /// Sequence number of the round, starting at 1.
    pub round: u64,
    pub outcome: RoundOutcome,
    /// The payload handed to the broadcaster.
    pub payload: EndRound,
    pub credit_failures: Vec<CreditFailure>,
    /// Number of clients the payload was handed to.
    pub delivered_to: usize,
}

/// Drives the fixed-interval round loop.
///
/// The shutdown receiver is injected when calling
/// [`run()`](RoundScheduler::run), like the other processors.
pub struct RoundScheduler<L, B> {
    tally: TallyStore,
    ledger: L,
    broadcaster: B,
    config: ConfigStore<GameConfig>,
    phase_tx: watch::Sender<RoundPhase>,
    rounds_closed: AtomicU64,
}

impl<L: WinLedger, B: Broadcaster> RoundScheduler<L, B> {
    /// Create a new RoundScheduler.
    ///
    /// The round interval is read from `config` before every wait. An
    /// update that arrives during a wait reschedules that wait, measured
    /// from when it started.
    pub fn new(
        tally: TallyStore,
        ledger: L,
        broadcaster: B,
        config: ConfigStore<GameConfig>,
    ) -> Self {
        let (phase_tx, _) = watch::channel(RoundPhase::Idle);
        Self {
            tally,
            ledger,
            broadcaster,
            config,
            phase_tx,
            rounds_closed: AtomicU64::new(0),
        }
    }

    /// Subscribe to phase transitions.
    pub fn phase_watcher(&self) -> watch::Receiver<RoundPhase> {
        self.phase_tx.subscribe()
    }

    fn set_phase(&self, phase: RoundPhase) {
        debug!(?phase, "RoundScheduler phase change");
        self.phase_tx.send_replace(phase);
    }

    /// Run the round loop until shutdown is signaled.
    ///
    /// Shutdown is only observed while waiting: a round that is already
    /// being resolved or published completes first. A dropped shutdown
    /// sender counts as a shutdown signal.
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>) {
        let mut config_watcher = self.config.subscribe();
        let config = self.config.current().await;
        info!(
            round_interval_ms = config.round_interval_ms(),
            close_on_start = config.close_on_start,
            "RoundScheduler started"
        );
        let close_on_start = config.close_on_start;

        if close_on_start && !*shutdown_rx.borrow() {
            self.close_round().await;
        }

        loop {
            let interval = self.config.current().await.round_interval;
            self.set_phase(RoundPhase::Waiting(interval));

            if !self
                .wait_for_next_round(interval, &mut shutdown_rx, &mut config_watcher)
                .await
            {
                info!("RoundScheduler received shutdown signal");
                break;
            }

            self.close_round().await;
        }

        self.set_phase(RoundPhase::Stopped);
        info!(
            rounds = self.rounds_closed.load(Ordering::Relaxed),
            "RoundScheduler shutdown complete"
        );
    }

    /// Sleep for `interval`. Returns `false` if shutdown was signaled
    /// first.
    ///
    /// A config update moves the deadline to `start + new interval`; if
    /// that is already past, the round closes right away.
    async fn wait_for_next_round(
        &self,
        interval: Duration,
        shutdown_rx: &mut watch::Receiver<bool>,
        config_watcher: &mut ConfigWatcher,
    ) -> bool {
        if *shutdown_rx.borrow() {
            return false;
        }

        let started = Instant::now();
        let sleep = tokio::time::sleep(interval);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                biased;

                // Shutdown has highest priority.
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        return false;
                    }
                }

                // Disabled for this pass once the store is dropped.
                Ok(()) = config_watcher.changed() => {
                    let config = self.config.current().await;
                    info!(
                        round_interval_ms = config.round_interval_ms(),
                        "Round interval changed, rescheduling the running round"
                    );
                    self.set_phase(RoundPhase::Waiting(config.round_interval));
                    sleep.as_mut().reset(started + config.round_interval);
                }

                _ = &mut sleep => return true,
            }
        }
    }

    /// Close the running round: resolve, credit winners, broadcast.
    pub async fn close_round(&self) -> RoundReport {
        let round = self.rounds_closed.fetch_add(1, Ordering::Relaxed) + 1;

        self.set_phase(RoundPhase::Resolving);
        let snapshot = self.tally.snapshot_and_reset().await;
        let outcome = resolve(&snapshot);

        self.set_phase(RoundPhase::Publishing);
        let mut credit_failures = Vec::new();
        let payload = match &outcome {
            RoundOutcome::NoParticipation => {
                info!(
                    round,
                    participants = snapshot.len(),
                    "Round closed without participation"
                );
                EndRound::no_participation()
            }
            RoundOutcome::Winners {
                winners,
                winning_count,
            } => {
                info!(
                    round,
                    participants = snapshot.len(),
                    winners = winners.len(),
                    winning_count = winning_count.get(),
                    "Round closed"
                );
                credit_failures = self.credit_winners(round, winners).await;
                EndRound {
                    winners: Some(self.display_names(winners).await),
                    nb_clicks: winning_count.get(),
                }
            }
        };

        let delivered_to = self.broadcaster.publish(payload.clone());
        debug!(round, delivered_to, "Published EndRound");

        RoundReport {
            round,
            outcome,
            payload,
            credit_failures,
            delivered_to,
        }
    }

    async fn credit_winners(&self, round: u64, winners: &[ParticipantId]) -> Vec<CreditFailure> {
        let mut failures = Vec::new();
        for &participant in winners {
            if let Err(error) = self.ledger.increment_win_count(participant).await {
                error!(round, %participant, error = %error, "Failed to credit win");
                failures.push(CreditFailure { participant, error });
            }
        }
        failures
    }

    /// Display names in winner order. A name that cannot be looked up is
    /// replaced by the participant id.
    async fn display_names(&self, winners: &[ParticipantId]) -> Vec<String> {
        let mut names = Vec::with_capacity(winners.len());
        for &participant in winners {
            let name = match self.ledger.display_name_of(participant).await {
                Ok(Some(name)) => name,
                Ok(None) => {
                    warn!(%participant, "Winner has no player record");
                    participant.to_string()
                }
                Err(e) => {
                    error!(%participant, error = %e, "Failed to look up winner name");
                    participant.to_string()
                }
            };
            names.push(name);
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{ChannelBroadcaster, end_round_channel};
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::sync::{Arc, Mutex};
    use uuid::Uuid;

    #[derive(Default, Clone)]
    struct FakeLedger {
        names: HashMap<ParticipantId, String>,
        failing: HashSet<ParticipantId>,
        failing_lookup: HashSet<ParticipantId>,
        credited: Arc<Mutex<Vec<ParticipantId>>>,
    }

    impl FakeLedger {
        fn with_player(mut self, id: ParticipantId, name: &str) -> Self {
            self.names.insert(id, name.to_owned());
            self
        }

        fn failing_for(mut self, id: ParticipantId) -> Self {
            self.failing.insert(id);
            self
        }

        fn failing_lookup_for(mut self, id: ParticipantId) -> Self {
            self.failing_lookup.insert(id);
            self
        }

        fn credited(&self) -> Vec<ParticipantId> {
            self.credited.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl WinLedger for FakeLedger {
        async fn increment_win_count(&self, participant: ParticipantId) -> Result<(), LedgerError> {
            if self.failing.contains(&participant) {
                return Err(LedgerError::Database(sqlx::Error::PoolTimedOut));
            }
            self.credited.lock().unwrap().push(participant);
            Ok(())
        }

        async fn display_name_of(
            &self,
            participant: ParticipantId,
        ) -> Result<Option<String>, LedgerError> {
            if self.failing_lookup.contains(&participant) {
                return Err(LedgerError::Database(sqlx::Error::PoolTimedOut));
            }
            Ok(self.names.get(&participant).cloned())
        }
    }

    #[derive(Default, Clone)]
    struct RecordingBroadcaster {
        published: Arc<Mutex<Vec<EndRound>>>,
    }

    impl Broadcaster for RecordingBroadcaster {
        fn publish(&self, payload: EndRound) -> usize {
            self.published.lock().unwrap().push(payload);
            1
        }
    }

    fn ordered_ids<const N: usize>() -> [ParticipantId; N] {
        let mut ids = [ParticipantId::new(Uuid::nil()); N];
        for id in ids.iter_mut() {
            *id = ParticipantId::new(Uuid::new_v4());
        }
        ids.sort_unstable();
        ids
    }

    fn scheduler(
        tally: &TallyStore,
        ledger: FakeLedger,
        broadcaster: RecordingBroadcaster,
    ) -> RoundScheduler<FakeLedger, RecordingBroadcaster> {
        RoundScheduler::new(
            tally.clone(),
            ledger,
            broadcaster,
            ConfigStore::new(GameConfig::default()),
        )
    }

    #[tokio::test]
    async fn test_tie_credits_and_announces_both_winners() {
        let [a, b] = ordered_ids();
        let tally = TallyStore::new();
        let ledger = FakeLedger::default()
            .with_player(a, "alice")
            .with_player(b, "bob");
        let broadcaster = RecordingBroadcaster::default();
        let scheduler = scheduler(&tally, ledger.clone(), broadcaster.clone());

        tally.join(a).await;
        tally.join(b).await;
        for _ in 0..3 {
            tally.record_click(a).await;
            tally.record_click(b).await;
        }

        let report = scheduler.close_round().await;

        assert_eq!(report.round, 1);
        assert_eq!(report.outcome.winners(), &[a, b]);
        assert_eq!(report.outcome.winning_count(), 3);
        assert_eq!(ledger.credited(), vec![a, b]);
        assert_eq!(
            broadcaster.published.lock().unwrap().as_slice(),
            &[EndRound {
                winners: Some(vec!["alice".into(), "bob".into()]),
                nb_clicks: 3,
            }]
        );
        assert!(report.credit_failures.is_empty());
    }

    #[tokio::test]
    async fn test_round_without_participants_broadcasts_sentinel() {
        let tally = TallyStore::new();
        let ledger = FakeLedger::default();
        let broadcaster = RecordingBroadcaster::default();
        let scheduler = scheduler(&tally, ledger.clone(), broadcaster.clone());

        let report = scheduler.close_round().await;

        assert!(report.outcome.is_no_participation());
        assert_eq!(report.payload, EndRound::no_participation());
        assert!(ledger.credited().is_empty());
        assert_eq!(
            broadcaster.published.lock().unwrap().as_slice(),
            &[EndRound::no_participation()]
        );
    }

    #[tokio::test]
    async fn test_joined_but_idle_participants_do_not_win() {
        let [a, b] = ordered_ids();
        let tally = TallyStore::new();
        let ledger = FakeLedger::default();
        let scheduler = scheduler(&tally, ledger.clone(), RecordingBroadcaster::default());

        tally.join(a).await;
        tally.join(b).await;

        let report = scheduler.close_round().await;
        assert!(report.outcome.is_no_participation());
        assert!(ledger.credited().is_empty());
    }

    #[tokio::test]
    async fn test_close_round_resets_tally() {
        let [a] = ordered_ids();
        let tally = TallyStore::new();
        let scheduler = scheduler(
            &tally,
            FakeLedger::default().with_player(a, "alice"),
            RecordingBroadcaster::default(),
        );

        tally.join(a).await;
        tally.record_click(a).await;

        assert_eq!(scheduler.close_round().await.outcome.winning_count(), 1);
        let second = scheduler.close_round().await;
        assert_eq!(second.round, 2);
        assert!(second.outcome.is_no_participation());
        assert!(tally.is_joined(a).await);
    }

    #[tokio::test]
    async fn test_credit_failure_is_per_winner_and_broadcast_still_happens() {
        let [a, b] = ordered_ids();
        let tally = TallyStore::new();
        let ledger = FakeLedger::default()
            .with_player(a, "alice")
            .with_player(b, "bob")
            .failing_for(a);
        let broadcaster = RecordingBroadcaster::default();
        let scheduler = scheduler(&tally, ledger.clone(), broadcaster.clone());

        tally.join(a).await;
        tally.join(b).await;
        tally.record_click(a).await;
        tally.record_click(b).await;

        let report = scheduler.close_round().await;

        assert_eq!(ledger.credited(), vec![b]);
        assert_eq!(report.credit_failures.len(), 1);
        assert_eq!(report.credit_failures[0].participant, a);
        assert_eq!(broadcaster.published.lock().unwrap().len(), 1);
        assert_eq!(
            report.payload.winners,
            Some(vec!["alice".to_owned(), "bob".to_owned()])
        );
    }

    #[tokio::test]
    async fn test_unknown_winner_name_falls_back_to_id() {
        let [a] = ordered_ids();
        let tally = TallyStore::new();
        let scheduler = scheduler(&tally, FakeLedger::default(), RecordingBroadcaster::default());

        tally.join(a).await;
        tally.record_click(a).await;

        let report = scheduler.close_round().await;
        assert_eq!(report.payload.winners, Some(vec![a.to_string()]));
    }

    #[tokio::test]
    async fn test_failed_name_lookup_falls_back_to_id_and_still_broadcasts() {
        let [a, b] = ordered_ids();
        let tally = TallyStore::new();
        let ledger = FakeLedger::default()
            .with_player(a, "alice")
            .with_player(b, "bob")
            .failing_lookup_for(a);
        let broadcaster = RecordingBroadcaster::default();
        let scheduler = scheduler(&tally, ledger.clone(), broadcaster.clone());

        tally.join(a).await;
        tally.join(b).await;
        tally.record_click(a).await;
        tally.record_click(b).await;

        let report = scheduler.close_round().await;

        let expected = EndRound {
            winners: Some(vec![a.to_string(), "bob".to_owned()]),
            nb_clicks: 1,
        };
        assert_eq!(report.payload, expected);
        assert_eq!(ledger.credited(), vec![a, b]);
        assert!(report.credit_failures.is_empty());
        assert_eq!(broadcaster.published.lock().unwrap().as_slice(), &[expected]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_closes_rounds_on_interval_until_shutdown() {
        let [a] = ordered_ids();
        let tally = TallyStore::new();
        let (tx, mut rx) = end_round_channel();
        let config = ConfigStore::new(GameConfig::new(Duration::from_secs(30)));
        let scheduler = RoundScheduler::new(
            tally.clone(),
            FakeLedger::default().with_player(a, "alice"),
            ChannelBroadcaster::new(tx),
            config,
        );
        let mut phase = scheduler.phase_watcher();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let started = Instant::now();
        let handle = tokio::spawn(scheduler.run(shutdown_rx));

        // First round closes immediately.
        assert_eq!(rx.recv().await.unwrap(), EndRound::no_participation());
        assert_eq!(started.elapsed(), Duration::ZERO);

        phase
            .wait_for(|p| matches!(p, RoundPhase::Waiting(_)))
            .await
            .unwrap();
        tally.join(a).await;
        tally.record_click(a).await;
        tally.record_click(a).await;

        let second = rx.recv().await.unwrap();
        assert_eq!(started.elapsed(), Duration::from_secs(30));
        assert_eq!(second.winners, Some(vec!["alice".to_owned()]));
        assert_eq!(second.nb_clicks, 2);

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
        assert_eq!(*phase.borrow(), RoundPhase::Stopped);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_continues_after_credit_failure() {
        let [a] = ordered_ids();
        let tally = TallyStore::new();
        let (tx, mut rx) = end_round_channel();
        let scheduler = RoundScheduler::new(
            tally.clone(),
            FakeLedger::default().failing_for(a),
            ChannelBroadcaster::new(tx),
            ConfigStore::new(GameConfig::new(Duration::from_secs(1))),
        );
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        tally.join(a).await;
        tally.record_click(a).await;
        let handle = tokio::spawn(scheduler.run(shutdown_rx));

        assert_eq!(rx.recv().await.unwrap().nb_clicks, 1);
        // The next round still happens.
        assert_eq!(rx.recv().await.unwrap(), EndRound::no_participation());

        drop(shutdown_tx);
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_on_start_disabled_waits_first() {
        let tally = TallyStore::new();
        let (tx, mut rx) = end_round_channel();
        let config = ConfigStore::new(GameConfig {
            round_interval: Duration::from_secs(10),
            close_on_start: false,
        });
        let scheduler = RoundScheduler::new(
            tally,
            FakeLedger::default(),
            ChannelBroadcaster::new(tx),
            config,
        );
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let started = Instant::now();
        let handle = tokio::spawn(scheduler.run(shutdown_rx));

        rx.recv().await.unwrap();
        assert_eq!(started.elapsed(), Duration::from_secs(10));

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_update_reschedules_running_wait() {
        let tally = TallyStore::new();
        let (tx, mut rx) = end_round_channel();
        let config = ConfigStore::new(GameConfig::new(Duration::from_secs(30)));
        let scheduler = RoundScheduler::new(
            tally,
            FakeLedger::default(),
            ChannelBroadcaster::new(tx),
            config.clone(),
        );
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let started = Instant::now();
        let handle = tokio::spawn(scheduler.run(shutdown_rx));

        rx.recv().await.unwrap();
        config.update(GameConfig::new(Duration::from_secs(5))).await;

        // The running wait is cut down to 5s from its start.
        rx.recv().await.unwrap();
        assert_eq!(started.elapsed(), Duration::from_secs(5));

        rx.recv().await.unwrap();
        assert_eq!(started.elapsed(), Duration::from_secs(10));

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_shorter_interval_past_deadline_closes_immediately() {
        let (tx, mut rx) = end_round_channel();
        let config = ConfigStore::new(GameConfig::new(Duration::from_secs(30)));
        let scheduler = RoundScheduler::new(
            TallyStore::new(),
            FakeLedger::default(),
            ChannelBroadcaster::new(tx),
            config.clone(),
        );
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let started = Instant::now();
        let handle = tokio::spawn(scheduler.run(shutdown_rx));

        rx.recv().await.unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
        config.update(GameConfig::new(Duration::from_secs(5))).await;

        rx.recv().await.unwrap();
        assert_eq!(started.elapsed(), Duration::from_secs(10));

        rx.recv().await.unwrap();
        assert_eq!(started.elapsed(), Duration::from_secs(15));

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_longer_interval_extends_running_wait() {
        let (tx, mut rx) = end_round_channel();
        let config = ConfigStore::new(GameConfig::new(Duration::from_secs(5)));
        let scheduler = RoundScheduler::new(
            TallyStore::new(),
            FakeLedger::default(),
            ChannelBroadcaster::new(tx),
            config.clone(),
        );
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let started = Instant::now();
        let handle = tokio::spawn(scheduler.run(shutdown_rx));

        rx.recv().await.unwrap();
        config.update(GameConfig::new(Duration::from_secs(30))).await;

        rx.recv().await.unwrap();
        assert_eq!(started.elapsed(), Duration::from_secs(30));

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_before_start_closes_nothing() {
        let (tx, mut rx) = end_round_channel();
        let scheduler = RoundScheduler::new(
            TallyStore::new(),
            FakeLedger::default(),
            ChannelBroadcaster::new(tx),
            ConfigStore::new(GameConfig::default()),
        );
        let (_shutdown_tx, shutdown_rx) = watch::channel(true);

        scheduler.run(shutdown_rx).await;
        assert!(rx.try_recv().is_err());
    }
}
