//! Game configuration.

use std::time::Duration;

/// Validated round settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    /// Length of one round.
    pub round_interval: Duration,
    /// Close a round as soon as the scheduler starts, before the first
    /// wait.
    pub close_on_start: bool,
}

impl GameConfig {
    pub const DEFAULT_ROUND_INTERVAL: Duration = Duration::from_millis(30_000);
    pub const MIN_ROUND_INTERVAL: Duration = Duration::from_millis(100);

    pub fn new(round_interval: Duration) -> Self {
        Self {
            round_interval,
            ..Self::default()
        }
    }

    /// Round length in whole milliseconds, saturating at `u64::MAX`.
    pub fn round_interval_ms(&self) -> u64 {
        u64::try_from(self.round_interval.as_millis()).unwrap_or(u64::MAX)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            round_interval: Self::DEFAULT_ROUND_INTERVAL,
            close_on_start: true,
        }
    }
}
