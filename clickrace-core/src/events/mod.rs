//! Event types and channel infrastructure.
//!
//! # Event Flow
//!
//! 1. WebSocket connections emit `ParticipationEvent` -> `ParticipationGateway` -> `TallyStore`
//! 2. `RoundScheduler` snapshots the `TallyStore`, resolves the round and
//!    publishes an `EndRound` through a `Broadcaster`
//! 3. `ChannelBroadcaster` fans the `EndRound` out to every connection's
//!    receiver

pub mod broadcaster;
pub mod channels;
pub mod types;

pub use broadcaster::{Broadcaster, ChannelBroadcaster};
pub use channels::{END_ROUND_CHANNEL_CAPACITY, EndRoundReceiver, EndRoundSender, end_round_channel};
pub use types::ParticipationEvent;
