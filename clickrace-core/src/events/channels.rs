//! Round result channel.

use clickrace_sdk::objects::EndRound;
use tokio::sync::broadcast;

/// Buffer of the round result channel.
///
/// One message per round, so a client has to miss this many rounds in a
/// row before it starts lagging.
pub const END_ROUND_CHANNEL_CAPACITY: usize = 64;

/// Sender handle for EndRound results.
pub type EndRoundSender = broadcast::Sender<EndRound>;
/// Receiver handle for EndRound results, one per connected client.
pub type EndRoundReceiver = broadcast::Receiver<EndRound>;

/// Create a new EndRound broadcast channel.
///
/// Further receivers are created with `EndRoundSender::subscribe`.
pub fn end_round_channel() -> (EndRoundSender, EndRoundReceiver) {
    broadcast::channel(END_ROUND_CHANNEL_CAPACITY)
}
