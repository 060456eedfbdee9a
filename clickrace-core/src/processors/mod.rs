//! Long-running processors of the game.
//!
//! - `ParticipationGateway`: receives `ParticipationEvent`, mutates the `TallyStore`
//! - `RoundScheduler`: closes a round every interval, credits winners and
//!   publishes the `EndRound` result

pub mod gateway;
pub mod scheduler;

pub use gateway::ParticipationGateway;
pub use scheduler::{CreditFailure, RoundPhase, RoundReport, RoundScheduler};
