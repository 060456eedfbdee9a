pub mod leaderboard;
pub mod round;
pub mod ws;

pub use leaderboard::{LeaderboardEntry, LeaderboardQuery};
pub use round::{EndRound, RoundInfo};
pub use ws::{WsClientMessage, WsCloseCode, WsServerMessage};
