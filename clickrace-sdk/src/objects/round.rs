//! Round result payload.

use serde::{Deserialize, Serialize};

/// Result of a closed round, pushed to every connected client.
///
/// `winners` is `null` when nobody clicked during the round; in that case
/// `nbClicks` is always `0`.
///
/// ```json
/// {"winners":["alice","bob"],"nbClicks":3}
/// {"winners":null,"nbClicks":0}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndRound {
    /// Display names of every co-winner, or `None` for a round without
    /// participation.
    pub winners: Option<Vec<String>>,
    /// Click count reached by the winners.
    pub nb_clicks: u64,
}

impl EndRound {
    /// The payload broadcast when no participant clicked.
    pub fn no_participation() -> Self {
        Self {
            winners: None,
            nb_clicks: 0,
        }
    }

    /// Returns `true` if this is the "no participation" payload.
    pub fn is_no_participation(&self) -> bool {
        self.winners.is_none()
    }
}

/// Snapshot of the running round, returned by `GET /round`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundInfo {
    /// Number of participants currently joined.
    pub participants: usize,
    /// Configured round length in milliseconds.
    pub round_interval_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_participation_wire_format() {
        let json = serde_json::to_value(EndRound::no_participation()).unwrap();
        assert_eq!(json, serde_json::json!({"winners": null, "nbClicks": 0}));
    }

    #[test]
    fn test_winners_wire_format() {
        let payload = EndRound {
            winners: Some(vec!["alice".into(), "bob".into()]),
            nb_clicks: 3,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"winners": ["alice", "bob"], "nbClicks": 3})
        );
        assert!(!payload.is_no_participation());
    }
}
