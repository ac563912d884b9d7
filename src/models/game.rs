//! Match records as the orchestrator stores them, one per pairing.

use crate::models::pairing::{Pairing, PairingDecisionLog};
use crate::models::player::PlayerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Reported outcome of a real (non-bye) match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchResult {
    Player1Wins,
    Player2Wins,
    Draw,
}

/// Lifecycle of a match record.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Paired, waiting for a result.
    #[default]
    Ready,
    Completed,
}

/// A single match (or bye) in a round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: MatchId,
    pub round: u32,
    pub player1: PlayerId,
    /// None for a bye.
    pub player2: Option<PlayerId>,
    pub result: Option<MatchResult>,
    pub status: MatchStatus,
    pub reported_at: Option<DateTime<Utc>>,
    /// Stored on the first record of a Swiss round only.
    pub decision_log: Option<PairingDecisionLog>,
}

impl MatchRecord {
    /// Record for a freshly generated pairing. Byes are completed immediately.
    pub fn from_pairing(pairing: &Pairing) -> Self {
        let mut record = Self {
            id: Uuid::new_v4(),
            round: pairing.round_number,
            player1: pairing.player1_id,
            player2: pairing.player2_id,
            result: None,
            status: MatchStatus::Ready,
            reported_at: None,
            decision_log: None,
        };
        if record.is_bye() {
            record.status = MatchStatus::Completed;
        }
        record
    }

    pub fn is_bye(&self) -> bool {
        self.player2.is_none()
    }

    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    pub fn involves(&self, id: PlayerId) -> bool {
        self.player1 == id || self.player2 == Some(id)
    }

    /// Winner of a completed match, if it was not a draw. A bye's recipient wins.
    pub fn winner(&self) -> Option<PlayerId> {
        match (self.status, self.player2, self.result) {
            (MatchStatus::Completed, None, _) => Some(self.player1),
            (MatchStatus::Completed, Some(_), Some(MatchResult::Player1Wins)) => Some(self.player1),
            (MatchStatus::Completed, Some(p2), Some(MatchResult::Player2Wins)) => Some(p2),
            _ => None,
        }
    }

    /// Put `to` in the slot held by `from`. No-op if `from` is not in this match.
    pub fn substitute(&mut self, from: PlayerId, to: PlayerId) {
        if self.player1 == from {
            self.player1 = to;
        } else if self.player2 == Some(from) {
            self.player2 = Some(to);
        }
    }

    /// Record a result and mark the match completed.
    pub fn complete(&mut self, result: MatchResult) {
        self.result = Some(result);
        self.status = MatchStatus::Completed;
        self.reported_at = Some(Utc::now());
    }
}
