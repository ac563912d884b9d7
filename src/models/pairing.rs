//! Pairings, the per-round decision log, and ranked standings.

use crate::models::player::{PlayerId, PlayerStanding};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One scheduled pairing. `player2_id == None` means a bye.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Pairing {
    pub player1_id: PlayerId,
    pub player1_name: String,
    pub player2_id: Option<PlayerId>,
    pub player2_name: Option<String>,
    pub round_number: u32,
}

impl Pairing {
    pub fn new_match(
        round_number: u32,
        player1: (PlayerId, String),
        player2: (PlayerId, String),
    ) -> Self {
        Self {
            player1_id: player1.0,
            player1_name: player1.1,
            player2_id: Some(player2.0),
            player2_name: Some(player2.1),
            round_number,
        }
    }

    pub fn new_bye(round_number: u32, player_id: PlayerId, player_name: String) -> Self {
        Self {
            player1_id: player_id,
            player1_name: player_name,
            player2_id: None,
            player2_name: None,
            round_number,
        }
    }

    pub fn is_bye(&self) -> bool {
        self.player2_id.is_none()
    }

    pub fn involves(&self, id: PlayerId) -> bool {
        self.player1_id == id || self.player2_id == Some(id)
    }

    /// Ids taking part in this pairing (one for a bye, two otherwise).
    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> {
        std::iter::once(self.player1_id).chain(self.player2_id)
    }
}

/// Which fallback tier the pairing run needed (highest tier over all brackets).
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairingStage {
    /// Round 1: shuffled field, no bracket logic.
    RandomFirstRound,
    /// Every bracket paired rematch-free by the greedy scan.
    #[default]
    Greedy,
    /// At least one bracket needed the bounded search to avoid a rematch.
    Backtracking,
    /// At least one bracket had no rematch-free option.
    ForcedRematch,
}

/// Display form of one float reason.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct FloatDetail {
    pub player_id: PlayerId,
    pub player_name: String,
    pub reason: String,
}

/// Explanatory audit record for one round's pairing run. Never read back by the engine.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PairingDecisionLog {
    pub bye_reason: Option<String>,
    pub bye_player_id: Option<PlayerId>,
    pub bye_player_name: Option<String>,
    pub bye_player_points: Option<u32>,
    pub float_reasons: BTreeMap<PlayerId, String>,
    /// Largest match-point gap between two paired opponents.
    pub max_float_distance: u32,
    /// Number of pairings in the round whose players have met before.
    pub rematch_count: u32,
    pub stage_used: PairingStage,
    pub float_details: Vec<FloatDetail>,
}

/// Output of a pairing run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PairingResult {
    pub pairings: Vec<Pairing>,
    pub decision_log: Option<PairingDecisionLog>,
}

impl PairingResult {
    pub fn bye(&self) -> Option<&Pairing> {
        self.pairings.iter().find(|p| p.is_bye())
    }
}

/// A standing extended with opponent-strength tie-breakers. Recomputed on every ranking.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerWithTieBreakers {
    #[serde(flatten)]
    pub standing: PlayerStanding,
    pub opponent_match_win_percentage: f64,
    pub opponent_opponent_match_win_percentage: f64,
}
