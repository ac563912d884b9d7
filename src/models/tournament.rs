//! Tournament, TournamentState and TournamentError.

use crate::logic::PairingError;
use crate::models::game::{MatchId, MatchRecord};
use crate::models::player::{Player, PlayerId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during tournament operations.
#[derive(Debug, Error)]
pub enum TournamentError {
    #[error("Invalid state for this action")]
    InvalidState,
    #[error("Player not found")]
    PlayerNotFound(PlayerId),
    #[error("Match not found")]
    MatchNotFound(MatchId),
    #[error("A player with this name already exists")]
    DuplicatePlayerName,
    #[error("Player name must not be empty")]
    EmptyPlayerName,
    #[error("Need at least {required} players to start")]
    NotEnoughPlayers { required: usize },
    #[error("Not all matches of the current round have a result")]
    IncompleteResults,
    #[error("Seat numbers start at 1")]
    InvalidSeat,
    #[error("A bye has no result to report")]
    ByeHasNoResult,
    #[error("Elimination matches cannot end in a draw")]
    DrawNotAllowed,
    #[error("Player still has an unfinished match this round")]
    PlayerHasPendingMatch(PlayerId),
    #[error("All {0} rounds have been played")]
    RoundLimitReached(u32),
    #[error("Invalid pairing swap: {0}")]
    InvalidSwap(String),
    #[error("Failed to generate pairings: {0}")]
    Pairing(#[from] PairingError),
}

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// How rounds are paired.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentFormat {
    #[default]
    Swiss,
    SingleElimination,
}

/// Current phase of the tournament.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentState {
    /// Registering players; not started.
    #[default]
    Setup,
    /// Rounds are being paired and played.
    InProgress,
    /// Finished; standings are final.
    Completed,
}

/// Full tournament: roster, every match and byes ever paired, and phase.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub format: TournamentFormat,
    /// All registered players, including dropped ones.
    pub players: Vec<Player>,
    /// Every match record of every round, in round order.
    pub matches: Vec<MatchRecord>,
    /// 0 before the first round is paired.
    pub current_round: u32,
    /// Optional cap on the number of Swiss rounds.
    pub max_rounds: Option<u32>,
    pub state: TournamentState,
    pub created_at: DateTime<Utc>,
}

impl Tournament {
    /// Create a new tournament in Setup state with no players.
    pub fn new(name: impl Into<String>, format: TournamentFormat) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            format,
            players: Vec::new(),
            matches: Vec::new(),
            current_round: 0,
            max_rounds: None,
            state: TournamentState::Setup,
            created_at: Utc::now(),
        }
    }

    pub fn get_player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn get_player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// Players still taking part in pairings.
    pub fn active_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| !p.dropped)
    }

    /// Matches (and byes) of the round currently being played.
    pub fn current_matches(&self) -> impl Iterator<Item = &MatchRecord> {
        let round = self.current_round;
        self.matches.iter().filter(move |m| m.round == round)
    }

    pub fn current_round_complete(&self) -> bool {
        self.current_matches().all(|m| m.is_completed())
    }

    /// Add a player (Setup only). Names must be unique (case-insensitive).
    pub fn add_player(&mut self, name: impl Into<String>) -> Result<PlayerId, TournamentError> {
        if self.state != TournamentState::Setup {
            return Err(TournamentError::InvalidState);
        }
        let name = name.into();
        let name_trimmed = name.trim();
        if name_trimmed.is_empty() {
            return Err(TournamentError::EmptyPlayerName);
        }
        let folded = name_trimmed.to_lowercase();
        let is_duplicate = self
            .players
            .iter()
            .any(|p| p.name.to_lowercase() == folded);
        if is_duplicate {
            return Err(TournamentError::DuplicatePlayerName);
        }
        let player = Player::new(name_trimmed);
        let id = player.id;
        self.players.push(player);
        Ok(id)
    }

    /// Remove a player by id (only valid in Setup).
    pub fn remove_player(&mut self, player_id: PlayerId) -> Result<(), TournamentError> {
        if self.state != TournamentState::Setup {
            return Err(TournamentError::InvalidState);
        }
        let idx = self
            .players
            .iter()
            .position(|p| p.id == player_id)
            .ok_or(TournamentError::PlayerNotFound(player_id))?;
        self.players.remove(idx);
        Ok(())
    }

    /// Assign or clear a player's static seat. Valid in any state.
    pub fn set_static_seat(&mut self, player_id: PlayerId, seat: Option<u32>) -> Result<(), TournamentError> {
        if seat == Some(0) {
            return Err(TournamentError::InvalidSeat);
        }
        let p = self
            .get_player_mut(player_id)
            .ok_or(TournamentError::PlayerNotFound(player_id))?;
        p.static_seat = seat;
        Ok(())
    }

    /// Drop a player from future pairings (InProgress only). Past results are kept.
    pub fn drop_player(&mut self, player_id: PlayerId) -> Result<(), TournamentError> {
        if self.state != TournamentState::InProgress {
            return Err(TournamentError::InvalidState);
        }
        let pending = self
            .current_matches()
            .any(|m| !m.is_completed() && m.involves(player_id));
        if pending {
            return Err(TournamentError::PlayerHasPendingMatch(player_id));
        }
        let round = self.current_round;
        let p = self
            .get_player_mut(player_id)
            .ok_or(TournamentError::PlayerNotFound(player_id))?;
        p.drop_out();
        log::info!("Player {} dropped after round {}", p.name, round);
        Ok(())
    }

    /// Players that must be registered before `start_tournament` succeeds.
    pub fn players_required_to_start(&self) -> usize {
        2
    }
}
