//! Player (roster entry) and PlayerStanding (per-round competitive snapshot).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a player (used in pairings, matches and lookups).
pub type PlayerId = Uuid;

/// Match points for a record: 3 per win, 1 per draw.
pub fn calculate_match_points(wins: u32, draws: u32) -> u32 {
    wins * 3 + draws
}

/// A registered player in the tournament.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Dropped players keep their results but are no longer paired.
    pub dropped: bool,
    /// Fixed table number (e.g. accessibility seating), if any.
    pub static_seat: Option<u32>,
}

impl Player {
    /// Create a new player with the given name. Not dropped, no static seat.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            dropped: false,
            static_seat: None,
        }
    }

    /// Mark the player as dropped from the event.
    pub fn drop_out(&mut self) {
        self.dropped = true;
    }
}

/// A snapshot of one player's record at a point in the tournament.
///
/// `match_points` must always equal `calculate_match_points(wins, draws)`; the
/// `record_*` methods keep it in sync. The pairing engine rejects snapshots
/// where it does not.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerStanding {
    pub id: PlayerId,
    pub name: String,
    pub match_points: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub matches_played: u32,
    /// Opponents faced, one entry per completed non-bye match.
    pub opponents: Vec<PlayerId>,
    pub byes_received: u32,
}

impl PlayerStanding {
    /// Empty record for a player who has not played yet.
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            match_points: 0,
            wins: 0,
            losses: 0,
            draws: 0,
            matches_played: 0,
            opponents: Vec::new(),
            byes_received: 0,
        }
    }

    pub fn record_win(&mut self, opponent: PlayerId) {
        self.wins += 1;
        self.matches_played += 1;
        self.opponents.push(opponent);
        self.sync_match_points();
    }

    pub fn record_loss(&mut self, opponent: PlayerId) {
        self.losses += 1;
        self.matches_played += 1;
        self.opponents.push(opponent);
        self.sync_match_points();
    }

    pub fn record_draw(&mut self, opponent: PlayerId) {
        self.draws += 1;
        self.matches_played += 1;
        self.opponents.push(opponent);
        self.sync_match_points();
    }

    /// A bye counts as a win-equivalent result but adds no opponent.
    pub fn record_bye(&mut self) {
        self.byes_received += 1;
        self.wins += 1;
        self.matches_played += 1;
        self.sync_match_points();
    }

    /// Fraction of played matches won (0 when nothing played).
    pub fn match_win_rate(&self) -> f64 {
        if self.matches_played == 0 {
            return 0.0;
        }
        f64::from(self.wins) / f64::from(self.matches_played)
    }

    fn sync_match_points(&mut self) {
        self.match_points = calculate_match_points(self.wins, self.draws);
    }
}
