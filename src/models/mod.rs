//! Data structures for the tournament: players, standings, pairings, matches, tournament state.

mod game;
mod pairing;
mod player;
mod tournament;

pub use game::{MatchId, MatchRecord, MatchResult, MatchStatus};
pub use pairing::{
    FloatDetail, Pairing, PairingDecisionLog, PairingResult, PairingStage, PlayerWithTieBreakers,
};
pub use player::{calculate_match_points, Player, PlayerId, PlayerStanding};
pub use tournament::{Tournament, TournamentError, TournamentFormat, TournamentId, TournamentState};
