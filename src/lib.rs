//! Swiss tournament organizer: library with models, the pairing and tie-break engines, and round logic.

pub mod logic;
pub mod models;

pub use logic::{
    assign_tables, bracket_order, build_standings, complete_tournament, current_pairings,
    current_standings, generate_elimination_round, generate_next_round, generate_swiss_pairings,
    have_played_before, opponent_match_win_percentage, opponent_opponent_match_win_percentage,
    pairing_history, report_result, seat_current_round, sort_by_tie_breakers, standings_csv,
    start_tournament, swap_players, EliminationRound, ExportError, PairingError, PairingHistory,
    SeatConflict, SeatingPlan, TableAssignment, FLOATER_SEARCH_BUDGET, SEARCH_NODE_BUDGET,
    TIE_BREAK_EPSILON,
};
pub use models::{
    calculate_match_points, FloatDetail, MatchId, MatchRecord, MatchResult, MatchStatus, Pairing,
    PairingDecisionLog, PairingResult, PairingStage, Player, PlayerId, PlayerStanding,
    PlayerWithTieBreakers, Tournament, TournamentError, TournamentFormat, TournamentId,
    TournamentState,
};
