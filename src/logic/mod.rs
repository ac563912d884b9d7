//! Tournament business logic: Swiss pairing, tie-breakers, rounds, elimination, seating.

mod elimination;
mod export;
mod history;
mod rounds;
mod seating;
mod standings;
mod swiss;
mod tiebreakers;

pub use elimination::{bracket_order, generate_elimination_round, EliminationRound};
pub use export::{standings_csv, ExportError};
pub use history::{have_played_before, PairingHistory};
pub use rounds::{
    complete_tournament, current_pairings, current_standings, generate_next_round, report_result,
    start_tournament, swap_players,
};
pub use seating::{assign_tables, seat_current_round, SeatConflict, SeatingPlan, TableAssignment};
pub use standings::{build_standings, pairing_history};
pub use swiss::{generate_swiss_pairings, PairingError, FLOATER_SEARCH_BUDGET, SEARCH_NODE_BUDGET};
pub use tiebreakers::{
    opponent_match_win_percentage, opponent_opponent_match_win_percentage, sort_by_tie_breakers,
    TIE_BREAK_EPSILON,
};
