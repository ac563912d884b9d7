//! Single-elimination rounds: seeded first round with byes to top seeds, winners advance.

use crate::logic::standings::build_standings;
use crate::logic::tiebreakers::sort_by_tie_breakers;
use crate::models::{MatchRecord, Pairing, Player, PlayerId, Tournament, TournamentError};
use std::collections::{HashMap, HashSet};

/// What the next elimination round looks like.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EliminationRound {
    Pairings(Vec<Pairing>),
    /// Only one player is left standing.
    Champion(PlayerId),
}

/// Seed numbers (1-based) in bracket order, so winners of adjacent slots meet next.
///
/// For 8: 1, 8, 4, 5, 2, 7, 3, 6.
pub fn bracket_order(size: usize) -> Vec<usize> {
    let mut order = vec![1];
    let mut current = 1;
    while current < size {
        current *= 2;
        order = order
            .iter()
            .flat_map(|&seed| [seed, current + 1 - seed])
            .collect();
    }
    order
}

/// Generate `round_number` of a single-elimination bracket.
///
/// Round 1 seeds active players by ranking (registration order when nobody
/// has played) into the next power of two; missing seeds become byes for the
/// top seeds. Later rounds pair the winners of the previous round in bracket
/// order; a winner whose opponent slot is empty (dropped) gets a bye.
pub fn generate_elimination_round(
    tournament: &Tournament,
    round_number: u32,
) -> Result<EliminationRound, TournamentError> {
    let names: HashMap<PlayerId, &str> = tournament
        .players
        .iter()
        .map(|p| (p.id, p.name.as_str()))
        .collect();
    let entry = |id: PlayerId| (id, names.get(&id).copied().unwrap_or_default().to_string());
    let active: Vec<Player> = tournament.active_players().cloned().collect();

    let slots: Vec<Option<PlayerId>> = if round_number <= 1 {
        if active.len() < 2 {
            return Err(TournamentError::NotEnoughPlayers { required: 2 });
        }
        let standings = build_standings(&active, &tournament.matches, 1);
        let seeds: Vec<PlayerId> = sort_by_tie_breakers(&standings)
            .into_iter()
            .map(|p| p.standing.id)
            .collect();
        let size = seeds.len().next_power_of_two();
        bracket_order(size)
            .into_iter()
            .map(|seed| seeds.get(seed - 1).copied())
            .collect()
    } else {
        let still_in: HashSet<PlayerId> = active.iter().map(|p| p.id).collect();
        let previous: Vec<&MatchRecord> = tournament
            .matches
            .iter()
            .filter(|m| m.round == round_number - 1)
            .collect();
        if previous.iter().any(|m| !m.is_completed()) {
            return Err(TournamentError::IncompleteResults);
        }
        previous
            .iter()
            .map(|m| m.winner())
            .map(|w| w.filter(|id| still_in.contains(id)))
            .collect()
    };

    let remaining: Vec<PlayerId> = slots.iter().flatten().copied().collect();
    match remaining.as_slice() {
        [] => return Err(TournamentError::NotEnoughPlayers { required: 1 }),
        [champion] if round_number > 1 => return Ok(EliminationRound::Champion(*champion)),
        _ => {}
    }

    let pairings = slots
        .chunks(2)
        .filter_map(|pair| match pair {
            [Some(a), Some(b)] => Some(Pairing::new_match(round_number, entry(*a), entry(*b))),
            [Some(a), None] | [None, Some(a)] | [Some(a)] => {
                Some(Pairing::new_bye(round_number, *a, entry(*a).1))
            }
            _ => None,
        })
        .collect();
    Ok(EliminationRound::Pairings(pairings))
}
