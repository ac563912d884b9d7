//! Standings snapshots: replay completed matches strictly before a round.

use crate::models::{MatchRecord, MatchResult, Pairing, Player, PlayerId, PlayerStanding};
use std::collections::HashMap;

/// Build one standing per player from every completed match with `round < before_round`.
///
/// Dropped players are included so their results still feed their opponents'
/// tie-breakers; callers filter them out of the pairing pool. Matches that
/// reference unknown players are skipped.
pub fn build_standings(
    players: &[Player],
    matches: &[MatchRecord],
    before_round: u32,
) -> Vec<PlayerStanding> {
    let mut standings: Vec<PlayerStanding> = players
        .iter()
        .map(|p| PlayerStanding::new(p.id, p.name.clone()))
        .collect();
    let index: HashMap<PlayerId, usize> = standings
        .iter()
        .enumerate()
        .map(|(i, s)| (s.id, i))
        .collect();

    for m in matches
        .iter()
        .filter(|m| m.round < before_round && m.is_completed())
    {
        let Some(&i1) = index.get(&m.player1) else {
            log::warn!("Match {} references unknown player {}", m.id, m.player1);
            continue;
        };
        let Some(p2) = m.player2 else {
            standings[i1].record_bye();
            continue;
        };
        let Some(&i2) = index.get(&p2) else {
            log::warn!("Match {} references unknown player {}", m.id, p2);
            continue;
        };
        match m.result {
            Some(MatchResult::Player1Wins) => {
                standings[i1].record_win(p2);
                standings[i2].record_loss(m.player1);
            }
            Some(MatchResult::Player2Wins) => {
                standings[i1].record_loss(p2);
                standings[i2].record_win(m.player1);
            }
            Some(MatchResult::Draw) => {
                standings[i1].record_draw(p2);
                standings[i2].record_draw(m.player1);
            }
            None => log::warn!("Completed match {} has no result", m.id),
        }
    }
    standings
}

/// All pairings (byes included) of rounds before `before_round`, in stored order.
pub fn pairing_history(players: &[Player], matches: &[MatchRecord], before_round: u32) -> Vec<Pairing> {
    let names: HashMap<PlayerId, &str> = players.iter().map(|p| (p.id, p.name.as_str())).collect();
    let name_of = |id: PlayerId| names.get(&id).copied().unwrap_or_default().to_string();
    matches
        .iter()
        .filter(|m| m.round < before_round)
        .map(|m| match m.player2 {
            Some(p2) => Pairing::new_match(m.round, (m.player1, name_of(m.player1)), (p2, name_of(p2))),
            None => Pairing::new_bye(m.round, m.player1, name_of(m.player1)),
        })
        .collect()
}
