//! Round orchestration: start, pair the next round, report results, manual edits.

use crate::logic::elimination::{generate_elimination_round, EliminationRound};
use crate::logic::standings::{build_standings, pairing_history};
use crate::logic::swiss::generate_swiss_pairings;
use crate::logic::tiebreakers::sort_by_tie_breakers;
use crate::models::{
    MatchId, MatchRecord, MatchResult, Pairing, PlayerId, PlayerStanding, PlayerWithTieBreakers,
    Tournament, TournamentError, TournamentFormat, TournamentState,
};
use rand::Rng;
use std::collections::HashSet;

/// Start the tournament: require at least 2 players, move to InProgress and pair round 1.
pub fn start_tournament<R: Rng + ?Sized>(
    tournament: &mut Tournament,
    rng: &mut R,
) -> Result<(), TournamentError> {
    if tournament.state != TournamentState::Setup {
        return Err(TournamentError::InvalidState);
    }
    let required = tournament.players_required_to_start();
    if tournament.players.len() < required {
        return Err(TournamentError::NotEnoughPlayers { required });
    }
    tournament.state = TournamentState::InProgress;
    if let Err(e) = generate_next_round(tournament, rng) {
        tournament.state = TournamentState::Setup;
        return Err(e);
    }
    Ok(())
}

/// Pair the next round once every match of the current one is completed.
///
/// Swiss rounds store one record per pairing (byes already completed) and keep
/// the decision log on the first record. Nothing is stored if pairing fails.
/// An elimination bracket with one player left completes the tournament.
pub fn generate_next_round<R: Rng + ?Sized>(
    tournament: &mut Tournament,
    rng: &mut R,
) -> Result<(), TournamentError> {
    if tournament.state != TournamentState::InProgress {
        return Err(TournamentError::InvalidState);
    }
    if !tournament.current_round_complete() {
        return Err(TournamentError::IncompleteResults);
    }
    let next = tournament.current_round + 1;

    let (pairings, decision_log) = match tournament.format {
        TournamentFormat::Swiss => {
            if let Some(max) = tournament.max_rounds {
                if tournament.current_round >= max {
                    return Err(TournamentError::RoundLimitReached(max));
                }
            }
            let standings = active_standings(tournament, next);
            if standings.len() < 2 {
                return Err(TournamentError::NotEnoughPlayers { required: 2 });
            }
            let history = pairing_history(&tournament.players, &tournament.matches, next);
            let result = generate_swiss_pairings(&standings, next, &history, rng)?;
            (result.pairings, result.decision_log)
        }
        TournamentFormat::SingleElimination => {
            match generate_elimination_round(tournament, next)? {
                EliminationRound::Pairings(pairings) => (pairings, None),
                EliminationRound::Champion(id) => {
                    let name = tournament
                        .get_player(id)
                        .map(|p| p.name.clone())
                        .unwrap_or_default();
                    log::info!("{} wins {}", name, tournament.name);
                    tournament.state = TournamentState::Completed;
                    return Ok(());
                }
            }
        }
    };

    let mut records: Vec<MatchRecord> = pairings.iter().map(MatchRecord::from_pairing).collect();
    if let Some(first) = records.first_mut() {
        first.decision_log = decision_log;
    }
    log::info!(
        "{}: round {} paired ({} matches)",
        tournament.name,
        next,
        records.len()
    );
    tournament.matches.extend(records);
    tournament.current_round = next;
    Ok(())
}

/// Standings of non-dropped players as of the start of `round`.
fn active_standings(tournament: &Tournament, round: u32) -> Vec<PlayerStanding> {
    let active: HashSet<PlayerId> = tournament.active_players().map(|p| p.id).collect();
    build_standings(&tournament.players, &tournament.matches, round)
        .into_iter()
        .filter(|s| active.contains(&s.id))
        .collect()
}

/// Record (or correct) the result of a current-round match.
pub fn report_result(
    tournament: &mut Tournament,
    match_id: MatchId,
    result: MatchResult,
) -> Result<(), TournamentError> {
    if tournament.state != TournamentState::InProgress {
        return Err(TournamentError::InvalidState);
    }
    if tournament.format == TournamentFormat::SingleElimination && result == MatchResult::Draw {
        return Err(TournamentError::DrawNotAllowed);
    }
    let round = tournament.current_round;
    let m = tournament
        .matches
        .iter_mut()
        .find(|m| m.id == match_id && m.round == round)
        .ok_or(TournamentError::MatchNotFound(match_id))?;
    if m.is_bye() {
        return Err(TournamentError::ByeHasNoResult);
    }
    m.complete(result);
    Ok(())
}

/// Manual pairing edit: exchange two players between matches of the current round.
///
/// Real matches must not have a result yet; byes can always take part, so this
/// is also how a bye is moved to another player.
pub fn swap_players(
    tournament: &mut Tournament,
    match_a: MatchId,
    player_a: PlayerId,
    match_b: MatchId,
    player_b: PlayerId,
) -> Result<(), TournamentError> {
    if tournament.state != TournamentState::InProgress {
        return Err(TournamentError::InvalidState);
    }
    if match_a == match_b {
        return Err(TournamentError::InvalidSwap("both players are in the same match".into()));
    }
    let round = tournament.current_round;
    let find = |id: MatchId| {
        tournament
            .matches
            .iter()
            .position(|m| m.id == id && m.round == round)
            .ok_or(TournamentError::MatchNotFound(id))
    };
    let ia = find(match_a)?;
    let ib = find(match_b)?;

    for (idx, player) in [(ia, player_a), (ib, player_b)] {
        let m = &tournament.matches[idx];
        if !m.involves(player) {
            return Err(TournamentError::InvalidSwap(format!(
                "player {} is not in match {}",
                player, m.id
            )));
        }
        if !m.is_bye() && m.is_completed() {
            return Err(TournamentError::InvalidSwap(format!(
                "match {} already has a result",
                m.id
            )));
        }
    }

    // (previous holder, new holder) when one side of the swap is a bye.
    let moved_bye = if tournament.matches[ia].is_bye() {
        Some((player_a, player_b))
    } else if tournament.matches[ib].is_bye() {
        Some((player_b, player_a))
    } else {
        None
    };
    tournament.matches[ia].substitute(player_a, player_b);
    tournament.matches[ib].substitute(player_b, player_a);
    if let Some((previous, holder)) = moved_bye {
        record_moved_bye(tournament, round, previous, holder);
    }
    log::info!(
        "Round {}: swapped {} and {} between matches",
        round,
        player_a,
        player_b
    );
    Ok(())
}

/// Point the round's decision log at the player who now holds the bye.
fn record_moved_bye(tournament: &mut Tournament, round: u32, previous: PlayerId, holder: PlayerId) {
    let points = build_standings(&tournament.players, &tournament.matches, round)
        .into_iter()
        .find(|s| s.id == holder)
        .map(|s| s.match_points);
    let name_of = |id: PlayerId| {
        tournament
            .get_player(id)
            .map(|p| p.name.clone())
            .unwrap_or_default()
    };
    let (previous_name, holder_name) = (name_of(previous), name_of(holder));

    let Some(decision) = tournament
        .matches
        .iter_mut()
        .filter(|m| m.round == round)
        .find_map(|m| m.decision_log.as_mut())
    else {
        return;
    };
    decision.bye_reason = Some(format!(
        "Bye moved by hand from {} to {}",
        previous_name, holder_name
    ));
    decision.bye_player_id = Some(holder);
    decision.bye_player_name = Some(holder_name);
    decision.bye_player_points = points;
}

/// Finish the tournament once the current round is fully reported.
pub fn complete_tournament(tournament: &mut Tournament) -> Result<(), TournamentError> {
    if tournament.state != TournamentState::InProgress {
        return Err(TournamentError::InvalidState);
    }
    if !tournament.current_round_complete() {
        return Err(TournamentError::IncompleteResults);
    }
    tournament.state = TournamentState::Completed;
    Ok(())
}

/// Ranked standings including every completed match so far (dropped players included).
pub fn current_standings(tournament: &Tournament) -> Vec<PlayerWithTieBreakers> {
    sort_by_tie_breakers(&build_standings(
        &tournament.players,
        &tournament.matches,
        tournament.current_round + 1,
    ))
}

/// Pairings of the round currently being played.
pub fn current_pairings(tournament: &Tournament) -> Vec<Pairing> {
    let round = tournament.current_round;
    pairing_history(&tournament.players, &tournament.matches, round + 1)
        .into_iter()
        .filter(|p| p.round_number == round)
        .collect()
}
