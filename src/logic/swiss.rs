//! Swiss pairing: byes, score brackets, floaters and rematch avoidance.
//!
//! Round 1 shuffles the field. From round 2 on, players are split into score
//! brackets and paired top-down; an odd bracket pushes one floater into the
//! next bracket. Inside a bracket a greedy scan runs first, then a bounded
//! search if greedy left a rematch. Floater choices are searched across the
//! whole round, so a rematch is only kept when no choice of floaters gives a
//! rematch-free round. The finished round is audited before it is returned.

use crate::logic::history::{pair_key, PairingHistory};
use crate::models::{
    FloatDetail, Pairing, PairingDecisionLog, PairingResult, PairingStage, PlayerId,
    PlayerStanding, calculate_match_points,
};
use rand::seq::SliceRandom;
use rand::Rng;
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap, HashSet};
use thiserror::Error;

/// Upper bound on search nodes per bracket attempt in the rematch-free search.
pub const SEARCH_NODE_BUDGET: usize = 50_000;

/// Upper bound on bracket attempts per pass of the floater search.
pub const FLOATER_SEARCH_BUDGET: usize = 2_000;

/// Fatal pairing failures: bad input, or a self-audit failure in the engine itself.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum PairingError {
    #[error("round number must be at least 1 (got {0})")]
    InvalidRound(u32),
    #[error("player {0} appears more than once in the standings")]
    DuplicatePlayer(PlayerId),
    #[error("player {player} has {actual} match points but the record gives {expected}")]
    MatchPointsMismatch {
        player: PlayerId,
        expected: u32,
        actual: u32,
    },
    #[error("internal consistency violation: {0}")]
    InternalConsistency(String),
    #[error("avoidable rematch between {player1} and {player2}")]
    AvoidableRematch { player1: PlayerId, player2: PlayerId },
    #[error("avoidable {gap}-point float between {player1} and {player2}")]
    AvoidableFloat {
        player1: PlayerId,
        player2: PlayerId,
        gap: u32,
    },
}

impl PairingError {
    /// True for precondition violations (the caller fed a bad snapshot).
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            PairingError::InvalidRound(_)
                | PairingError::DuplicatePlayer(_)
                | PairingError::MatchPointsMismatch { .. }
        )
    }
}

/// Generate the pairings for `round_number` from the current standings and full history.
///
/// `rng` is only used by round 1's shuffle; later rounds are deterministic.
pub fn generate_swiss_pairings<R: Rng + ?Sized>(
    standings: &[PlayerStanding],
    round_number: u32,
    previous_pairings: &[Pairing],
    rng: &mut R,
) -> Result<PairingResult, PairingError> {
    validate_standings(standings, round_number)?;
    let history = PairingHistory::from_pairings(previous_pairings);

    let plan = if round_number == 1 {
        plan_first_round(standings, rng)
    } else {
        plan_bracket_round(standings, round_number, &history)?
    };
    audit_plan(&plan, standings, &history)?;

    let by_id: HashMap<PlayerId, &PlayerStanding> = standings.iter().map(|s| (s.id, s)).collect();
    let result = assemble_result(&plan, &by_id, round_number, &history);
    if let Some(decision) = &result.decision_log {
        log::info!(
            "Round {}: {} pairings, stage {:?}, max float {}, {} rematch(es)",
            round_number,
            result.pairings.len(),
            decision.stage_used,
            decision.max_float_distance,
            decision.rematch_count
        );
    }
    Ok(result)
}

/// Reject snapshots that break the standing invariants.
fn validate_standings(standings: &[PlayerStanding], round_number: u32) -> Result<(), PairingError> {
    if round_number < 1 {
        return Err(PairingError::InvalidRound(round_number));
    }
    let mut seen = HashSet::with_capacity(standings.len());
    for s in standings {
        if !seen.insert(s.id) {
            return Err(PairingError::DuplicatePlayer(s.id));
        }
        let expected = calculate_match_points(s.wins, s.draws);
        if s.match_points != expected {
            return Err(PairingError::MatchPointsMismatch {
                player: s.id,
                expected,
                actual: s.match_points,
            });
        }
    }
    Ok(())
}

/// Stable per-round tie-break value (FNV-1a over a round seed and the player id).
fn seeded_hash(round_number: u32, id: PlayerId) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;
    format!("swiss-round-{round_number}:{id}")
        .bytes()
        .fold(FNV_OFFSET, |h, b| (h ^ u64::from(b)).wrapping_mul(FNV_PRIME))
}

/// Everything decided for a round, before it is turned into `Pairing`s.
#[derive(Debug, Default)]
struct RoundPlan {
    pairs: Vec<(PlayerId, PlayerId)>,
    bye: Option<PlayerId>,
    bye_reason: Option<String>,
    float_reasons: BTreeMap<PlayerId, String>,
    /// Rematch pairs kept after the floater search found no rematch-free round.
    forced_pairs: HashSet<(PlayerId, PlayerId)>,
    /// Carry-overs that were floated a second time.
    refloated: HashSet<PlayerId>,
    /// Distinct scores of the pairing pool, highest first.
    score_groups: Vec<u32>,
    stage: PairingStage,
}

// ---------------------------------------------------------------------------
// Round 1
// ---------------------------------------------------------------------------

fn plan_first_round<R: Rng + ?Sized>(standings: &[PlayerStanding], rng: &mut R) -> RoundPlan {
    let mut pool: Vec<&PlayerStanding> = standings.iter().collect();
    let mut plan = RoundPlan {
        stage: PairingStage::RandomFirstRound,
        ..RoundPlan::default()
    };

    if pool.len() % 2 == 1 {
        pool.sort_by_key(|s| (s.byes_received, s.match_points, seeded_hash(1, s.id)));
        let chosen = pool.remove(0);
        let tied = pool
            .iter()
            .filter(|s| s.byes_received == chosen.byes_received)
            .count()
            + 1;
        plan.bye_reason = Some(if tied == 1 {
            format!("Only player with {} bye(s) so far", chosen.byes_received)
        } else {
            format!(
                "Seeded draw among {} players with {} bye(s) so far",
                tied, chosen.byes_received
            )
        });
        plan.bye = Some(chosen.id);
    }

    pool.shuffle(rng);
    plan.pairs = pool.chunks_exact(2).map(|c| (c[0].id, c[1].id)).collect();
    plan
}

// ---------------------------------------------------------------------------
// Round 2+
// ---------------------------------------------------------------------------

fn plan_bracket_round(
    standings: &[PlayerStanding],
    round_number: u32,
    history: &PairingHistory,
) -> Result<RoundPlan, PairingError> {
    let mut pool: Vec<&PlayerStanding> = standings.iter().collect();
    let mut plan = RoundPlan::default();

    if pool.len() % 2 == 1 {
        pool.sort_by_key(|s| (s.match_points, s.byes_received, seeded_hash(round_number, s.id)));
        let chosen = pool.remove(0);
        plan.bye_reason = Some(bye_reason(chosen, &pool));
        plan.bye = Some(chosen.id);
    }

    let mut grouped: BTreeMap<u32, Vec<&PlayerStanding>> = BTreeMap::new();
    for &s in &pool {
        grouped.entry(s.match_points).or_default().push(s);
    }
    let brackets: Vec<Bracket> = grouped.into_iter().rev().collect();
    plan.score_groups = brackets.iter().map(|&(points, _)| points).collect();

    let steps = resolve_brackets(&brackets, round_number, history)?;
    for step in steps {
        let size = step.outcome.pairs.len() * 2 + usize::from(step.floater.is_some());
        if let Some(floater) = step.floater {
            let reason = match step.carry_in {
                Some(c) if c.id == floater.id => {
                    plan.refloated.insert(floater.id);
                    format!(
                        "Carried over from {} pts and floated again from the {}-point bracket: floating a native player would have forced a rematch",
                        floater.match_points, step.points
                    )
                }
                Some(c) => format!(
                    "Floated down from the {}-point bracket ({} players including a carry-over from {} pts)",
                    step.points, size, c.match_points
                ),
                None => format!(
                    "Floated down from the {}-point bracket ({} players, odd)",
                    step.points, size
                ),
            };
            log::debug!("{} ({}): {}", floater.name, floater.id, reason);
            plan.float_reasons.insert(floater.id, reason);
        }

        if step.outcome.stage == PairingStage::ForcedRematch {
            log::warn!(
                "No rematch-free pairing in the {}-point bracket ({} players); keeping forced rematch(es)",
                step.points,
                size - usize::from(step.floater.is_some())
            );
            plan.forced_pairs
                .extend(step.outcome.pairs.iter().map(|&(a, b)| pair_key(a, b)));
        }
        plan.stage = plan.stage.max(step.outcome.stage);
        plan.pairs.extend(step.outcome.pairs);
    }
    Ok(plan)
}

fn bye_reason(chosen: &PlayerStanding, rest: &[&PlayerStanding]) -> String {
    let same_points: Vec<&&PlayerStanding> = rest
        .iter()
        .filter(|s| s.match_points == chosen.match_points)
        .collect();
    if same_points.is_empty() {
        return format!("Lowest score in the field ({} pts)", chosen.match_points);
    }
    let tied = same_points.len() + 1;
    let same_byes = same_points
        .iter()
        .filter(|s| s.byes_received == chosen.byes_received)
        .count();
    if same_byes == 0 {
        return format!(
            "Fewest byes ({}) among {} players tied on the lowest score ({} pts)",
            chosen.byes_received, tied, chosen.match_points
        );
    }
    if chosen.byes_received > 0 {
        format!(
            "All {} players on the lowest score ({} pts) already had a bye; seeded tie-break among {} with {} bye(s)",
            tied,
            chosen.match_points,
            same_byes + 1,
            chosen.byes_received
        )
    } else {
        format!(
            "Seeded tie-break among {} players on the lowest score ({} pts) without a bye",
            same_byes + 1,
            chosen.match_points
        )
    }
}

/// A score bracket: its points and its native members.
type Bracket<'a> = (u32, Vec<&'a PlayerStanding>);

/// How one score bracket was resolved.
#[derive(Debug)]
struct BracketStep<'a> {
    points: u32,
    carry_in: Option<&'a PlayerStanding>,
    floater: Option<&'a PlayerStanding>,
    outcome: BracketOutcome,
}

/// Resolve every bracket top-down.
///
/// The whole round is searched for a rematch-free resolution first, once
/// with native floaters only and once allowing a carry-over to float again.
/// Only when both fail are brackets resolved one by one with forced rematches.
fn resolve_brackets<'a>(
    brackets: &[Bracket<'a>],
    round_number: u32,
    history: &PairingHistory,
) -> Result<Vec<BracketStep<'a>>, PairingError> {
    for allow_refloat in [false, true] {
        let mut steps = Vec::with_capacity(brackets.len());
        let mut budget = FLOATER_SEARCH_BUDGET;
        if resolve_rematch_free(brackets, None, allow_refloat, history, &mut budget, &mut steps) {
            return Ok(steps);
        }
        if budget == 0 {
            log::warn!(
                "Round {}: floater search budget exhausted (refloat allowed: {})",
                round_number,
                allow_refloat
            );
        }
    }
    resolve_forced(brackets, history)
}

/// Depth-first search over floater choices; on success `steps` holds one entry per bracket.
fn resolve_rematch_free<'a>(
    brackets: &[Bracket<'a>],
    carry: Option<&'a PlayerStanding>,
    allow_refloat: bool,
    history: &PairingHistory,
    budget: &mut usize,
    steps: &mut Vec<BracketStep<'a>>,
) -> bool {
    let Some(((points, natives), lower)) = brackets.split_first() else {
        return carry.is_none();
    };
    if *budget == 0 {
        return false;
    }
    *budget -= 1;

    let odd = (natives.len() + usize::from(carry.is_some())) % 2 == 1;
    let options: Vec<Option<&PlayerStanding>> = if odd {
        let mut candidates = floater_candidates(natives, carry);
        if !allow_refloat {
            candidates.retain(|s| carry.map_or(true, |c| c.id != s.id));
        }
        candidates.into_iter().map(Some).collect()
    } else {
        vec![None]
    };

    for floater in options {
        let (rest, carry_in) = split_members(natives, carry, floater);
        let Some(outcome) = pair_rematch_free(&rest, carry_in, history) else {
            continue;
        };
        steps.push(BracketStep {
            points: *points,
            carry_in: carry,
            floater,
            outcome,
        });
        if resolve_rematch_free(lower, floater, allow_refloat, history, budget, steps) {
            return true;
        }
        steps.pop();
        if *budget == 0 {
            return false;
        }
    }
    false
}

/// Bracket-by-bracket resolution that keeps rematches where a bracket cannot avoid them.
fn resolve_forced<'a>(
    brackets: &[Bracket<'a>],
    history: &PairingHistory,
) -> Result<Vec<BracketStep<'a>>, PairingError> {
    let mut steps = Vec::with_capacity(brackets.len());
    let mut carry: Option<&PlayerStanding> = None;
    for (i, (points, natives)) in brackets.iter().enumerate() {
        let below: &[&PlayerStanding] = brackets
            .get(i + 1)
            .map(|(_, next)| next.as_slice())
            .unwrap_or_default();
        let odd = (natives.len() + usize::from(carry.is_some())) % 2 == 1;
        let step = if odd {
            let choice = choose_floater(natives, carry, below, history);
            BracketStep {
                points: *points,
                carry_in: carry,
                floater: Some(choice.floater),
                outcome: choice.outcome,
            }
        } else {
            let (members, carry_in) = split_members(natives, carry, None);
            BracketStep {
                points: *points,
                carry_in: carry,
                floater: None,
                outcome: pair_bracket(&members, carry_in, history),
            }
        };
        carry = step.floater;
        steps.push(step);
    }

    if let Some(left) = carry {
        return Err(PairingError::InternalConsistency(format!(
            "floater {} was never absorbed by a lower bracket",
            left.id
        )));
    }
    Ok(steps)
}

/// Floater order for an odd bracket: natives weakest first, the carry-over last.
fn floater_candidates<'a>(
    natives: &[&'a PlayerStanding],
    carry: Option<&'a PlayerStanding>,
) -> Vec<&'a PlayerStanding> {
    let mut candidates = natives.to_vec();
    candidates.sort_by_key(|s| (s.byes_received, s.match_points, s.id));
    candidates.extend(carry);
    candidates
}

/// Bracket members without `floater`, carry-over first, and the carry-over id if it stays.
fn split_members<'a>(
    natives: &[&'a PlayerStanding],
    carry: Option<&'a PlayerStanding>,
    floater: Option<&PlayerStanding>,
) -> (Vec<&'a PlayerStanding>, Option<PlayerId>) {
    let stays = |s: &&PlayerStanding| floater.map_or(true, |f| f.id != s.id);
    let carry = carry.filter(stays);
    let mut members = Vec::with_capacity(natives.len() + 1);
    members.extend(carry);
    members.extend(natives.iter().copied().filter(stays));
    (members, carry.map(|c| c.id))
}

struct FloaterChoice<'a> {
    floater: &'a PlayerStanding,
    outcome: BracketOutcome,
}

/// Pick the floater of an odd bracket when the round as a whole cannot avoid a rematch.
///
/// A candidate whose removal leaves a rematch-free bracket and who still has a
/// fresh opponent in `below` is preferred, then any candidate leaving a
/// rematch-free bracket. Without one the weakest native floats and the rest is
/// paired with forced rematches.
fn choose_floater<'a>(
    natives: &[&'a PlayerStanding],
    carry: Option<&'a PlayerStanding>,
    below: &[&PlayerStanding],
    history: &PairingHistory,
) -> FloaterChoice<'a> {
    let candidates = floater_candidates(natives, carry);
    let fresh_below = |f: &PlayerStanding| below.iter().any(|s| !history.have_met(f.id, s.id));

    let mut fallback: Option<FloaterChoice<'a>> = None;
    for &candidate in &candidates {
        let (rest, carry_in) = split_members(natives, carry, Some(candidate));
        if let Some(outcome) = pair_rematch_free(&rest, carry_in, history) {
            if fresh_below(candidate) {
                return FloaterChoice {
                    floater: candidate,
                    outcome,
                };
            }
            if fallback.is_none() {
                fallback = Some(FloaterChoice {
                    floater: candidate,
                    outcome,
                });
            }
        }
    }
    if let Some(choice) = fallback {
        return choice;
    }

    let floater = candidates[0];
    let (rest, carry_in) = split_members(natives, carry, Some(floater));
    let outcome = BracketOutcome {
        pairs: greedy_pairs(&rank_members(&rest, carry_in), history),
        stage: PairingStage::ForcedRematch,
    };
    FloaterChoice { floater, outcome }
}

#[derive(Debug)]
struct BracketOutcome {
    pairs: Vec<(PlayerId, PlayerId)>,
    stage: PairingStage,
}

/// Pair an even-sized bracket, falling back to forced rematches only when unavoidable.
fn pair_bracket(
    members: &[&PlayerStanding],
    carry_in: Option<PlayerId>,
    history: &PairingHistory,
) -> BracketOutcome {
    pair_rematch_free(members, carry_in, history).unwrap_or_else(|| BracketOutcome {
        pairs: greedy_pairs(&rank_members(members, carry_in), history),
        stage: PairingStage::ForcedRematch,
    })
}

/// Greedy first; bounded search if greedy produced a rematch. None if neither is rematch-free.
fn pair_rematch_free(
    members: &[&PlayerStanding],
    carry_in: Option<PlayerId>,
    history: &PairingHistory,
) -> Option<BracketOutcome> {
    let ranked = rank_members(members, carry_in);
    let greedy = greedy_pairs(&ranked, history);
    if greedy.iter().all(|&(a, b)| !history.have_met(a, b)) {
        return Some(BracketOutcome {
            pairs: greedy,
            stage: PairingStage::Greedy,
        });
    }

    let mut used = vec![false; ranked.len()];
    let mut pairs = Vec::with_capacity(ranked.len() / 2);
    let mut budget = SEARCH_NODE_BUDGET;
    if search_rematch_free(&ranked, history, &mut used, &mut pairs, &mut budget) {
        Some(BracketOutcome {
            pairs: pairs
                .into_iter()
                .map(|(i, j)| (ranked[i].id, ranked[j].id))
                .collect(),
            stage: PairingStage::Backtracking,
        })
    } else {
        if budget == 0 {
            log::warn!(
                "Rematch search budget exhausted for a {}-player bracket",
                ranked.len()
            );
        }
        None
    }
}

/// Pairing priority: carry-over first, then fewest byes, then id.
fn rank_members<'a>(
    members: &[&'a PlayerStanding],
    carry_in: Option<PlayerId>,
) -> Vec<&'a PlayerStanding> {
    let mut ranked = members.to_vec();
    ranked.sort_by_key(|s| (Some(s.id) != carry_in, s.byes_received, s.id));
    ranked
}

/// Lower is better: same score and fresh, same score rematch, cross-score fresh, cross-score rematch.
fn preference(a: &PlayerStanding, b: &PlayerStanding, history: &PairingHistory) -> u8 {
    let cross = u8::from(a.match_points != b.match_points);
    let rematch = u8::from(history.have_met(a.id, b.id));
    cross * 2 + rematch
}

fn greedy_pairs(ranked: &[&PlayerStanding], history: &PairingHistory) -> Vec<(PlayerId, PlayerId)> {
    let mut paired = vec![false; ranked.len()];
    let mut pairs = Vec::with_capacity(ranked.len() / 2);
    for i in 0..ranked.len() {
        if paired[i] {
            continue;
        }
        paired[i] = true;
        let best = (i + 1..ranked.len())
            .filter(|&j| !paired[j])
            .min_by_key(|&j| preference(ranked[i], ranked[j], history));
        if let Some(j) = best {
            paired[j] = true;
            pairs.push((ranked[i].id, ranked[j].id));
        }
    }
    pairs
}

fn search_rematch_free(
    ranked: &[&PlayerStanding],
    history: &PairingHistory,
    used: &mut [bool],
    pairs: &mut Vec<(usize, usize)>,
    budget: &mut usize,
) -> bool {
    let Some(i) = used.iter().position(|u| !u) else {
        return true;
    };
    if *budget == 0 {
        return false;
    }
    *budget -= 1;

    used[i] = true;
    let mut candidates: Vec<usize> = (i + 1..ranked.len())
        .filter(|&j| !used[j] && !history.have_met(ranked[i].id, ranked[j].id))
        .collect();
    candidates.sort_by_key(|&j| preference(ranked[i], ranked[j], history));
    for j in candidates {
        used[j] = true;
        pairs.push((i, j));
        if search_rematch_free(ranked, history, used, pairs, budget) {
            return true;
        }
        pairs.pop();
        used[j] = false;
    }
    used[i] = false;
    false
}

// ---------------------------------------------------------------------------
// Self-audit and output
// ---------------------------------------------------------------------------

fn audit_plan(
    plan: &RoundPlan,
    standings: &[PlayerStanding],
    history: &PairingHistory,
) -> Result<(), PairingError> {
    let n = standings.len();
    let total = plan.pairs.len() + usize::from(plan.bye.is_some());
    if total != n.div_ceil(2) {
        return Err(PairingError::InternalConsistency(format!(
            "expected {} pairings for {} players, produced {}",
            n.div_ceil(2),
            n,
            total
        )));
    }
    if usize::from(plan.bye.is_some()) != n % 2 {
        return Err(PairingError::InternalConsistency(format!(
            "wrong bye count for {} players",
            n
        )));
    }

    let mut seen: HashMap<PlayerId, usize> = HashMap::with_capacity(n);
    let mut unique_pairs = HashSet::with_capacity(plan.pairs.len());
    for &(a, b) in &plan.pairs {
        if a == b {
            return Err(PairingError::InternalConsistency(format!(
                "player {} paired against themselves",
                a
            )));
        }
        if !unique_pairs.insert(pair_key(a, b)) {
            return Err(PairingError::InternalConsistency(format!(
                "pairing {} vs {} appears twice",
                a, b
            )));
        }
        *seen.entry(a).or_default() += 1;
        *seen.entry(b).or_default() += 1;
    }
    if let Some(bye) = plan.bye {
        *seen.entry(bye).or_default() += 1;
    }
    for s in standings {
        match seen.remove(&s.id) {
            Some(1) => {}
            Some(k) => {
                return Err(PairingError::InternalConsistency(format!(
                    "player {} appears in {} pairings",
                    s.id, k
                )))
            }
            None => {
                return Err(PairingError::InternalConsistency(format!(
                    "player {} is missing from the pairings",
                    s.id
                )))
            }
        }
    }
    if let Some(stray) = seen.keys().next() {
        return Err(PairingError::InternalConsistency(format!(
            "unknown player {} in the pairings",
            stray
        )));
    }

    if plan.stage == PairingStage::RandomFirstRound {
        return Ok(());
    }

    let points: HashMap<PlayerId, u32> = standings.iter().map(|s| (s.id, s.match_points)).collect();
    let group_index: HashMap<u32, usize> = plan
        .score_groups
        .iter()
        .enumerate()
        .map(|(i, &p)| (p, i))
        .collect();
    for &(a, b) in &plan.pairs {
        if history.have_met(a, b) && !plan.forced_pairs.contains(&pair_key(a, b)) {
            return Err(PairingError::AvoidableRematch {
                player1: a,
                player2: b,
            });
        }
        let (pa, pb) = (points[&a], points[&b]);
        let step = group_index[&pa].abs_diff(group_index[&pb]);
        if step > 1 && !plan.refloated.contains(&a) && !plan.refloated.contains(&b) {
            return Err(PairingError::AvoidableFloat {
                player1: a,
                player2: b,
                gap: pa.abs_diff(pb),
            });
        }
    }
    Ok(())
}

fn assemble_result(
    plan: &RoundPlan,
    by_id: &HashMap<PlayerId, &PlayerStanding>,
    round_number: u32,
    history: &PairingHistory,
) -> PairingResult {
    let entry = |id: PlayerId| (id, by_id[&id].name.clone());

    let mut matches: Vec<(&PlayerStanding, &PlayerStanding)> = plan
        .pairs
        .iter()
        .map(|&(a, b)| {
            let (a, b) = (by_id[&a], by_id[&b]);
            if (Reverse(a.match_points), a.id) <= (Reverse(b.match_points), b.id) {
                (a, b)
            } else {
                (b, a)
            }
        })
        .collect();
    matches.sort_by_key(|(p1, p2)| {
        (
            Reverse(p1.match_points.max(p2.match_points)),
            Reverse(p1.match_points + p2.match_points),
            pair_key(p1.id, p2.id),
        )
    });

    let max_float_distance = matches
        .iter()
        .map(|(p1, p2)| p1.match_points.abs_diff(p2.match_points))
        .max()
        .unwrap_or(0);
    let rematch_count = matches
        .iter()
        .filter(|(p1, p2)| history.have_met(p1.id, p2.id))
        .count() as u32;

    let mut pairings: Vec<Pairing> = matches
        .iter()
        .map(|(p1, p2)| Pairing::new_match(round_number, entry(p1.id), entry(p2.id)))
        .collect();

    let mut decision = PairingDecisionLog {
        bye_reason: plan.bye_reason.clone(),
        float_reasons: plan.float_reasons.clone(),
        max_float_distance,
        rematch_count,
        stage_used: plan.stage,
        float_details: plan
            .float_reasons
            .iter()
            .map(|(&id, reason)| FloatDetail {
                player_id: id,
                player_name: by_id[&id].name.clone(),
                reason: reason.clone(),
            })
            .collect(),
        ..PairingDecisionLog::default()
    };

    if let Some(bye) = plan.bye {
        let s = by_id[&bye];
        decision.bye_player_id = Some(s.id);
        decision.bye_player_name = Some(s.name.clone());
        decision.bye_player_points = Some(s.match_points);
        pairings.push(Pairing::new_bye(round_number, s.id, s.name.clone()));
    }

    PairingResult {
        pairings,
        decision_log: Some(decision),
    }
}
