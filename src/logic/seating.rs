//! Table numbering with static seats, layered on top of finished pairings.

use crate::logic::rounds::current_pairings;
use crate::models::{Pairing, PlayerId, Tournament};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// One table and the pairing played there (index into the pairing list).
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct TableAssignment {
    pub table: u32,
    pub pairing_index: usize,
}

/// Two statically seated players were paired together; only one keeps their seat.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct SeatConflict {
    pub pairing_index: usize,
    pub winner: PlayerId,
    pub winner_seat: u32,
    pub loser: PlayerId,
    pub loser_seat: u32,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct SeatingPlan {
    /// Ordered by table number.
    pub tables: Vec<TableAssignment>,
    pub conflicts: Vec<SeatConflict>,
}

/// Number the tables for a round.
///
/// A pairing with a statically seated player sits at that seat; when both
/// players have one, the lower seat wins and the other is logged as a
/// conflict. A seat already claimed by an earlier pairing is not reused.
/// Remaining pairings take the lowest free numbers. Byes get no table.
pub fn assign_tables(pairings: &[Pairing], static_seats: &HashMap<PlayerId, u32>) -> SeatingPlan {
    let mut plan = SeatingPlan::default();
    let mut taken: BTreeSet<u32> = BTreeSet::new();
    let mut free: Vec<usize> = Vec::new();

    for (idx, p) in pairings.iter().enumerate() {
        let Some(p2) = p.player2_id else { continue };
        let seat1 = static_seats.get(&p.player1_id).copied();
        let seat2 = static_seats.get(&p2).copied();
        let claim = match (seat1, seat2) {
            (Some(s1), Some(s2)) => {
                let (winner, winner_seat, loser, loser_seat) = if s1 <= s2 {
                    (p.player1_id, s1, p2, s2)
                } else {
                    (p2, s2, p.player1_id, s1)
                };
                plan.conflicts.push(SeatConflict {
                    pairing_index: idx,
                    winner,
                    winner_seat,
                    loser,
                    loser_seat,
                });
                Some(winner_seat)
            }
            (Some(s), None) | (None, Some(s)) => Some(s),
            (None, None) => None,
        };
        match claim {
            Some(seat) if taken.insert(seat) => plan.tables.push(TableAssignment {
                table: seat,
                pairing_index: idx,
            }),
            Some(seat) => {
                log::warn!("Static seat {} claimed twice in round {}", seat, p.round_number);
                free.push(idx);
            }
            None => free.push(idx),
        }
    }

    let mut next = 1;
    for idx in free {
        while taken.contains(&next) {
            next += 1;
        }
        taken.insert(next);
        plan.tables.push(TableAssignment {
            table: next,
            pairing_index: idx,
        });
    }
    plan.tables.sort_by_key(|t| t.table);
    plan
}

/// Seating for the round currently being played, with the pairings it indexes into.
pub fn seat_current_round(tournament: &Tournament) -> (Vec<Pairing>, SeatingPlan) {
    let seats: HashMap<PlayerId, u32> = tournament
        .players
        .iter()
        .filter_map(|p| p.static_seat.map(|s| (p.id, s)))
        .collect();
    let pairings = current_pairings(tournament);
    let plan = assign_tables(&pairings, &seats);
    (pairings, plan)
}
