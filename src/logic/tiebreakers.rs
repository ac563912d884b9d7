//! Tie-break ranking: match points, then OMW%, then OOMW%.

use crate::models::{PlayerId, PlayerStanding, PlayerWithTieBreakers};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Two percentages closer than this are treated as tied.
pub const TIE_BREAK_EPSILON: f64 = 0.0001;

/// Mean match-win rate of `player`'s opponents.
///
/// Opponents with no matches played (or missing from the snapshot) are left
/// out of both the sum and the count. 0 when nothing is left to average.
pub fn opponent_match_win_percentage(
    player: &PlayerStanding,
    by_id: &HashMap<PlayerId, &PlayerStanding>,
) -> f64 {
    mean(
        player
            .opponents
            .iter()
            .filter_map(|id| by_id.get(id))
            .filter(|o| o.matches_played > 0)
            .map(|o| o.match_win_rate()),
    )
}

/// Mean OMW% of `player`'s opponents, with the same skipping rule.
pub fn opponent_opponent_match_win_percentage(
    player: &PlayerStanding,
    by_id: &HashMap<PlayerId, &PlayerStanding>,
) -> f64 {
    mean(
        player
            .opponents
            .iter()
            .filter_map(|id| by_id.get(id))
            .filter(|o| o.matches_played > 0)
            .map(|o| opponent_match_win_percentage(o, by_id)),
    )
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0u32), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / f64::from(count)
    }
}

/// Descending comparison that treats values within `TIE_BREAK_EPSILON` as equal.
fn compare_desc_with_tolerance(a: f64, b: f64) -> Ordering {
    if (a - b).abs() > TIE_BREAK_EPSILON {
        b.partial_cmp(&a).unwrap_or(Ordering::Equal)
    } else {
        Ordering::Equal
    }
}

fn compare_tie_breakers(a: &PlayerWithTieBreakers, b: &PlayerWithTieBreakers) -> Ordering {
    // TODO: head-to-head tier for players still tied after OOMW%.
    b.standing
        .match_points
        .cmp(&a.standing.match_points)
        .then_with(|| {
            compare_desc_with_tolerance(
                a.opponent_match_win_percentage,
                b.opponent_match_win_percentage,
            )
        })
        .then_with(|| {
            compare_desc_with_tolerance(
                a.opponent_opponent_match_win_percentage,
                b.opponent_opponent_match_win_percentage,
            )
        })
}

/// Compute tie-breakers for every player and return them ranked best first.
///
/// Stable: players tied on every criterion keep their input order.
pub fn sort_by_tie_breakers(standings: &[PlayerStanding]) -> Vec<PlayerWithTieBreakers> {
    let by_id: HashMap<PlayerId, &PlayerStanding> = standings.iter().map(|s| (s.id, s)).collect();
    let mut ranked: Vec<PlayerWithTieBreakers> = standings
        .iter()
        .map(|s| PlayerWithTieBreakers {
            standing: s.clone(),
            opponent_match_win_percentage: opponent_match_win_percentage(s, &by_id),
            opponent_opponent_match_win_percentage: opponent_opponent_match_win_percentage(s, &by_id),
        })
        .collect();
    ranked.sort_by(compare_tie_breakers);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerance_band_declares_ties() {
        assert_eq!(compare_desc_with_tolerance(0.5, 0.50005), Ordering::Equal);
        assert_eq!(compare_desc_with_tolerance(0.6, 0.5), Ordering::Less);
        assert_eq!(compare_desc_with_tolerance(0.4, 0.5), Ordering::Greater);
    }

    #[test]
    fn mean_of_nothing_is_zero() {
        assert_eq!(mean(std::iter::empty()), 0.0);
        assert!((mean([1.0, 0.0, 0.5].into_iter()) - 0.5).abs() < 1e-12);
    }
}
