//! Rematch detection over the pairing history.

use crate::models::{Pairing, PlayerId};
use std::collections::HashSet;

/// True iff any historical non-bye pairing matches the unordered pair `{a, b}`.
pub fn have_played_before(a: PlayerId, b: PlayerId, previous_pairings: &[Pairing]) -> bool {
    previous_pairings.iter().any(|p| match p.player2_id {
        Some(p2) => (p.player1_id == a && p2 == b) || (p.player1_id == b && p2 == a),
        None => false,
    })
}

/// Unordered-pair index of past real matches, for repeated rematch lookups.
#[derive(Clone, Debug, Default)]
pub struct PairingHistory {
    met: HashSet<(PlayerId, PlayerId)>,
}

impl PairingHistory {
    pub fn from_pairings(previous_pairings: &[Pairing]) -> Self {
        let met = previous_pairings
            .iter()
            .filter_map(|p| p.player2_id.map(|p2| pair_key(p.player1_id, p2)))
            .collect();
        Self { met }
    }

    pub fn have_met(&self, a: PlayerId, b: PlayerId) -> bool {
        self.met.contains(&pair_key(a, b))
    }

    pub fn len(&self) -> usize {
        self.met.len()
    }

    pub fn is_empty(&self) -> bool {
        self.met.is_empty()
    }
}

/// Canonical (smaller, larger) key for an unordered pair.
pub(crate) fn pair_key(a: PlayerId, b: PlayerId) -> (PlayerId, PlayerId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn id(n: u128) -> PlayerId {
        Uuid::from_u128(n)
    }

    #[test]
    fn detects_meeting_in_either_order_and_ignores_byes() {
        let history = vec![
            Pairing::new_match(1, (id(1), "A".into()), (id(2), "B".into())),
            Pairing::new_bye(1, id(3), "C".into()),
        ];
        assert!(have_played_before(id(2), id(1), &history));
        assert!(!have_played_before(id(1), id(3), &history));
        assert!(!have_played_before(id(3), id(3), &history));

        let index = PairingHistory::from_pairings(&history);
        assert!(index.have_met(id(1), id(2)));
        assert!(index.have_met(id(2), id(1)));
        assert!(!index.have_met(id(1), id(3)));
        assert_eq!(index.len(), 1);
    }
}
