//! Integration tests for tie-break ranking (OMW% / OOMW%).

use std::collections::HashMap;
use swiss_tournament_web::{
    build_standings, opponent_match_win_percentage, sort_by_tie_breakers, MatchRecord,
    MatchResult, Pairing, Player, PlayerId, PlayerStanding,
};
use uuid::Uuid;

const TOL: f64 = 1e-4;

fn id(n: u128) -> PlayerId {
    Uuid::from_u128(n)
}

fn standing(n: u128, wins: u32, losses: u32, opponents: &[u128]) -> PlayerStanding {
    let mut s = PlayerStanding::new(id(n), format!("P{n}"));
    s.wins = wins;
    s.losses = losses;
    s.matches_played = wins + losses;
    s.match_points = wins * 3;
    s.opponents = opponents.iter().map(|&o| id(o)).collect();
    s
}

fn ids(ranked: &[swiss_tournament_web::PlayerWithTieBreakers]) -> Vec<PlayerId> {
    ranked.iter().map(|p| p.standing.id).collect()
}

#[test]
fn player_without_opponents_has_zero_tie_breakers() {
    let ranked = sort_by_tie_breakers(&[standing(1, 0, 0, &[])]);
    assert_eq!(ranked[0].opponent_match_win_percentage, 0.0);
    assert_eq!(ranked[0].opponent_opponent_match_win_percentage, 0.0);
}

#[test]
fn single_unbeaten_opponent_gives_full_omw() {
    let a = standing(1, 1, 0, &[2]);
    let b = standing(2, 1, 0, &[]);
    let ranked = sort_by_tie_breakers(&[a, b]);
    let a = ranked.iter().find(|p| p.standing.id == id(1)).unwrap();
    assert!((a.opponent_match_win_percentage - 1.0).abs() < TOL);
}

#[test]
fn zero_match_and_unknown_opponents_are_skipped() {
    let z = standing(1, 1, 1, &[2, 3, 99]);
    let never_played = standing(2, 0, 0, &[]);
    let strong = standing(3, 2, 0, &[]);
    let all = [z.clone(), never_played, strong];
    let by_id: HashMap<PlayerId, &PlayerStanding> = all.iter().map(|s| (s.id, s)).collect();
    assert!((opponent_match_win_percentage(&z, &by_id) - 1.0).abs() < TOL);
}

#[test]
fn omw_breaks_ties_on_match_points() {
    let strong = standing(10, 2, 0, &[]);
    let weak = standing(11, 0, 2, &[]);
    let middling = standing(12, 1, 1, &[]);
    // Both on 3 pts: x1 faced 1.0 and 0.0 (OMW 0.5), x2 faced 0.0 and 0.5 (OMW 0.25).
    let x1 = standing(1, 1, 1, &[10, 11]);
    let x2 = standing(2, 1, 1, &[11, 12]);
    let ranked = sort_by_tie_breakers(&[x2, x1, strong, weak, middling]);

    let order = ids(&ranked);
    assert_eq!(order[0], id(10));
    let pos = |n| order.iter().position(|&x| x == id(n)).unwrap();
    assert!(pos(1) < pos(2));

    let x1 = &ranked[pos(1)];
    let x2 = &ranked[pos(2)];
    assert!((x1.opponent_match_win_percentage - 0.5).abs() < TOL);
    assert!((x2.opponent_match_win_percentage - 0.25).abs() < TOL);
}

#[test]
fn oomw_breaks_ties_on_omw() {
    let top = standing(10, 2, 0, &[]);
    let bottom = standing(11, 0, 2, &[]);
    // p and q both 1-1 (rate 0.5); p faced an unbeaten player, q a winless one.
    let p = standing(20, 1, 1, &[10]);
    let q = standing(21, 1, 1, &[11]);
    let y1 = standing(1, 1, 0, &[20]);
    let y2 = standing(2, 1, 0, &[21]);
    let ranked = sort_by_tie_breakers(&[y2, y1, top, bottom, p, q]);

    let y1 = ranked.iter().position(|r| r.standing.id == id(1)).unwrap();
    let y2 = ranked.iter().position(|r| r.standing.id == id(2)).unwrap();
    assert!(y1 < y2);
    assert!((ranked[y1].opponent_match_win_percentage - ranked[y2].opponent_match_win_percentage).abs() < TOL);
    assert!((ranked[y1].opponent_opponent_match_win_percentage - 1.0).abs() < TOL);
    assert!(ranked[y2].opponent_opponent_match_win_percentage.abs() < TOL);
}

#[test]
fn full_ties_keep_input_order() {
    let a = standing(5, 1, 0, &[]);
    let b = standing(3, 1, 0, &[]);
    let c = standing(4, 1, 0, &[]);
    let ranked = sort_by_tie_breakers(&[a, b, c]);
    assert_eq!(ids(&ranked), vec![id(5), id(3), id(4)]);
}

#[test]
fn replayed_round_robin_matches_hand_computed_values() {
    // R1: A>B, C>D. R2: A>C, B>D. R3: A>D, C>B.
    // Records: A 3-0, B 1-2, C 2-1, D 0-3.
    let players: Vec<Player> = ["A", "B", "C", "D"].into_iter().map(Player::new).collect();
    let pid = |i: usize| players[i].id;
    let mut matches = Vec::new();
    for (round, p1, p2) in [(1, 0, 1), (1, 2, 3), (2, 0, 2), (2, 1, 3), (3, 0, 3), (3, 2, 1)] {
        let pairing = Pairing::new_match(round, (pid(p1), String::new()), (pid(p2), String::new()));
        let mut record = MatchRecord::from_pairing(&pairing);
        record.complete(MatchResult::Player1Wins);
        matches.push(record);
    }

    let ranked = sort_by_tie_breakers(&build_standings(&players, &matches, 4));
    let names: Vec<&str> = ranked.iter().map(|p| p.standing.name.as_str()).collect();
    assert_eq!(names, vec!["A", "C", "B", "D"]);

    let get = |name: &str| ranked.iter().find(|p| p.standing.name == name).unwrap();
    assert!((get("A").opponent_match_win_percentage - 1.0 / 3.0).abs() < TOL);
    assert!((get("B").opponent_match_win_percentage - 5.0 / 9.0).abs() < TOL);
    assert!((get("C").opponent_match_win_percentage - 4.0 / 9.0).abs() < TOL);
    assert!((get("D").opponent_match_win_percentage - 2.0 / 3.0).abs() < TOL);
    assert!((get("A").opponent_opponent_match_win_percentage - 5.0 / 9.0).abs() < TOL);
    assert!((get("D").opponent_opponent_match_win_percentage - 4.0 / 9.0).abs() < TOL);
}
