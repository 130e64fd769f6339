//! Properties of the pure pairing engine.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use uuid::Uuid;

use chessclub_core::swiss::{pair_round, Pairing, PairingError, PlayerState};

fn player(score: f64, games: u32) -> PlayerState {
    let mut p = PlayerState::new(Uuid::new_v4());
    p.score = score;
    p.games = games;
    p
}

fn used_ids(pairings: &[Pairing]) -> Vec<Uuid> {
    let mut ids = Vec::new();
    for p in pairings {
        match *p {
            Pairing::Game { white, black } => {
                ids.push(white);
                ids.push(black);
            }
            Pairing::Bye { player } => ids.push(player),
        }
    }
    ids
}

#[test]
fn even_pool_pairs_everyone_once() {
    let players: Vec<PlayerState> = (0..4).map(|_| player(0.0, 0)).collect();
    let mut rng = StdRng::seed_from_u64(1);

    let plan = pair_round(&players, 1, true, &mut rng).unwrap();

    assert_eq!(plan.pairings.len(), 2);
    assert!(plan
        .pairings
        .iter()
        .all(|p| matches!(p, Pairing::Game { .. })));

    let ids = used_ids(&plan.pairings);
    assert_eq!(ids.len(), 4);
    assert_eq!(ids.iter().collect::<HashSet<_>>().len(), 4);
}

#[test]
fn odd_pool_gets_exactly_one_bye() {
    let players: Vec<PlayerState> = (0..5).map(|_| player(0.0, 0)).collect();
    let mut rng = StdRng::seed_from_u64(2);

    let plan = pair_round(&players, 1, true, &mut rng).unwrap();

    let byes = plan
        .pairings
        .iter()
        .filter(|p| matches!(p, Pairing::Bye { .. }))
        .count();
    assert_eq!(byes, 1);
    assert_eq!(plan.pairings.len(), 3);

    let ids = used_ids(&plan.pairings);
    assert_eq!(ids.iter().collect::<HashSet<_>>().len(), 5);
}

#[test]
fn tiny_pool_yields_empty_plan() {
    let mut rng = StdRng::seed_from_u64(3);
    assert!(pair_round(&[], 1, false, &mut rng).unwrap().is_empty());
    assert!(pair_round(&[player(0.0, 0)], 1, false, &mut rng)
        .unwrap()
        .is_empty());
}

#[test]
fn round_zero_is_rejected() {
    let players: Vec<PlayerState> = (0..2).map(|_| player(0.0, 0)).collect();
    let mut rng = StdRng::seed_from_u64(4);
    assert_eq!(
        pair_round(&players, 0, false, &mut rng).unwrap_err(),
        PairingError::InvalidRound
    );
}

#[test]
fn pairing_follows_score_order() {
    // Scores force the order; no shuffle after round 1.
    let players = vec![player(2.0, 2), player(2.0, 2), player(1.0, 2), player(0.0, 2)];
    let mut rng = StdRng::seed_from_u64(5);

    let plan = pair_round(&players, 3, false, &mut rng).unwrap();

    assert_eq!(
        plan.pairings[0],
        Pairing::Game {
            white: players[0].id,
            black: players[1].id
        }
    );
    assert_eq!(
        plan.pairings[1],
        Pairing::Game {
            white: players[2].id,
            black: players[3].id
        }
    );
    assert!(!plan.forced_repeat);
}

#[test]
fn avoid_set_skips_previous_opponent() {
    let mut players = vec![player(2.0, 1), player(2.0, 1), player(1.0, 1), player(0.0, 1)];
    let (a, b) = (players[0].id, players[1].id);
    players[0].avoid.insert(b);
    players[1].avoid.insert(a);
    let mut rng = StdRng::seed_from_u64(6);

    let plan = pair_round(&players, 2, false, &mut rng).unwrap();

    // The two leaders met already, so each takes the next player down.
    assert_eq!(
        plan.pairings[0],
        Pairing::Game {
            white: a,
            black: players[2].id
        }
    );
    assert_eq!(
        plan.pairings[1],
        Pairing::Game {
            white: b,
            black: players[3].id
        }
    );
    assert!(!plan.forced_repeat);
}

#[test]
fn exhausted_pool_repeats_instead_of_failing() {
    let mut players = vec![player(1.0, 1), player(0.0, 1)];
    let (a, b) = (players[0].id, players[1].id);
    players[0].avoid.insert(b);
    players[1].avoid.insert(a);
    let mut rng = StdRng::seed_from_u64(7);

    let plan = pair_round(&players, 2, false, &mut rng).unwrap();

    assert_eq!(plan.pairings, vec![Pairing::Game { white: a, black: b }]);
    assert!(plan.forced_repeat);
}

#[test]
fn bye_goes_to_fewest_games_without_prior_bye() {
    let mut players = vec![player(1.0, 1), player(0.5, 1), player(0.0, 1)];
    players[0].received_bye = true;
    let mut rng = StdRng::seed_from_u64(8);

    let plan = pair_round(&players, 2, false, &mut rng).unwrap();

    // players[0] already had one; of the rest, the lower score wins the tie.
    assert!(plan.pairings.contains(&Pairing::Bye {
        player: players[2].id
    }));
}

#[test]
fn second_bye_allowed_only_when_everyone_had_one() {
    let mut players = vec![player(2.0, 2), player(1.0, 2), player(0.0, 2)];
    for p in &mut players {
        p.received_bye = true;
    }
    let mut rng = StdRng::seed_from_u64(9);

    let plan = pair_round(&players, 3, false, &mut rng).unwrap();

    // Lowest-ranked remaining player takes the repeat bye.
    assert!(plan.pairings.contains(&Pairing::Bye {
        player: players[2].id
    }));
}

#[test]
fn same_seed_reproduces_the_shuffle() {
    let players: Vec<PlayerState> = (0..6).map(|_| player(0.0, 0)).collect();

    let mut rng_a = StdRng::seed_from_u64(42);
    let mut rng_b = StdRng::seed_from_u64(42);
    let plan_a = pair_round(&players, 1, true, &mut rng_a).unwrap();
    let plan_b = pair_round(&players, 1, true, &mut rng_b).unwrap();

    assert_eq!(plan_a.pairings, plan_b.pairings);
}
