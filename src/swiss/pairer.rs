//! Round pairing: score-descending matching with rematch avoidance.

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;
use uuid::Uuid;

use super::{Pairing, PlayerState, RoundPlan};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PairingError {
    #[error("round number must be at least 1")]
    InvalidRound,
}

/// Produce the pairings for `round`.
///
/// Players are sorted by score descending (ties keep the order of
/// `players`); with `randomize` set the pool is shuffled first, which the
/// orchestrator requests only for round 1 to break seeding bias. On an odd
/// pool the bye is assigned before matching, to the player with the fewest
/// games (lowest score as tie-break) who has not had one yet; when everyone
/// has, the lowest-ranked player takes another.
///
/// Matching pairs the best remaining player with the best opponent outside
/// their avoid-set, committing a pair only if the rest of the pool can
/// still be matched without a rematch. When no rematch-free matching
/// exists at all, pairing falls back to ignoring avoid-sets rather than
/// leaving players unpaired, and reports it via
/// [`RoundPlan::forced_repeat`].
///
/// A pool of fewer than two players yields an empty plan.
pub fn pair_round<R: Rng + ?Sized>(
    players: &[PlayerState],
    round: u32,
    randomize: bool,
    rng: &mut R,
) -> Result<RoundPlan, PairingError> {
    if round < 1 {
        return Err(PairingError::InvalidRound);
    }

    let mut plan = RoundPlan {
        round,
        pairings: Vec::new(),
        forced_repeat: false,
    };

    if players.len() < 2 {
        return Ok(plan);
    }

    let mut pool: Vec<&PlayerState> = players.iter().collect();
    if randomize {
        pool.shuffle(rng);
    }
    // Stable sort: equal scores keep shuffle/list order.
    pool.sort_by(|a, b| b.score.total_cmp(&a.score));

    let bye = if pool.len() % 2 == 1 {
        let idx = pool
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.received_bye)
            .min_by(|(ia, a), (ib, b)| {
                a.games
                    .cmp(&b.games)
                    .then(a.score.total_cmp(&b.score))
                    // Full tie: the lower-ranked player sits out.
                    .then(ib.cmp(ia))
            })
            .map(|(i, _)| i)
            // Everyone has had a bye: the lowest-ranked player takes another.
            .unwrap_or(pool.len() - 1);
        Some(pool.remove(idx))
    } else {
        None
    };

    let pairs = match match_avoiding_rematches(&pool) {
        Some(pairs) => pairs,
        None => {
            plan.forced_repeat = true;
            match_with_repeats(pool)
        }
    };
    plan.pairings
        .extend(pairs.into_iter().map(|(white, black)| Pairing::Game { white, black }));

    if let Some(p) = bye {
        plan.pairings.push(Pairing::Bye { player: p.id });
    }

    Ok(plan)
}

/// Best-first backtracking over an even pool: the leading player takes the
/// highest-ranked opponent they have not met that leaves the remainder
/// matchable. `None` when every complete matching needs a rematch.
fn match_avoiding_rematches(pool: &[&PlayerState]) -> Option<Vec<(Uuid, Uuid)>> {
    let (first, rest) = match pool.split_first() {
        Some(split) => split,
        None => return Some(Vec::new()),
    };

    for (i, candidate) in rest.iter().enumerate() {
        if first.avoid.contains(&candidate.id) {
            continue;
        }
        let remainder: Vec<&PlayerState> = rest
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, p)| *p)
            .collect();
        if let Some(mut tail) = match_avoiding_rematches(&remainder) {
            let mut pairs = vec![(first.id, candidate.id)];
            pairs.append(&mut tail);
            return Some(pairs);
        }
    }
    None
}

/// Degenerate fallback: same greedy order, avoid-sets consulted but no
/// longer binding.
fn match_with_repeats(mut pool: Vec<&PlayerState>) -> Vec<(Uuid, Uuid)> {
    let mut pairs = Vec::new();
    while pool.len() >= 2 {
        let player = pool.remove(0);
        let idx = pool
            .iter()
            .position(|c| !player.avoid.contains(&c.id))
            .unwrap_or(0);
        let opponent = pool.remove(idx);
        pairs.push((player.id, opponent.id));
    }
    pairs
}
