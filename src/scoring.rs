//! Stat contribution table for match results.
//!
//! Result edits are idempotent: the orchestrator subtracts the previous
//! result's contribution and adds the new one, so re-setting a result any
//! number of times lands on the same totals.

use std::ops::Sub;

use crate::store::models::{MatchResult, Side};

/// Signed change to a participant's cumulative stats.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StatDelta {
    pub points: f64,
    pub wins: i32,
    pub draws: i32,
    pub losses: i32,
    pub games: i32,
}

impl StatDelta {
    pub fn is_zero(self) -> bool {
        self == StatDelta::default()
    }
}

impl Sub for StatDelta {
    type Output = StatDelta;

    fn sub(self, rhs: StatDelta) -> StatDelta {
        StatDelta {
            points: self.points - rhs.points,
            wins: self.wins - rhs.wins,
            draws: self.draws - rhs.draws,
            losses: self.losses - rhs.losses,
            games: self.games - rhs.games,
        }
    }
}

/// Flat award for an unpaired player: a full point and a win, like the
/// pre-resolved match it stands for.
pub const BYE_AWARD: StatDelta = StatDelta {
    points: 1.0,
    wins: 1,
    draws: 0,
    losses: 0,
    games: 1,
};

/// What `result` contributes to the stats of the player on `side`.
/// `None` (pending) contributes nothing, so the delta of a first-time
/// result set is the full contribution.
pub fn contribution(result: Option<MatchResult>, side: Side) -> StatDelta {
    let result = match result {
        Some(r) => r,
        None => return StatDelta::default(),
    };

    if result == MatchResult::Draw {
        return StatDelta {
            points: 0.5,
            draws: 1,
            games: 1,
            ..StatDelta::default()
        };
    }

    let won = matches!(
        (result, side),
        (MatchResult::WhiteWin, Side::White) | (MatchResult::BlackWin, Side::Black)
    );

    StatDelta {
        points: if won { 1.0 } else { 0.0 },
        wins: if won { 1 } else { 0 },
        losses: if won { 0 } else { 1 },
        draws: 0,
        games: 1,
    }
}
