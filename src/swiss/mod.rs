//! Swiss pairing engine: pure functions from player state to round plans.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

pub mod pairer;
pub mod state;

pub use pairer::{pair_round, PairingError};
pub use state::rebuild;

/// Call-local view of one participant, rebuilt from the match log at the
/// start of every pairing request. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: Uuid,
    /// Current cumulative score, taken from the persisted participant row.
    pub score: f64,
    /// Completed games, byes included. Drives bye selection.
    pub games: u32,
    /// Opponents already faced; candidates to skip when pairing.
    pub avoid: HashSet<Uuid>,
    pub received_bye: bool,
}

impl PlayerState {
    pub fn new(id: Uuid) -> Self {
        PlayerState {
            id,
            score: 0.0,
            games: 0,
            avoid: HashSet::new(),
            received_bye: false,
        }
    }
}

/// One slot of a generated round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pairing {
    Game { white: Uuid, black: Uuid },
    Bye { player: Uuid },
}

/// Everything the engine decided for one round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundPlan {
    pub round: u32,
    pub pairings: Vec<Pairing>,
    /// True when at least one pairing repeats an earlier opponent because
    /// no legal alternative existed.
    pub forced_repeat: bool,
}

impl RoundPlan {
    pub fn is_empty(&self) -> bool {
        self.pairings.is_empty()
    }
}
