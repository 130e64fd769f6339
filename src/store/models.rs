//! Persisted tournament entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tournament {
    pub id: Uuid,
    pub name: String,
    /// User id of the creator; the only caller allowed to mutate pairings.
    pub owner_id: Uuid,
    pub finalized: bool,
    pub created_at: DateTime<Utc>,
}

/// One entry of a tournament. Stats are cumulative and maintained through
/// delta updates, never recomputed from scratch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub id: Uuid,
    pub tournament_id: Uuid,
    /// Backing user account (authorization identity).
    pub user_id: Uuid,
    pub display_name: String,
    /// Half-integer score: win = 1, draw = 0.5, loss = 0.
    pub points: f64,
    pub wins: i32,
    pub draws: i32,
    pub losses: i32,
    pub games: i32,
}

/// One pairing of a round. `black_id == None` marks a bye, which is stored
/// pre-resolved as a white win.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRow {
    pub id: Uuid,
    pub tournament_id: Uuid,
    pub round: u32,
    pub white_id: Uuid,
    pub black_id: Option<Uuid>,
    pub result: Option<MatchResult>,
    pub created_at: DateTime<Utc>,
}

impl MatchRow {
    pub fn is_bye(&self) -> bool {
        self.black_id.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchResult {
    WhiteWin,
    BlackWin,
    Draw,
}

impl MatchResult {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchResult::WhiteWin => "WHITE_WIN",
            MatchResult::BlackWin => "BLACK_WIN",
            MatchResult::Draw => "DRAW",
        }
    }
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a result string from a client or a row does not name a
/// known outcome.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown result value: {0}")]
pub struct UnknownResult(pub String);

impl FromStr for MatchResult {
    type Err = UnknownResult;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WHITE_WIN" => Ok(MatchResult::WhiteWin),
            "BLACK_WIN" => Ok(MatchResult::BlackWin),
            "DRAW" => Ok(MatchResult::Draw),
            other => Err(UnknownResult(other.to_owned())),
        }
    }
}

/// Which side of a match a participant sat on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    White,
    Black,
}
