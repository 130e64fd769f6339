//! Error taxonomy surfaced by the orchestrator.

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum TournamentError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("caller is not the tournament owner")]
    Forbidden,
    #[error("{0}")]
    InvalidState(&'static str),
    #[error("{0}")]
    InvalidInput(String),
    #[error("no pairings possible for the current player pool")]
    NoPairingsPossible,
    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Stable machine-readable classification, independent of the message.
/// Hosts map these to transport-level statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    InvalidState,
    InvalidInput,
    NoPairingsPossible,
    Storage,
}

impl TournamentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TournamentError::NotFound(_) => ErrorKind::NotFound,
            TournamentError::Forbidden => ErrorKind::Forbidden,
            TournamentError::InvalidState(_) => ErrorKind::InvalidState,
            TournamentError::InvalidInput(_) => ErrorKind::InvalidInput,
            TournamentError::NoPairingsPossible => ErrorKind::NoPairingsPossible,
            TournamentError::Storage(_) => ErrorKind::Storage,
        }
    }
}
