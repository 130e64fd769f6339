//! Swiss-system pairing and ranking core for club tournaments.
//!
//! The crate is the scheduling heart of a club-management backend: it
//! rebuilds per-player state from persisted match history, produces Swiss
//! pairings round by round (with rematch avoidance and bye handling),
//! applies result edits as reversible stat deltas, and computes standings
//! with deterministic tie-breaks.
//!
//! Persistence, identity and point-award policies live behind interfaces:
//! the [`orchestrator::Orchestrator`] drives everything through a
//! [`store::TournamentStore`] port and trusts the caller ids handed to it.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod ranking;
pub mod scoring;
pub mod store;
pub mod swiss;

pub use error::{ErrorKind, TournamentError};
pub use orchestrator::Orchestrator;
