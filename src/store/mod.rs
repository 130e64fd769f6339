//! Persistence port consumed by the orchestrator.
//!
//! Every mutating method is one atomic unit: all rows it touches commit
//! together or not at all. Concurrent operations on the same tournament
//! serialize on whatever the adapter's backend provides (row locks in
//! Postgres, a process-wide mutex in memory).

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub mod memory;
pub mod models;
pub mod postgres;

pub use memory::MemoryStore;
pub use models::{MatchResult, MatchRow, Participant, Side, Tournament, UnknownResult};
pub use postgres::PgStore;

use crate::scoring::StatDelta;
use crate::swiss::Pairing;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("referenced row is missing")]
    RowNotFound,
    #[error("corrupt row: {0}")]
    Corrupt(String),
    #[error("store configuration: {0}")]
    Config(String),
}

#[async_trait]
pub trait TournamentStore: Send + Sync {
    async fn tournament(&self, id: Uuid) -> Result<Option<Tournament>, StoreError>;

    /// Participants in join order.
    async fn participants(&self, tournament_id: Uuid) -> Result<Vec<Participant>, StoreError>;

    async fn participant(&self, id: Uuid) -> Result<Option<Participant>, StoreError>;

    /// Matches ordered by round, then creation.
    async fn matches(&self, tournament_id: Uuid) -> Result<Vec<MatchRow>, StoreError>;

    async fn match_row(&self, id: Uuid) -> Result<Option<MatchRow>, StoreError>;

    async fn match_count(&self, tournament_id: Uuid) -> Result<u64, StoreError>;

    /// Persist one generated round as match rows. Byes are stored with no
    /// black side and a pre-filled white win.
    async fn insert_round(
        &self,
        tournament_id: Uuid,
        round: u32,
        pairings: &[Pairing],
    ) -> Result<(), StoreError>;

    /// Add the given deltas to the participants' cumulative stats.
    async fn apply_stat_deltas(&self, deltas: &[(Uuid, StatDelta)]) -> Result<(), StoreError>;

    /// Store a match result and the matching stat deltas in one unit.
    async fn record_result(
        &self,
        match_id: Uuid,
        result: MatchResult,
        deltas: &[(Uuid, StatDelta)],
    ) -> Result<(), StoreError>;

    /// The undo path: drop all matches, zero all participant stats and
    /// clear the finalized flag.
    async fn clear_pairings(&self, tournament_id: Uuid) -> Result<(), StoreError>;

    async fn delete_participant(&self, id: Uuid) -> Result<(), StoreError>;
}
