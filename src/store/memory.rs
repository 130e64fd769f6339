//! In-process store adapter.
//!
//! Backs the integration tests and hosts that embed the core without a
//! database. A single coarse mutex stands in for transactions: every
//! mutating method takes the lock once, so its row updates are atomic and
//! concurrent operations on the same tournament serialize, matching the
//! contract in [`super::TournamentStore`].

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use super::models::{MatchResult, MatchRow, Participant, Tournament};
use super::{StoreError, TournamentStore};
use crate::scoring::StatDelta;
use crate::swiss::Pairing;

#[derive(Debug, Default)]
struct Inner {
    tournaments: HashMap<Uuid, Tournament>,
    // Vecs keep insertion order, which the trait promises for reads.
    participants: Vec<Participant>,
    matches: Vec<MatchRow>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a tournament row. Setup helper for tests and fixtures.
    pub fn seed_tournament(&self, name: &str, owner_id: Uuid) -> Uuid {
        let id = Uuid::new_v4();
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner.tournaments.insert(
            id,
            Tournament {
                id,
                name: name.to_owned(),
                owner_id,
                finalized: false,
                created_at: Utc::now(),
            },
        );
        id
    }

    /// Seed a participant with zeroed stats.
    pub fn seed_participant(&self, tournament_id: Uuid, user_id: Uuid, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner.participants.push(Participant {
            id,
            tournament_id,
            user_id,
            display_name: name.to_owned(),
            points: 0.0,
            wins: 0,
            draws: 0,
            losses: 0,
            games: 0,
        });
        id
    }

    pub fn set_finalized(&self, tournament_id: Uuid, finalized: bool) {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        if let Some(t) = inner.tournaments.get_mut(&tournament_id) {
            t.finalized = finalized;
        }
    }
}

fn apply_delta(p: &mut Participant, d: StatDelta) {
    p.points += d.points;
    p.wins += d.wins;
    p.draws += d.draws;
    p.losses += d.losses;
    p.games += d.games;
}

#[async_trait]
impl TournamentStore for MemoryStore {
    async fn tournament(&self, id: Uuid) -> Result<Option<Tournament>, StoreError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner.tournaments.get(&id).cloned())
    }

    async fn participants(&self, tournament_id: Uuid) -> Result<Vec<Participant>, StoreError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner
            .participants
            .iter()
            .filter(|p| p.tournament_id == tournament_id)
            .cloned()
            .collect())
    }

    async fn participant(&self, id: Uuid) -> Result<Option<Participant>, StoreError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner.participants.iter().find(|p| p.id == id).cloned())
    }

    async fn matches(&self, tournament_id: Uuid) -> Result<Vec<MatchRow>, StoreError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        let mut rows: Vec<MatchRow> = inner
            .matches
            .iter()
            .filter(|m| m.tournament_id == tournament_id)
            .cloned()
            .collect();
        rows.sort_by_key(|m| (m.round, m.created_at));
        Ok(rows)
    }

    async fn match_row(&self, id: Uuid) -> Result<Option<MatchRow>, StoreError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner.matches.iter().find(|m| m.id == id).cloned())
    }

    async fn match_count(&self, tournament_id: Uuid) -> Result<u64, StoreError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner
            .matches
            .iter()
            .filter(|m| m.tournament_id == tournament_id)
            .count() as u64)
    }

    async fn insert_round(
        &self,
        tournament_id: Uuid,
        round: u32,
        pairings: &[Pairing],
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        for pairing in pairings {
            let (white_id, black_id, result) = match *pairing {
                Pairing::Game { white, black } => (white, Some(black), None),
                Pairing::Bye { player } => (player, None, Some(MatchResult::WhiteWin)),
            };
            inner.matches.push(MatchRow {
                id: Uuid::new_v4(),
                tournament_id,
                round,
                white_id,
                black_id,
                result,
                created_at: Utc::now(),
            });
        }
        Ok(())
    }

    async fn apply_stat_deltas(&self, deltas: &[(Uuid, StatDelta)]) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        // Validate first so a missing row leaves every other row untouched.
        for (id, _) in deltas {
            if !inner.participants.iter().any(|p| p.id == *id) {
                return Err(StoreError::RowNotFound);
            }
        }
        for (id, delta) in deltas {
            if let Some(p) = inner.participants.iter_mut().find(|p| p.id == *id) {
                apply_delta(p, *delta);
            }
        }
        Ok(())
    }

    async fn record_result(
        &self,
        match_id: Uuid,
        result: MatchResult,
        deltas: &[(Uuid, StatDelta)],
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        if !inner.matches.iter().any(|m| m.id == match_id) {
            return Err(StoreError::RowNotFound);
        }
        for (id, _) in deltas {
            if !inner.participants.iter().any(|p| p.id == *id) {
                return Err(StoreError::RowNotFound);
            }
        }
        for (id, delta) in deltas {
            if let Some(p) = inner.participants.iter_mut().find(|p| p.id == *id) {
                apply_delta(p, *delta);
            }
        }
        if let Some(m) = inner.matches.iter_mut().find(|m| m.id == match_id) {
            m.result = Some(result);
        }
        Ok(())
    }

    async fn clear_pairings(&self, tournament_id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner.matches.retain(|m| m.tournament_id != tournament_id);
        for p in inner
            .participants
            .iter_mut()
            .filter(|p| p.tournament_id == tournament_id)
        {
            p.points = 0.0;
            p.wins = 0;
            p.draws = 0;
            p.losses = 0;
            p.games = 0;
        }
        if let Some(t) = inner.tournaments.get_mut(&tournament_id) {
            t.finalized = false;
        }
        Ok(())
    }

    async fn delete_participant(&self, id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        let before = inner.participants.len();
        inner.participants.retain(|p| p.id != id);
        if inner.participants.len() == before {
            return Err(StoreError::RowNotFound);
        }
        Ok(())
    }
}
