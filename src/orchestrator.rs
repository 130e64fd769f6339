//! Drives round generation, result edits and the undo path over the store
//! port. One call, one user action: errors surface verbatim, partial
//! progress (rounds already committed) is reported rather than rolled back.

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::settings;
use crate::error::TournamentError;
use crate::ranking::{self, Standing};
use crate::scoring::{contribution, BYE_AWARD};
use crate::store::models::{MatchResult, MatchRow, Side, Tournament};
use crate::store::TournamentStore;
use crate::swiss::{self, Pairing};

/// Outcome of a generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedRounds {
    /// Round numbers actually committed, in creation order.
    pub rounds: Vec<u32>,
    /// At least one created round pairs two players who already met.
    pub had_forced_repeat: bool,
}

/// A round's matches, for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundGames {
    pub round: u32,
    pub games: Vec<MatchRow>,
}

pub struct Orchestrator<S> {
    store: S,
    seed: Option<u64>,
}

impl<S: TournamentStore> Orchestrator<S> {
    pub fn new(store: S) -> Self {
        Orchestrator { store, seed: None }
    }

    /// Fixed RNG seed for the round-1 shuffle; tests use this to pin the
    /// generated permutation.
    pub fn with_seed(store: S, seed: u64) -> Self {
        Orchestrator {
            store,
            seed: Some(seed),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    async fn owned_tournament(
        &self,
        tournament_id: Uuid,
        caller_id: Uuid,
    ) -> Result<Tournament, TournamentError> {
        let tournament = self
            .store
            .tournament(tournament_id)
            .await?
            .ok_or(TournamentError::NotFound("tournament"))?;
        if tournament.owner_id != caller_id {
            return Err(TournamentError::Forbidden);
        }
        Ok(tournament)
    }

    /// Append up to `requested` new rounds (clamped to the configured cap)
    /// after the tournament's current last round. Owner-only.
    ///
    /// Each round is committed as a batch before the in-memory player state
    /// is advanced, so round K+1 is always paired against round K as
    /// persisted. Generation stops early when the engine has nothing left
    /// to schedule; creating no rounds at all is an error.
    pub async fn generate_rounds(
        &self,
        tournament_id: Uuid,
        caller_id: Uuid,
        requested: u32,
    ) -> Result<GeneratedRounds, TournamentError> {
        if requested < 1 {
            return Err(TournamentError::InvalidInput(
                "at least one round must be requested".into(),
            ));
        }

        let tournament = self.owned_tournament(tournament_id, caller_id).await?;
        if tournament.finalized {
            return Err(TournamentError::InvalidState(
                "pairings cannot be generated for a finalized tournament",
            ));
        }

        let participants = self.store.participants(tournament_id).await?;
        if participants.len() < 2 {
            return Err(TournamentError::InvalidState(
                "at least two participants are required",
            ));
        }

        let matches = self.store.matches(tournament_id).await?;
        let mut states = swiss::rebuild(&participants, &matches);
        let current_round = matches.iter().map(|m| m.round).max().unwrap_or(0);

        let to_create = requested.min(settings().max_rounds_per_request);
        let mut rng = self.rng();
        let mut created = Vec::new();
        let mut had_forced_repeat = false;

        for offset in 1..=to_create {
            let round = current_round + offset;
            let plan = swiss::pair_round(&states, round, round == 1, &mut rng)
                .map_err(|e| TournamentError::InvalidInput(e.to_string()))?;

            if plan.is_empty() {
                warn!("tournament {tournament_id}: nothing to pair for round {round}, stopping");
                break;
            }
            if plan.forced_repeat {
                warn!("tournament {tournament_id}: round {round} repeats an earlier pairing");
                had_forced_repeat = true;
            }

            self.store
                .insert_round(tournament_id, round, &plan.pairings)
                .await?;

            // Advance call-local state only after the round is committed:
            // the next iteration pairs against persisted reality.
            let mut bye_awards = Vec::new();
            for pairing in &plan.pairings {
                match *pairing {
                    Pairing::Game { white, black } => {
                        if let Some(s) = states.iter_mut().find(|s| s.id == white) {
                            s.avoid.insert(black);
                        }
                        if let Some(s) = states.iter_mut().find(|s| s.id == black) {
                            s.avoid.insert(white);
                        }
                    }
                    Pairing::Bye { player } => {
                        if let Some(s) = states.iter_mut().find(|s| s.id == player) {
                            s.score += BYE_AWARD.points;
                            s.games += 1;
                            s.received_bye = true;
                        }
                        bye_awards.push((player, BYE_AWARD));
                    }
                }
            }
            if !bye_awards.is_empty() {
                self.store.apply_stat_deltas(&bye_awards).await?;
            }

            debug!(
                "tournament {tournament_id}: round {round} created with {} pairings",
                plan.pairings.len()
            );
            created.push(round);
        }

        if created.is_empty() {
            return Err(TournamentError::NoPairingsPossible);
        }

        Ok(GeneratedRounds {
            rounds: created,
            had_forced_repeat,
        })
    }

    /// Set or change a match result. Owner-only, idempotent: the previous
    /// result's stat contribution is subtracted and the new one added, both
    /// participants and the match row updated in one atomic unit.
    pub async fn set_match_result(
        &self,
        tournament_id: Uuid,
        match_id: Uuid,
        caller_id: Uuid,
        result: MatchResult,
    ) -> Result<(), TournamentError> {
        let row = self
            .store
            .match_row(match_id)
            .await?
            .filter(|m| m.tournament_id == tournament_id)
            .ok_or(TournamentError::NotFound("match"))?;

        let tournament = self.owned_tournament(tournament_id, caller_id).await?;
        if tournament.finalized {
            return Err(TournamentError::InvalidState(
                "results cannot be changed on a finalized tournament",
            ));
        }

        let mut deltas = vec![(
            row.white_id,
            contribution(Some(result), Side::White) - contribution(row.result, Side::White),
        )];
        if let Some(black) = row.black_id {
            deltas.push((
                black,
                contribution(Some(result), Side::Black) - contribution(row.result, Side::Black),
            ));
        }

        self.store.record_result(match_id, result, &deltas).await?;
        debug!("tournament {tournament_id}: match {match_id} set to {result}");
        Ok(())
    }

    /// The undo path: drop every match, zero every participant's stats and
    /// clear the finalized flag, in one atomic unit. Owner-only; allowed
    /// regardless of the tournament's current state.
    pub async fn delete_pairings(
        &self,
        tournament_id: Uuid,
        caller_id: Uuid,
    ) -> Result<(), TournamentError> {
        self.owned_tournament(tournament_id, caller_id).await?;
        self.store.clear_pairings(tournament_id).await?;
        debug!("tournament {tournament_id}: pairings deleted, stats reset");
        Ok(())
    }

    /// Remove a participant. The owner may remove anyone; a participant may
    /// remove themselves. The entry backing the owner stays, and nobody
    /// leaves while matches exist on an unfinished tournament.
    pub async fn remove_participant(
        &self,
        tournament_id: Uuid,
        participant_id: Uuid,
        caller_id: Uuid,
    ) -> Result<(), TournamentError> {
        let tournament = self
            .store
            .tournament(tournament_id)
            .await?
            .ok_or(TournamentError::NotFound("tournament"))?;
        let participant = self
            .store
            .participant(participant_id)
            .await?
            .filter(|p| p.tournament_id == tournament_id)
            .ok_or(TournamentError::NotFound("participant"))?;

        if participant.user_id == tournament.owner_id {
            return Err(TournamentError::InvalidState(
                "the tournament owner cannot be removed",
            ));
        }
        if caller_id != tournament.owner_id && caller_id != participant.user_id {
            return Err(TournamentError::Forbidden);
        }
        if !tournament.finalized && self.store.match_count(tournament_id).await? > 0 {
            return Err(TournamentError::InvalidState(
                "participants cannot be removed while pairings exist",
            ));
        }

        self.store.delete_participant(participant_id).await?;
        Ok(())
    }

    /// Current standings, recomputed from the persisted stats on demand.
    pub async fn compute_ranking(
        &self,
        tournament_id: Uuid,
    ) -> Result<Vec<Standing>, TournamentError> {
        self.store
            .tournament(tournament_id)
            .await?
            .ok_or(TournamentError::NotFound("tournament"))?;
        let participants = self.store.participants(tournament_id).await?;
        Ok(ranking::rank(&participants))
    }

    /// Matches grouped by round, ascending, creation order within a round.
    pub async fn rounds_overview(
        &self,
        tournament_id: Uuid,
    ) -> Result<Vec<RoundGames>, TournamentError> {
        self.store
            .tournament(tournament_id)
            .await?
            .ok_or(TournamentError::NotFound("tournament"))?;

        let mut rounds: Vec<RoundGames> = Vec::new();
        for m in self.store.matches(tournament_id).await? {
            match rounds.last_mut() {
                Some(r) if r.round == m.round => r.games.push(m),
                _ => rounds.push(RoundGames {
                    round: m.round,
                    games: vec![m],
                }),
            }
        }
        Ok(rounds)
    }
}
