//! Postgres store adapter.
//!
//! Expected schema (managed by the hosting application):
//!
//! ```sql
//! CREATE TABLE tournaments (
//!     id         uuid PRIMARY KEY,
//!     name       text NOT NULL,
//!     owner_id   uuid NOT NULL,
//!     finalized  boolean NOT NULL DEFAULT false,
//!     created_at timestamptz NOT NULL DEFAULT now()
//! );
//!
//! CREATE TABLE participants (
//!     id            uuid PRIMARY KEY,
//!     tournament_id uuid NOT NULL REFERENCES tournaments(id) ON DELETE CASCADE,
//!     user_id       uuid NOT NULL,
//!     display_name  text NOT NULL DEFAULT '',
//!     points        double precision NOT NULL DEFAULT 0,
//!     wins          integer NOT NULL DEFAULT 0,
//!     draws         integer NOT NULL DEFAULT 0,
//!     losses        integer NOT NULL DEFAULT 0,
//!     games         integer NOT NULL DEFAULT 0,
//!     created_at    timestamptz NOT NULL DEFAULT now()
//! );
//!
//! CREATE TABLE matches (
//!     id            uuid PRIMARY KEY,
//!     tournament_id uuid NOT NULL REFERENCES tournaments(id) ON DELETE CASCADE,
//!     round         integer NOT NULL,
//!     white_id      uuid NOT NULL REFERENCES participants(id),
//!     black_id      uuid REFERENCES participants(id),
//!     result        text,
//!     created_at    timestamptz NOT NULL DEFAULT now()
//! );
//! ```
//!
//! Each mutating method runs in one transaction; the UPDATE statements take
//! row locks on the participants they touch, which serializes concurrent
//! operations on the same tournament.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use super::models::{MatchResult, MatchRow, Participant, Tournament};
use super::{StoreError, TournamentStore};
use crate::config::settings;
use crate::scoring::StatDelta;
use crate::swiss::Pairing;

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }

    /// Connect using `DATABASE_URL` (a `.env` file is honored).
    pub async fn connect_from_env() -> Result<Self, StoreError> {
        dotenvy::dotenv().ok();
        let url = std::env::var("DATABASE_URL")
            .map_err(|_| StoreError::Config("DATABASE_URL is not set".into()))?;
        Self::connect(&url).await
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(settings().db_max_connections)
            .connect(database_url)
            .await?;
        Ok(PgStore { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

type MatchTuple = (
    Uuid,
    Uuid,
    i32,
    Uuid,
    Option<Uuid>,
    Option<String>,
    DateTime<Utc>,
);

fn match_from_tuple(row: MatchTuple) -> Result<MatchRow, StoreError> {
    let (id, tournament_id, round, white_id, black_id, result, created_at) = row;
    let result = result
        .map(|s| s.parse::<MatchResult>())
        .transpose()
        .map_err(|e| StoreError::Corrupt(e.to_string()))?;
    Ok(MatchRow {
        id,
        tournament_id,
        round: round.max(0) as u32,
        white_id,
        black_id,
        result,
        created_at,
    })
}

async fn add_deltas<'e, E>(executor: E, id: Uuid, delta: StatDelta) -> Result<(), StoreError>
where
    E: sqlx::Executor<'e, Database = sqlx::Postgres>,
{
    let done = sqlx::query(
        r#"
        UPDATE participants
           SET points = points + $2,
               wins   = wins   + $3,
               draws  = draws  + $4,
               losses = losses + $5,
               games  = games  + $6
         WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(delta.points)
    .bind(delta.wins)
    .bind(delta.draws)
    .bind(delta.losses)
    .bind(delta.games)
    .execute(executor)
    .await?;

    if done.rows_affected() == 0 {
        return Err(StoreError::RowNotFound);
    }
    Ok(())
}

#[async_trait]
impl TournamentStore for PgStore {
    async fn tournament(&self, id: Uuid) -> Result<Option<Tournament>, StoreError> {
        let row = sqlx::query_as::<_, (Uuid, String, Uuid, bool, DateTime<Utc>)>(
            "SELECT id, name, owner_id, finalized, created_at FROM tournaments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, name, owner_id, finalized, created_at)| Tournament {
            id,
            name,
            owner_id,
            finalized,
            created_at,
        }))
    }

    async fn participants(&self, tournament_id: Uuid) -> Result<Vec<Participant>, StoreError> {
        let rows = sqlx::query_as::<
            _,
            (Uuid, Uuid, Uuid, String, f64, i32, i32, i32, i32),
        >(
            r#"
            SELECT id, tournament_id, user_id, display_name,
                   points, wins, draws, losses, games
              FROM participants
             WHERE tournament_id = $1
             ORDER BY created_at, id
            "#,
        )
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(id, tournament_id, user_id, display_name, points, wins, draws, losses, games)| {
                    Participant {
                        id,
                        tournament_id,
                        user_id,
                        display_name,
                        points,
                        wins,
                        draws,
                        losses,
                        games,
                    }
                },
            )
            .collect())
    }

    async fn participant(&self, id: Uuid) -> Result<Option<Participant>, StoreError> {
        let row = sqlx::query_as::<
            _,
            (Uuid, Uuid, Uuid, String, f64, i32, i32, i32, i32),
        >(
            r#"
            SELECT id, tournament_id, user_id, display_name,
                   points, wins, draws, losses, games
              FROM participants
             WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(
            |(id, tournament_id, user_id, display_name, points, wins, draws, losses, games)| {
                Participant {
                    id,
                    tournament_id,
                    user_id,
                    display_name,
                    points,
                    wins,
                    draws,
                    losses,
                    games,
                }
            },
        ))
    }

    async fn matches(&self, tournament_id: Uuid) -> Result<Vec<MatchRow>, StoreError> {
        let rows = sqlx::query_as::<_, MatchTuple>(
            r#"
            SELECT id, tournament_id, round, white_id, black_id, result, created_at
              FROM matches
             WHERE tournament_id = $1
             ORDER BY round, created_at
            "#,
        )
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(match_from_tuple).collect()
    }

    async fn match_row(&self, id: Uuid) -> Result<Option<MatchRow>, StoreError> {
        let row = sqlx::query_as::<_, MatchTuple>(
            r#"
            SELECT id, tournament_id, round, white_id, black_id, result, created_at
              FROM matches
             WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(match_from_tuple).transpose()
    }

    async fn match_count(&self, tournament_id: Uuid) -> Result<u64, StoreError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM matches WHERE tournament_id = $1")
                .bind(tournament_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count.max(0) as u64)
    }

    async fn insert_round(
        &self,
        tournament_id: Uuid,
        round: u32,
        pairings: &[Pairing],
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        for pairing in pairings {
            let (white_id, black_id, result) = match *pairing {
                Pairing::Game { white, black } => (white, Some(black), None),
                Pairing::Bye { player } => (player, None, Some(MatchResult::WhiteWin)),
            };
            sqlx::query(
                r#"
                INSERT INTO matches (id, tournament_id, round, white_id, black_id, result)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(tournament_id)
            .bind(round as i32)
            .bind(white_id)
            .bind(black_id)
            .bind(result.map(MatchResult::as_str))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn apply_stat_deltas(&self, deltas: &[(Uuid, StatDelta)]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        for (id, delta) in deltas {
            add_deltas(&mut *tx, *id, *delta).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn record_result(
        &self,
        match_id: Uuid,
        result: MatchResult,
        deltas: &[(Uuid, StatDelta)],
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        for (id, delta) in deltas {
            add_deltas(&mut *tx, *id, *delta).await?;
        }

        let done = sqlx::query("UPDATE matches SET result = $2 WHERE id = $1")
            .bind(match_id)
            .bind(result.as_str())
            .execute(&mut *tx)
            .await?;
        if done.rows_affected() == 0 {
            return Err(StoreError::RowNotFound);
        }

        tx.commit().await?;
        Ok(())
    }

    async fn clear_pairings(&self, tournament_id: Uuid) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM matches WHERE tournament_id = $1")
            .bind(tournament_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            UPDATE participants
               SET points = 0, wins = 0, draws = 0, losses = 0, games = 0
             WHERE tournament_id = $1
            "#,
        )
        .bind(tournament_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE tournaments SET finalized = false WHERE id = $1")
            .bind(tournament_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete_participant(&self, id: Uuid) -> Result<(), StoreError> {
        let done = sqlx::query("DELETE FROM participants WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if done.rows_affected() == 0 {
            return Err(StoreError::RowNotFound);
        }
        Ok(())
    }
}
