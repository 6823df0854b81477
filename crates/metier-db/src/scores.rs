//! Automation score repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres};
use tracing::debug;

use metier_core::logging;
use metier_core::{Error, Result, ScoreRepository, UpsertScoreRequest};

/// PostgreSQL implementation of ScoreRepository.
pub struct PgScoreRepository {
    pool: Pool<Postgres>,
}

impl PgScoreRepository {
    /// Create a new PgScoreRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScoreRepository for PgScoreRepository {
    async fn upsert_many(&self, scores: &[UpsertScoreRequest]) -> Result<()> {
        if scores.is_empty() {
            return Ok(());
        }

        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        for score in scores {
            sqlx::query(
                r#"
                INSERT INTO automation_score
                    (task_id, horizon, score_pct, source, analysis, reasoning, updated_at_utc)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (task_id, horizon) DO UPDATE SET
                    score_pct = EXCLUDED.score_pct,
                    source = EXCLUDED.source,
                    analysis = EXCLUDED.analysis,
                    reasoning = EXCLUDED.reasoning,
                    updated_at_utc = EXCLUDED.updated_at_utc
                "#,
            )
            .bind(score.task_id)
            .bind(score.horizon.as_str())
            .bind(score.score_pct)
            .bind(score.source.as_str())
            .bind(&score.analysis)
            .bind(&score.reasoning)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;
        }

        tx.commit().await.map_err(Error::Database)?;

        debug!(
            subsystem = logging::SUBSYSTEM_DB,
            component = logging::COMPONENT_SCORES,
            op = "upsert_many",
            result_count = scores.len(),
            "Upserted automation scores"
        );
        Ok(())
    }

    async fn insert_defaults(&self, scores: &[UpsertScoreRequest]) -> Result<usize> {
        if scores.is_empty() {
            return Ok(0);
        }

        let now = Utc::now();
        let mut inserted = 0u64;
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        for score in scores {
            let result = sqlx::query(
                r#"
                INSERT INTO automation_score
                    (task_id, horizon, score_pct, source, analysis, reasoning, updated_at_utc)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (task_id, horizon) DO NOTHING
                "#,
            )
            .bind(score.task_id)
            .bind(score.horizon.as_str())
            .bind(score.score_pct)
            .bind(score.source.as_str())
            .bind(&score.analysis)
            .bind(&score.reasoning)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;
            inserted += result.rows_affected();
        }

        tx.commit().await.map_err(Error::Database)?;
        Ok(inserted as usize)
    }
}
