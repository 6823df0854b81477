//! User simulation repository implementation.

use std::collections::BTreeMap;

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{Pool, Postgres, Row};

use metier_core::{CreateSimulationRequest, Error, Result, SimulationRepository, UserSimulation};

/// PostgreSQL implementation of SimulationRepository.
pub struct PgSimulationRepository {
    pool: Pool<Postgres>,
}

impl PgSimulationRepository {
    /// Create a new PgSimulationRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SimulationRepository for PgSimulationRepository {
    async fn insert(&self, req: CreateSimulationRequest) -> Result<UserSimulation> {
        let row = sqlx::query(
            r#"
            INSERT INTO user_simulation (occupation_code, time_allocation, global_score)
            VALUES ($1, $2, $3)
            RETURNING id, occupation_code, time_allocation, global_score, created_at_utc
            "#,
        )
        .bind(&req.occupation_code)
        .bind(Json(&req.time_allocation))
        .bind(req.global_score)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        let Json(time_allocation): Json<BTreeMap<i64, f64>> = row.get("time_allocation");
        Ok(UserSimulation {
            id: row.get("id"),
            occupation_code: row.get("occupation_code"),
            time_allocation,
            global_score: row.get("global_score"),
            created_at_utc: row.get("created_at_utc"),
        })
    }
}
