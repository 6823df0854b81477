//! Occupation repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::debug;

use metier_core::logging;
use metier_core::{Error, NewOccupation, Occupation, OccupationRepository, Result};

const OCCUPATION_COLUMNS: &str =
    "code, title, sector, description, slug, created_at_utc, updated_at_utc";

/// PostgreSQL implementation of OccupationRepository.
pub struct PgOccupationRepository {
    pool: Pool<Postgres>,
}

impl PgOccupationRepository {
    /// Create a new PgOccupationRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn map_row(row: &PgRow) -> Occupation {
        Occupation {
            code: row.get("code"),
            title: row.get("title"),
            sector: row.get("sector"),
            description: row.get("description"),
            slug: row.get("slug"),
            created_at_utc: row.get("created_at_utc"),
            updated_at_utc: row.get("updated_at_utc"),
        }
    }
}

#[async_trait]
impl OccupationRepository for PgOccupationRepository {
    async fn get(&self, code: &str) -> Result<Option<Occupation>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM occupation WHERE code = $1",
            OCCUPATION_COLUMNS
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(Self::map_row))
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Occupation>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM occupation WHERE slug = $1",
            OCCUPATION_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(Self::map_row))
    }

    async fn list(&self) -> Result<Vec<Occupation>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM occupation ORDER BY title",
            OCCUPATION_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(Self::map_row).collect())
    }

    async fn upsert_batch(&self, occupations: &[NewOccupation]) -> Result<usize> {
        if occupations.is_empty() {
            return Ok(0);
        }

        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        for occ in occupations {
            // A re-import never clears a slug that is already set.
            sqlx::query(
                r#"
                INSERT INTO occupation (code, title, sector, description, slug, created_at_utc, updated_at_utc)
                VALUES ($1, $2, $3, $4, $5, $6, $6)
                ON CONFLICT (code) DO UPDATE SET
                    title = EXCLUDED.title,
                    sector = EXCLUDED.sector,
                    description = EXCLUDED.description,
                    slug = COALESCE(EXCLUDED.slug, occupation.slug),
                    updated_at_utc = EXCLUDED.updated_at_utc
                "#,
            )
            .bind(&occ.code)
            .bind(&occ.title)
            .bind(&occ.sector)
            .bind(&occ.description)
            .bind(occ.slug.as_deref().map(|s| s.trim().to_lowercase()))
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;
        }

        tx.commit().await.map_err(Error::Database)?;

        debug!(
            subsystem = logging::SUBSYSTEM_DB,
            component = logging::COMPONENT_OCCUPATIONS,
            op = "upsert_batch",
            result_count = occupations.len(),
            "Upserted occupations"
        );
        Ok(occupations.len())
    }
}
