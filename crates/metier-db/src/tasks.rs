//! Task repository implementation.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::debug;

use metier_core::logging;
use metier_core::{
    AutomationScore, Error, Horizon, NewTask, Result, ScoreSource, Task, TaskKind,
    TaskRepository, TaskWithScore,
};

const TASK_WITH_SCORE_SELECT: &str = r#"
    SELECT
        t.id, t.occupation_code, t.label, t.description, t.kind,
        s.score_pct, s.source, s.analysis, s.reasoning, s.updated_at_utc AS score_updated_at_utc
    FROM task t
    LEFT JOIN automation_score s ON s.task_id = t.id AND s.horizon = $2
"#;

/// PostgreSQL implementation of TaskRepository.
pub struct PgTaskRepository {
    pool: Pool<Postgres>,
}

impl PgTaskRepository {
    /// Create a new PgTaskRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn map_task(row: &PgRow) -> Result<Task> {
        let kind: Option<String> = row.get("kind");
        Ok(Task {
            id: row.get("id"),
            occupation_code: row.get("occupation_code"),
            label: row.get("label"),
            description: row.get("description"),
            kind: kind.map(|k| k.parse::<TaskKind>()).transpose()?,
        })
    }

    fn map_task_with_score(row: &PgRow, horizon: Horizon) -> Result<TaskWithScore> {
        let task = Self::map_task(row)?;
        let score_pct: Option<f64> = row.get("score_pct");
        let score = match score_pct {
            Some(score_pct) => {
                let source: String = row.get("source");
                Some(AutomationScore {
                    task_id: task.id,
                    horizon,
                    score_pct,
                    source: source.parse::<ScoreSource>()?,
                    analysis: row.get("analysis"),
                    reasoning: row.get("reasoning"),
                    updated_at_utc: row.get("score_updated_at_utc"),
                })
            }
            None => None,
        };
        Ok(TaskWithScore { task, score })
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn list_with_scores(
        &self,
        occupation_code: &str,
        horizon: Horizon,
    ) -> Result<Vec<TaskWithScore>> {
        let rows = sqlx::query(&format!(
            "{} WHERE t.occupation_code = $1 ORDER BY t.id",
            TASK_WITH_SCORE_SELECT
        ))
        .bind(occupation_code)
        .bind(horizon.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.iter()
            .map(|row| Self::map_task_with_score(row, horizon))
            .collect()
    }

    async fn list_with_scores_for(
        &self,
        occupation_codes: &[String],
        horizon: Horizon,
    ) -> Result<Vec<TaskWithScore>> {
        if occupation_codes.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(&format!(
            "{} WHERE t.occupation_code = ANY($1) ORDER BY t.occupation_code, t.id",
            TASK_WITH_SCORE_SELECT
        ))
        .bind(occupation_codes)
        .bind(horizon.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.iter()
            .map(|row| Self::map_task_with_score(row, horizon))
            .collect()
    }

    async fn insert_batch(&self, tasks: &[NewTask]) -> Result<Vec<Task>> {
        if tasks.is_empty() {
            return Ok(Vec::new());
        }

        let mut inserted = Vec::with_capacity(tasks.len());
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        for task in tasks {
            let row = sqlx::query(
                r#"
                INSERT INTO task (occupation_code, label, description, kind)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (occupation_code, label) DO NOTHING
                RETURNING id, occupation_code, label, description, kind
                "#,
            )
            .bind(&task.occupation_code)
            .bind(&task.label)
            .bind(&task.description)
            .bind(task.kind.map(|k| k.as_str()))
            .fetch_optional(&mut *tx)
            .await
            .map_err(Error::Database)?;

            if let Some(row) = row {
                inserted.push(Self::map_task(&row)?);
            }
        }

        tx.commit().await.map_err(Error::Database)?;

        debug!(
            subsystem = logging::SUBSYSTEM_DB,
            component = logging::COMPONENT_TASKS,
            op = "insert_batch",
            task_count = tasks.len(),
            result_count = inserted.len(),
            "Inserted tasks"
        );
        Ok(inserted)
    }

    async fn list_all(&self) -> Result<Vec<Task>> {
        let rows = sqlx::query(
            "SELECT id, occupation_code, label, description, kind FROM task ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.iter().map(Self::map_task).collect()
    }

    async fn update_kinds(&self, kinds: &[(i64, TaskKind)]) -> Result<usize> {
        if kinds.is_empty() {
            return Ok(0);
        }

        let mut updated = 0u64;
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        for (task_id, kind) in kinds {
            let result = sqlx::query("UPDATE task SET kind = $1 WHERE id = $2")
                .bind(kind.as_str())
                .bind(task_id)
                .execute(&mut *tx)
                .await
                .map_err(Error::Database)?;
            updated += result.rows_affected();
        }

        tx.commit().await.map_err(Error::Database)?;
        Ok(updated as usize)
    }
}
