//! Bulk import of occupations and tasks.
//!
//! Occupations are upserted and tasks inserted in fixed-size batches, each
//! batch in its own transaction. A failing batch is logged and skipped; the
//! remaining batches still run. Every newly inserted real task receives a
//! heuristic `now` score unless a score row already exists.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{error, info};
use utoipa::ToSchema;

use metier_core::logging;
use metier_core::defaults::{IMPORT_OCCUPATION_BATCH, IMPORT_TASK_BATCH};
use metier_core::{
    classify_task_label, default_score, ClassificationStats, Horizon, NewOccupation, NewTask,
    OccupationRepository, Result, ScoreRepository, ScoreSource, Task, TaskKind, TaskRepository,
    UpsertScoreRequest,
};

/// Body of `POST /admin/import`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    #[serde(default)]
    pub occupations: Vec<NewOccupation>,
    #[serde(default)]
    pub tasks: Vec<NewTask>,
}

/// Outcome of an import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportStats {
    pub occupations_written: usize,
    pub occupation_batches_failed: usize,
    pub tasks_inserted: usize,
    /// Tasks already present (same occupation and label) or with a blank label.
    pub tasks_skipped: usize,
    pub task_batches_failed: usize,
    pub default_scores_inserted: usize,
    pub classification: ClassificationStats,
}

/// Import service over the repositories.
pub struct Importer {
    occupations: Arc<dyn OccupationRepository>,
    tasks: Arc<dyn TaskRepository>,
    scores: Arc<dyn ScoreRepository>,
}

impl Importer {
    pub fn new(
        occupations: Arc<dyn OccupationRepository>,
        tasks: Arc<dyn TaskRepository>,
        scores: Arc<dyn ScoreRepository>,
    ) -> Self {
        Self {
            occupations,
            tasks,
            scores,
        }
    }

    /// Import occupations first, then tasks.
    pub async fn import(&self, req: ImportRequest) -> ImportStats {
        let start = Instant::now();
        let mut stats = ImportStats::default();

        for batch in req.occupations.chunks(IMPORT_OCCUPATION_BATCH) {
            match self.occupations.upsert_batch(batch).await {
                Ok(n) => stats.occupations_written += n,
                Err(e) => {
                    stats.occupation_batches_failed += 1;
                    error!(
                        subsystem = logging::SUBSYSTEM_IMPORT,
                        component = logging::COMPONENT_IMPORTER,
                        op = "upsert_occupations",
                        batch_size = batch.len(),
                        error = %e,
                        "Occupation batch failed, skipping"
                    );
                }
            }
        }

        let (tasks, blank): (Vec<NewTask>, Vec<NewTask>) = req
            .tasks
            .into_iter()
            .map(with_kind)
            .partition(|t| !t.label.is_empty());
        stats.tasks_skipped += blank.len();

        for batch in tasks.chunks(IMPORT_TASK_BATCH) {
            let inserted = match self.tasks.insert_batch(batch).await {
                Ok(inserted) => inserted,
                Err(e) => {
                    stats.task_batches_failed += 1;
                    error!(
                        subsystem = logging::SUBSYSTEM_IMPORT,
                        component = logging::COMPONENT_IMPORTER,
                        op = "insert_tasks",
                        batch_size = batch.len(),
                        error = %e,
                        "Task batch failed, skipping"
                    );
                    continue;
                }
            };
            stats.tasks_inserted += inserted.len();
            stats.tasks_skipped += batch.len() - inserted.len();
            for task in &inserted {
                stats.classification.record(task.effective_kind());
            }

            let defaults = default_scores(&inserted);
            match self.scores.insert_defaults(&defaults).await {
                Ok(n) => stats.default_scores_inserted += n,
                Err(e) => error!(
                    subsystem = logging::SUBSYSTEM_IMPORT,
                    component = logging::COMPONENT_IMPORTER,
                    op = "insert_default_scores",
                    task_count = defaults.len(),
                    error = %e,
                    "Default scores failed for batch"
                ),
            }
        }

        info!(
            subsystem = logging::SUBSYSTEM_IMPORT,
            component = logging::COMPONENT_IMPORTER,
            op = "import",
            occupations_written = stats.occupations_written,
            tasks_inserted = stats.tasks_inserted,
            tasks_skipped = stats.tasks_skipped,
            failed_batches = stats.occupation_batches_failed + stats.task_batches_failed,
            duration_ms = start.elapsed().as_millis() as u64,
            "Import complete"
        );
        stats
    }

    /// Recompute the kind of every stored task from its label.
    pub async fn reclassify(&self) -> Result<ClassificationStats> {
        let start = Instant::now();
        let all = self.tasks.list_all().await?;

        let mut stats = ClassificationStats::default();
        let kinds: Vec<(i64, TaskKind)> = all
            .iter()
            .map(|t| {
                let kind = classify_task_label(&t.label);
                stats.record(kind);
                (t.id, kind)
            })
            .collect();
        let updated = self.tasks.update_kinds(&kinds).await?;

        info!(
            subsystem = logging::SUBSYSTEM_IMPORT,
            component = logging::COMPONENT_IMPORTER,
            op = "reclassify",
            task_count = updated,
            definition = stats.definition,
            access_requirement = stats.access_requirement,
            duration_ms = start.elapsed().as_millis() as u64,
            "Tasks reclassified"
        );
        Ok(stats)
    }
}

/// Trim the label and fill in the classifier's kind when the row has none.
fn with_kind(mut task: NewTask) -> NewTask {
    task.label = task.label.trim().to_string();
    if task.kind.is_none() {
        task.kind = Some(classify_task_label(&task.label));
    }
    task
}

/// Heuristic `now` scores for the real tasks among `tasks`.
fn default_scores(tasks: &[Task]) -> Vec<UpsertScoreRequest> {
    let mut rng = rand::thread_rng();
    tasks
        .iter()
        .filter(|t| t.is_real_task())
        .map(|t| UpsertScoreRequest {
            task_id: t.id,
            horizon: Horizon::Now,
            score_pct: default_score(&t.label, t.description.as_deref(), &mut rng),
            source: ScoreSource::Default,
            analysis: None,
            reasoning: None,
        })
        .collect()
}
