//! Core traits for metier abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// OCCUPATION REPOSITORY TRAITS
// =============================================================================

/// Repository for occupation lookups and bulk loads.
#[async_trait]
pub trait OccupationRepository: Send + Sync {
    /// Fetch an occupation by its code. `None` when absent.
    async fn get(&self, code: &str) -> Result<Option<Occupation>>;

    /// Fetch an occupation by its slug. `None` when absent.
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Occupation>>;

    /// List every occupation, ordered by title.
    async fn list(&self) -> Result<Vec<Occupation>>;

    /// Insert or update occupations keyed by code.
    ///
    /// Returns the number of rows written.
    async fn upsert_batch(&self, occupations: &[NewOccupation]) -> Result<usize>;
}

// =============================================================================
// TASK REPOSITORY TRAITS
// =============================================================================

/// Repository for occupation tasks and their joined scores.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// All tasks of one occupation with their score for `horizon`, ordered by id.
    async fn list_with_scores(&self, occupation_code: &str, horizon: Horizon)
        -> Result<Vec<TaskWithScore>>;

    /// Same as [`TaskRepository::list_with_scores`] for several occupations at once.
    async fn list_with_scores_for(
        &self,
        occupation_codes: &[String],
        horizon: Horizon,
    ) -> Result<Vec<TaskWithScore>>;

    /// Insert tasks, skipping any (occupation, label) pair already present.
    ///
    /// Returns only the rows actually inserted.
    async fn insert_batch(&self, tasks: &[NewTask]) -> Result<Vec<Task>>;

    /// List every task.
    async fn list_all(&self) -> Result<Vec<Task>>;

    /// Overwrite the stored kind of the given tasks. Returns rows updated.
    async fn update_kinds(&self, kinds: &[(i64, TaskKind)]) -> Result<usize>;
}

// =============================================================================
// SCORE REPOSITORY TRAITS
// =============================================================================

/// Repository for per-task automation scores.
#[async_trait]
pub trait ScoreRepository: Send + Sync {
    /// Upsert scores on (task, horizon) in a single transaction.
    ///
    /// Either every row is written or none is.
    async fn upsert_many(&self, scores: &[UpsertScoreRequest]) -> Result<()>;

    /// Insert scores only where no row exists for (task, horizon).
    ///
    /// Returns the number of rows inserted.
    async fn insert_defaults(&self, scores: &[UpsertScoreRequest]) -> Result<usize>;
}

// =============================================================================
// SIMULATION REPOSITORY TRAITS
// =============================================================================

/// Append-only store of user simulations.
#[async_trait]
pub trait SimulationRepository: Send + Sync {
    /// Persist a simulation and return the stored record.
    async fn insert(&self, req: CreateSimulationRequest) -> Result<UserSimulation>;
}

// =============================================================================
// INFERENCE TRAITS
// =============================================================================

/// Backend for text generation (LLM).
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate text given a prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate text with system context.
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

/// Backend producing per-task automation verdicts for an occupation.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Analyze the given tasks of `occupation`.
    ///
    /// Implementations may return verdicts for a subset of the tasks; callers
    /// must tolerate missing or unknown task ids.
    async fn analyze_occupation(
        &self,
        occupation: &Occupation,
        tasks: &[TaskRef],
    ) -> Result<OccupationAnalysis>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}
