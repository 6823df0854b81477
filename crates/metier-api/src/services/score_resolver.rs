//! Resolution of the automation scores served for an occupation.
//!
//! ## Resolution Order
//!
//! For each real task of the occupation:
//! 1. A stored `now` score carrying analysis text is authoritative
//! 2. If no task of the occupation is analyzed yet, the analysis backend is
//!    asked once for all of them and the verdicts are persisted
//! 3. If that call fails or times out, whatever is stored is served
//! 4. A task with no score row at all is served as 0
//!
//! ## Error Handling
//!
//! - Analysis failure or timeout: logged at WARN, never surfaced
//! - Persisting fresh verdicts fails: logged at ERROR, verdicts still served
//! - Reading tasks fails: returned to the caller

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use metier_core::logging;
use metier_core::defaults::ANALYSIS_TIMEOUT_SECS;
use metier_core::{
    analysis_state, apply_upserts, build_upserts, clamp_score, round_score, AnalysisBackend,
    AnalysisState, Horizon, LlmAnalysisSummary, Occupation, ResolvedTask, Result, ScoreRepository,
    ScoredTask, TaskRef, TaskRepository, TaskWithScore,
};

/// Scores of one occupation, ready to serve.
#[derive(Debug, Clone)]
pub struct ResolvedOccupation {
    /// Real tasks only, in listing order.
    pub tasks: Vec<TaskWithScore>,
    /// Headline of the analysis run by this resolution, if one ran and succeeded.
    pub llm_analysis: Option<LlmAnalysisSummary>,
}

impl ResolvedOccupation {
    pub fn resolved_tasks(&self) -> Vec<ResolvedTask> {
        self.tasks.iter().map(ResolvedTask::from).collect()
    }

    pub fn scored_tasks(&self) -> Vec<ScoredTask> {
        self.tasks
            .iter()
            .map(|t| ScoredTask {
                id: t.task.id,
                score: t.score_pct(),
            })
            .collect()
    }

    pub fn task_ids(&self) -> Vec<i64> {
        self.tasks.iter().map(|t| t.task.id).collect()
    }

    /// Unweighted mean score of the real tasks, 0 when there are none.
    pub fn average_score(&self) -> f64 {
        if self.tasks.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.tasks.iter().map(|t| t.score_pct()).sum();
        round_score(sum / self.tasks.len() as f64)
    }
}

/// Service resolving per-task scores, with lazy model analysis.
#[derive(Clone)]
pub struct ScoreResolver {
    tasks: Arc<dyn TaskRepository>,
    scores: Arc<dyn ScoreRepository>,
    analyzer: Option<Arc<dyn AnalysisBackend>>,
    timeout: Duration,
}

impl ScoreResolver {
    /// Resolver serving stored scores only.
    pub fn new(tasks: Arc<dyn TaskRepository>, scores: Arc<dyn ScoreRepository>) -> Self {
        Self {
            tasks,
            scores,
            analyzer: None,
            timeout: Duration::from_secs(ANALYSIS_TIMEOUT_SECS),
        }
    }

    /// Consult `analyzer` for unanalyzed occupations, bounded by `timeout`.
    pub fn with_analyzer(mut self, analyzer: Arc<dyn AnalysisBackend>, timeout: Duration) -> Self {
        self.analyzer = Some(analyzer);
        self.timeout = timeout;
        self
    }

    pub fn has_analyzer(&self) -> bool {
        self.analyzer.is_some()
    }

    /// Stored `now` rows of `occupation`'s real tasks, in listing order.
    ///
    /// Never consults the analysis backend.
    pub async fn real_tasks(&self, occupation: &Occupation) -> Result<Vec<TaskWithScore>> {
        Ok(self
            .tasks
            .list_with_scores(&occupation.code, Horizon::Now)
            .await?
            .into_iter()
            .filter(|t| t.task.is_real_task())
            .collect())
    }

    /// Resolve the scores of `occupation`'s real tasks.
    pub async fn resolve(&self, occupation: &Occupation) -> Result<ResolvedOccupation> {
        let start = Instant::now();
        let mut tasks = self.real_tasks(occupation).await?;

        let state = analysis_state(&tasks);
        let mut llm_analysis = None;
        if state == AnalysisState::Unanalyzed && !tasks.is_empty() {
            if let Some(analyzer) = &self.analyzer {
                llm_analysis = self
                    .analyze(analyzer.as_ref(), occupation, &mut tasks)
                    .await;
            }
        }

        debug!(
            subsystem = logging::SUBSYSTEM_API,
            component = logging::COMPONENT_SCORE_RESOLVER,
            op = "resolve",
            occupation_code = %occupation.code,
            task_count = tasks.len(),
            analysis_state = ?state,
            analyzed_now = llm_analysis.is_some(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Resolved occupation scores"
        );

        Ok(ResolvedOccupation {
            tasks,
            llm_analysis,
        })
    }

    /// Run one analysis call and merge its verdicts into `tasks`.
    ///
    /// Returns `None` when the call failed or timed out; `tasks` is then
    /// left untouched.
    async fn analyze(
        &self,
        analyzer: &dyn AnalysisBackend,
        occupation: &Occupation,
        tasks: &mut [TaskWithScore],
    ) -> Option<LlmAnalysisSummary> {
        let start = Instant::now();
        let refs: Vec<TaskRef> = tasks.iter().map(|t| TaskRef::from(&t.task)).collect();

        let analysis = match tokio::time::timeout(
            self.timeout,
            analyzer.analyze_occupation(occupation, &refs),
        )
        .await
        {
            Ok(Ok(analysis)) => analysis,
            Ok(Err(e)) => {
                warn!(
                    subsystem = logging::SUBSYSTEM_API,
                    component = logging::COMPONENT_SCORE_RESOLVER,
                    op = "analyze",
                    occupation_code = %occupation.code,
                    model = analyzer.model_name(),
                    error = %e,
                    "Automation analysis failed, serving stored scores"
                );
                return None;
            }
            Err(_) => {
                warn!(
                    subsystem = logging::SUBSYSTEM_API,
                    component = logging::COMPONENT_SCORE_RESOLVER,
                    op = "analyze",
                    occupation_code = %occupation.code,
                    model = analyzer.model_name(),
                    timeout_secs = self.timeout.as_secs_f64(),
                    "Automation analysis timed out, serving stored scores"
                );
                return None;
            }
        };

        let known: HashSet<i64> = tasks.iter().map(|t| t.task.id).collect();
        let upserts = build_upserts(&analysis, &known);
        if upserts.len() < analysis.tasks.len() {
            debug!(
                subsystem = logging::SUBSYSTEM_API,
                component = logging::COMPONENT_SCORE_RESOLVER,
                occupation_code = %occupation.code,
                returned = analysis.tasks.len(),
                kept = upserts.len(),
                "Dropped verdicts for unknown tasks or invalid scores"
            );
        }

        if !upserts.is_empty() {
            if let Err(e) = self.scores.upsert_many(&upserts).await {
                error!(
                    subsystem = logging::SUBSYSTEM_API,
                    component = logging::COMPONENT_SCORE_RESOLVER,
                    op = "upsert_scores",
                    occupation_code = %occupation.code,
                    error = %e,
                    "Failed to persist analysis, serving it unsaved"
                );
            }
        }
        apply_upserts(tasks, &upserts);

        info!(
            subsystem = logging::SUBSYSTEM_API,
            component = logging::COMPONENT_SCORE_RESOLVER,
            op = "analyze",
            occupation_code = %occupation.code,
            model = analyzer.model_name(),
            task_count = upserts.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Occupation analyzed"
        );

        Some(LlmAnalysisSummary {
            summary: analysis.summary,
            overall_score: clamp_score(analysis.overall_score).unwrap_or(0.0),
        })
    }
}
