//! Analysis state and merging of model verdicts into stored scores.

use std::collections::{BTreeMap, HashSet};

use chrono::Utc;

use crate::defaults::{SCORE_MAX, SCORE_MIN};
use crate::models::{
    AutomationScore, Horizon, OccupationAnalysis, ScoreSource, TaskWithScore, UpsertScoreRequest,
};

/// Whether an occupation has already been through model analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisState {
    /// At least one task carries a `now` score with analysis text.
    Analyzed,
    /// No task carries analysis text; the model has not been consulted.
    Unanalyzed,
}

/// Derive the analysis state from an occupation's tasks and `now` scores.
///
/// A single analyzed task is enough: partially analyzed occupations are not
/// re-sent to the model.
pub fn analysis_state(tasks: &[TaskWithScore]) -> AnalysisState {
    let analyzed = tasks.iter().any(|t| {
        t.score
            .as_ref()
            .map(|s| s.horizon == Horizon::Now && s.has_analysis())
            .unwrap_or(false)
    });
    if analyzed {
        AnalysisState::Analyzed
    } else {
        AnalysisState::Unanalyzed
    }
}

/// Clamp a model-provided score into the valid range.
///
/// Returns `None` for NaN or infinite values.
pub fn clamp_score(value: f64) -> Option<f64> {
    if value.is_finite() {
        Some(value.clamp(SCORE_MIN, SCORE_MAX))
    } else {
        None
    }
}

/// Turn a model verdict into `now` score upserts.
///
/// Verdicts for ids outside `known_task_ids` are dropped, as are verdicts
/// with non-finite scores. When the model repeats a task id the first verdict
/// is kept.
///
/// Every persisted row must read back as analyzed, so a verdict with blank
/// analysis borrows its reasoning text, and one with neither is dropped.
pub fn build_upserts(
    analysis: &OccupationAnalysis,
    known_task_ids: &HashSet<i64>,
) -> Vec<UpsertScoreRequest> {
    let mut by_task: BTreeMap<i64, UpsertScoreRequest> = BTreeMap::new();
    for verdict in &analysis.tasks {
        if !known_task_ids.contains(&verdict.task_id) || by_task.contains_key(&verdict.task_id) {
            continue;
        }
        let Some(score) = clamp_score(verdict.automation_score) else {
            continue;
        };
        let Some(text) = non_blank(&verdict.analysis).or_else(|| non_blank(&verdict.reasoning))
        else {
            continue;
        };
        by_task.insert(
            verdict.task_id,
            UpsertScoreRequest {
                task_id: verdict.task_id,
                horizon: Horizon::Now,
                score_pct: score,
                source: ScoreSource::AiCalculated,
                analysis: Some(text.to_string()),
                reasoning: non_blank(&verdict.reasoning).map(String::from),
            },
        );
    }
    by_task.into_values().collect()
}

fn non_blank(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Overlay upserts onto in-memory task rows so the caller can serve them
/// without re-reading the database.
pub fn apply_upserts(tasks: &mut [TaskWithScore], upserts: &[UpsertScoreRequest]) {
    let by_task: BTreeMap<i64, &UpsertScoreRequest> =
        upserts.iter().map(|u| (u.task_id, u)).collect();
    let now = Utc::now();
    for t in tasks.iter_mut() {
        if let Some(u) = by_task.get(&t.task.id) {
            t.score = Some(AutomationScore {
                task_id: u.task_id,
                horizon: u.horizon,
                score_pct: u.score_pct,
                source: u.source,
                analysis: u.analysis.clone(),
                reasoning: u.reasoning.clone(),
                updated_at_utc: now,
            });
        }
    }
}
