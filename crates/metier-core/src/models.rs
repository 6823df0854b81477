//! Core data models for metier.
//!
//! These types are shared across all metier crates and represent the core
//! domain entities: occupations, their tasks, per-task automation scores, and
//! saved user simulations.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classify::classify_task_label;
use crate::error::{Error, Result};

// =============================================================================
// ENUMERATIONS
// =============================================================================

/// Time frame an automation score applies to.
///
/// Only [`Horizon::Now`] is produced by the resolver; the other horizons are
/// accepted by the schema for manually curated scores.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, utoipa::ToSchema,
)]
pub enum Horizon {
    #[default]
    #[serde(rename = "now")]
    Now,
    #[serde(rename = "3y")]
    ThreeYears,
    #[serde(rename = "5y")]
    FiveYears,
}

impl Horizon {
    pub fn as_str(&self) -> &'static str {
        match self {
            Horizon::Now => "now",
            Horizon::ThreeYears => "3y",
            Horizon::FiveYears => "5y",
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Horizon {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "now" => Ok(Horizon::Now),
            "3y" => Ok(Horizon::ThreeYears),
            "5y" => Ok(Horizon::FiveYears),
            other => Err(Error::InvalidInput(format!("Unknown horizon: {}", other))),
        }
    }
}

/// Provenance of an automation score.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    /// Keyword heuristic computed at import time.
    #[default]
    Default,
    /// Curated by an operator.
    Manual,
    /// Produced by the occupation analysis model.
    AiCalculated,
}

impl ScoreSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreSource::Default => "default",
            ScoreSource::Manual => "manual",
            ScoreSource::AiCalculated => "ai_calculated",
        }
    }
}

impl FromStr for ScoreSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "default" => Ok(ScoreSource::Default),
            "manual" => Ok(ScoreSource::Manual),
            "ai_calculated" => Ok(ScoreSource::AiCalculated),
            other => Err(Error::InvalidInput(format!("Unknown score source: {}", other))),
        }
    }
}

/// Classification of a task row.
///
/// The source data bundles "how to access this job" paragraphs (diplomas,
/// experience requirements) with the genuine duties; only
/// [`TaskKind::Definition`] rows take part in scoring and simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Definition,
    AccessRequirement,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Definition => "definition",
            TaskKind::AccessRequirement => "access_requirement",
        }
    }
}

impl FromStr for TaskKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "definition" => Ok(TaskKind::Definition),
            "access_requirement" => Ok(TaskKind::AccessRequirement),
            other => Err(Error::InvalidInput(format!("Unknown task kind: {}", other))),
        }
    }
}

// =============================================================================
// OCCUPATION TYPES
// =============================================================================

/// A standardized occupation record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Occupation {
    pub code: String,
    pub title: String,
    pub sector: Option<String>,
    pub description: Option<String>,
    pub slug: Option<String>,
    pub created_at_utc: DateTime<Utc>,
    pub updated_at_utc: DateTime<Utc>,
}

/// Occupation record supplied by a bulk import.
///
/// Accepts both the API's camelCase names and the field names of the
/// upstream export (`code_rome`, `titre`, `secteur`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewOccupation {
    #[serde(alias = "code_rome", alias = "codeRome")]
    pub code: String,
    #[serde(alias = "titre")]
    pub title: String,
    #[serde(default, alias = "secteur")]
    pub sector: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
}

/// Search result row: an occupation annotated with task statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OccupationSummary {
    pub code: String,
    pub title: String,
    pub slug: Option<String>,
    pub sector: Option<String>,
    pub description: Option<String>,
    /// Number of real tasks (access-requirement rows excluded).
    pub task_count: i64,
    /// Mean `now` score across real tasks, rounded to an integer.
    pub avg_automation_score: f64,
}

// =============================================================================
// TASK TYPES
// =============================================================================

/// One documented duty belonging to an occupation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub occupation_code: String,
    pub label: String,
    pub description: Option<String>,
    pub kind: Option<TaskKind>,
}

impl Task {
    /// Stored classification, or the label classifier's verdict when unset.
    pub fn effective_kind(&self) -> TaskKind {
        self.kind.unwrap_or_else(|| classify_task_label(&self.label))
    }

    /// Whether this row is a genuine duty rather than access boilerplate.
    pub fn is_real_task(&self) -> bool {
        self.effective_kind() == TaskKind::Definition
    }
}

/// Task record supplied by a bulk import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    #[serde(alias = "occupation_code_rome", alias = "occupation_code")]
    pub occupation_code: String,
    #[serde(alias = "libelle")]
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub kind: Option<TaskKind>,
}

// =============================================================================
// SCORE TYPES
// =============================================================================

/// Stored automation score for one (task, horizon).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AutomationScore {
    pub task_id: i64,
    pub horizon: Horizon,
    pub score_pct: f64,
    pub source: ScoreSource,
    pub analysis: Option<String>,
    pub reasoning: Option<String>,
    pub updated_at_utc: DateTime<Utc>,
}

impl AutomationScore {
    /// A row carrying non-empty analysis text marks the task as analyzed.
    pub fn has_analysis(&self) -> bool {
        self.analysis
            .as_deref()
            .map(|a| !a.trim().is_empty())
            .unwrap_or(false)
    }
}

/// A task joined with its score for one horizon, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskWithScore {
    pub task: Task,
    pub score: Option<AutomationScore>,
}

impl TaskWithScore {
    /// Stored percentage, or 0 when no row exists.
    pub fn score_pct(&self) -> f64 {
        self.score.as_ref().map(|s| s.score_pct).unwrap_or(0.0)
    }

    pub fn has_analysis(&self) -> bool {
        self.score.as_ref().map(|s| s.has_analysis()).unwrap_or(false)
    }
}

/// Write request for the (task, horizon) upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertScoreRequest {
    pub task_id: i64,
    pub horizon: Horizon,
    pub score_pct: f64,
    pub source: ScoreSource,
    pub analysis: Option<String>,
    pub reasoning: Option<String>,
}

/// Task as served to clients once its score has been resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedTask {
    pub id: i64,
    pub label: String,
    pub description: Option<String>,
    pub automation_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ScoreSource>,
}

impl From<&TaskWithScore> for ResolvedTask {
    fn from(t: &TaskWithScore) -> Self {
        Self {
            id: t.task.id,
            label: t.task.label.clone(),
            description: t.task.description.clone(),
            automation_score: t.score_pct(),
            analysis: t.score.as_ref().and_then(|s| s.analysis.clone()),
            reasoning: t.score.as_ref().and_then(|s| s.reasoning.clone()),
            source: t.score.as_ref().map(|s| s.source),
        }
    }
}

// =============================================================================
// ANALYSIS TYPES
// =============================================================================

/// Minimal task view sent to the analysis backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskRef {
    pub id: i64,
    pub label: String,
    pub description: Option<String>,
}

impl From<&Task> for TaskRef {
    fn from(t: &Task) -> Self {
        Self {
            id: t.id,
            label: t.label.clone(),
            description: t.description.clone(),
        }
    }
}

/// Per-task verdict returned by the analysis backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAnalysis {
    pub task_id: i64,
    #[serde(default, alias = "libelle")]
    pub label: Option<String>,
    pub automation_score: f64,
    #[serde(default)]
    pub analysis: String,
    #[serde(default)]
    pub reasoning: String,
}

/// Occupation-wide result of one analysis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupationAnalysis {
    pub occupation_code: String,
    pub overall_score: f64,
    #[serde(default)]
    pub summary: String,
    pub tasks: Vec<TaskAnalysis>,
}

/// Occupation-level headline surfaced alongside freshly analyzed tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LlmAnalysisSummary {
    pub summary: String,
    pub overall_score: f64,
}

// =============================================================================
// SIMULATION TYPES
// =============================================================================

/// Request to persist a user's simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateSimulationRequest {
    pub occupation_code: String,
    pub time_allocation: BTreeMap<i64, f64>,
    pub global_score: f64,
}

/// A saved simulation. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSimulation {
    pub id: i64,
    pub occupation_code: String,
    pub time_allocation: BTreeMap<i64, f64>,
    pub global_score: f64,
    pub created_at_utc: DateTime<Utc>,
}
