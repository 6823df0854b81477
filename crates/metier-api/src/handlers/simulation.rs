//! Time-allocation simulation handlers.
//!
//! Provides the simulation view of an occupation, the weighted-score
//! computation over a user's weekly hours, the equal redistribution helper,
//! and the append-only save endpoint.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use metier_core::defaults::{SCORE_MAX, SCORE_MIN, WEEKLY_HOURS};
use metier_core::{
    redistribute_equally, simulate, validate_allocation, CreateSimulationRequest,
    LlmAnalysisSummary, Occupation, ResolvedTask, SimulationResult, UserSimulation,
};

use super::occupations::find_occupation;
use crate::extract::ApiJson;
use crate::{ApiError, AppState};

/// Occupation, scored tasks and a starting allocation.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SimulationView {
    pub occupation: Occupation,
    pub tasks: Vec<ResolvedTask>,
    /// The standard week spread equally over the tasks.
    pub default_allocation: BTreeMap<i64, u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_analysis: Option<LlmAnalysisSummary>,
}

/// Request body for running a simulation.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RunSimulationRequest {
    /// Hours per week keyed by task id.
    #[serde(default)]
    pub time_allocation: BTreeMap<i64, Option<f64>>,
}

/// Request body for the redistribution helper.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RedistributeRequest {
    /// Whole hours to spread; defaults to the standard week.
    #[serde(default)]
    pub total_hours: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RedistributeResponse {
    pub time_allocation: BTreeMap<i64, u32>,
}

/// Request body for saving a simulation.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveSimulationRequest {
    pub occupation_code: String,
    #[serde(alias = "timeAllocation")]
    pub time_allocations: BTreeMap<i64, Option<f64>>,
    pub global_score: f64,
}

/// Get the simulation view of an occupation.
#[utoipa::path(
    get,
    path = "/occupations/{code}/simulation",
    tag = "Simulation",
    params(("code" = String, Path, description = "Occupation code or slug")),
    responses(
        (status = 200, description = "Tasks and default allocation", body = SimulationView),
        (status = 404, description = "Unknown occupation")
    )
)]
pub async fn get_simulation(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<SimulationView>, ApiError> {
    let occupation = find_occupation(&state, &code).await?;
    let resolved = state.resolver.resolve(&occupation).await?;

    let default_allocation = redistribute_equally(WEEKLY_HOURS, &resolved.task_ids())
        .into_iter()
        .collect();

    Ok(Json(SimulationView {
        tasks: resolved.resolved_tasks(),
        default_allocation,
        llm_analysis: resolved.llm_analysis,
        occupation,
    }))
}

/// Compute the weighted automation score of a weekly allocation.
///
/// # Returns
/// - 200 OK with the overall score and per-task breakdown
/// - 400 Bad Request if any hours value is null or negative
/// - 404 Not Found if the occupation doesn't exist
#[utoipa::path(
    post,
    path = "/occupations/{code}/simulation",
    tag = "Simulation",
    params(("code" = String, Path, description = "Occupation code or slug")),
    request_body = RunSimulationRequest,
    responses(
        (status = 200, description = "Simulation result", body = SimulationResult),
        (status = 400, description = "Invalid hours"),
        (status = 404, description = "Unknown occupation")
    )
)]
pub async fn run_simulation(
    State(state): State<AppState>,
    Path(code): Path<String>,
    ApiJson(req): ApiJson<RunSimulationRequest>,
) -> Result<Json<SimulationResult>, ApiError> {
    let allocation = validate_allocation(&req.time_allocation)?;
    let occupation = find_occupation(&state, &code).await?;
    let resolved = state.resolver.resolve(&occupation).await?;

    Ok(Json(simulate(&resolved.scored_tasks(), &allocation)))
}

/// Spread whole hours equally over the occupation's tasks.
#[utoipa::path(
    post,
    path = "/occupations/{code}/simulation/redistribute",
    tag = "Simulation",
    params(("code" = String, Path, description = "Occupation code or slug")),
    request_body = RedistributeRequest,
    responses(
        (status = 200, description = "Equal allocation", body = RedistributeResponse),
        (status = 404, description = "Unknown occupation")
    )
)]
pub async fn redistribute(
    State(state): State<AppState>,
    Path(code): Path<String>,
    ApiJson(req): ApiJson<RedistributeRequest>,
) -> Result<Json<RedistributeResponse>, ApiError> {
    let occupation = find_occupation(&state, &code).await?;
    let task_ids: Vec<i64> = state
        .resolver
        .real_tasks(&occupation)
        .await?
        .iter()
        .map(|t| t.task.id)
        .collect();

    let total = req.total_hours.unwrap_or(WEEKLY_HOURS);
    Ok(Json(RedistributeResponse {
        time_allocation: redistribute_equally(total, &task_ids).into_iter().collect(),
    }))
}

/// Persist a simulation.
///
/// # Returns
/// - 201 Created with the stored record
/// - 400 Bad Request if hours or the global score are invalid
/// - 404 Not Found if the occupation doesn't exist
#[utoipa::path(
    post,
    path = "/simulations",
    tag = "Simulation",
    request_body = SaveSimulationRequest,
    responses(
        (status = 201, description = "Saved simulation", body = UserSimulation),
        (status = 400, description = "Invalid hours or score"),
        (status = 404, description = "Unknown occupation")
    )
)]
pub async fn save_simulation(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SaveSimulationRequest>,
) -> Result<(StatusCode, Json<UserSimulation>), ApiError> {
    let time_allocation = validate_allocation(&req.time_allocations)?;
    if !req.global_score.is_finite() || !(SCORE_MIN..=SCORE_MAX).contains(&req.global_score) {
        return Err(ApiError::BadRequest(format!(
            "globalScore must be between {} and {} (got {})",
            SCORE_MIN, SCORE_MAX, req.global_score
        )));
    }
    let occupation = find_occupation(&state, &req.occupation_code).await?;

    let saved = state
        .simulations
        .insert(CreateSimulationRequest {
            occupation_code: occupation.code,
            time_allocation,
            global_score: req.global_score,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(saved)))
}
