//! Side-by-side comparison of two occupations.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use metier_core::{round_score, Occupation, ResolvedTask};

use super::occupations::find_occupation;
use crate::{ApiError, AppState};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CompareQuery {
    /// First occupation (code or slug).
    pub a: Option<String>,
    /// Second occupation (code or slug).
    pub b: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComparedOccupation {
    pub occupation: Occupation,
    pub tasks: Vec<ResolvedTask>,
    pub average_automation_score: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CompareResponse {
    pub a: ComparedOccupation,
    pub b: ComparedOccupation,
    /// `a` average minus `b` average.
    pub difference: f64,
}

async fn load(state: &AppState, raw: &str) -> Result<ComparedOccupation, ApiError> {
    let occupation = find_occupation(state, raw).await?;
    let resolved = state.resolver.resolve(&occupation).await?;
    Ok(ComparedOccupation {
        tasks: resolved.resolved_tasks(),
        average_automation_score: resolved.average_score(),
        occupation,
    })
}

fn required(value: Option<String>, name: &str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("Query parameter '{}' is required", name)))
}

/// Compare the average automation score of two occupations.
#[utoipa::path(
    get,
    path = "/compare",
    tag = "Occupations",
    params(CompareQuery),
    responses(
        (status = 200, description = "Both occupations and the score gap", body = CompareResponse),
        (status = 400, description = "Missing parameter"),
        (status = 404, description = "Unknown occupation")
    )
)]
pub async fn compare(
    State(state): State<AppState>,
    Query(query): Query<CompareQuery>,
) -> Result<Json<CompareResponse>, ApiError> {
    let a = required(query.a, "a")?;
    let b = required(query.b, "b")?;

    let (a, b) = tokio::try_join!(load(&state, &a), load(&state, &b))?;
    let difference = round_score(a.average_automation_score - b.average_automation_score);

    Ok(Json(CompareResponse { a, b, difference }))
}
