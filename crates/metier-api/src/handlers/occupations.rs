//! Occupation detail handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use metier_core::{LlmAnalysisSummary, Occupation, OccupationIdentifier, ResolvedTask};

use crate::{ApiError, AppState};

/// Look up an occupation by code or slug.
///
/// Anything shaped like a code (`M1805`) is looked up by code, everything
/// else by normalized slug.
pub(crate) async fn find_occupation(state: &AppState, raw: &str) -> Result<Occupation, ApiError> {
    let found = match OccupationIdentifier::parse(raw) {
        OccupationIdentifier::Code(code) => state.occupations.get(&code).await?,
        OccupationIdentifier::Slug(slug) => state.occupations.get_by_slug(&slug).await?,
    };
    found.ok_or_else(|| ApiError::NotFound(format!("Occupation '{}' not found", raw.trim())))
}

/// Occupation with its resolved tasks.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OccupationDetails {
    pub occupation: Occupation,
    pub tasks: Vec<ResolvedTask>,
    /// Present only on the request that ran the analysis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_analysis: Option<LlmAnalysisSummary>,
}

/// Get an occupation and its scored tasks.
///
/// Triggers model analysis the first time an occupation is viewed.
///
/// # Returns
/// - 200 OK with occupation details
/// - 404 Not Found if no occupation matches the code or slug
#[utoipa::path(
    get,
    path = "/occupations/{codeOrSlug}/details",
    tag = "Occupations",
    params(("codeOrSlug" = String, Path, description = "Occupation code (e.g. M1805) or slug")),
    responses(
        (status = 200, description = "Occupation with resolved tasks", body = OccupationDetails),
        (status = 404, description = "Unknown occupation")
    )
)]
pub async fn get_occupation_details(
    State(state): State<AppState>,
    Path(code_or_slug): Path<String>,
) -> Result<Json<OccupationDetails>, ApiError> {
    let occupation = find_occupation(&state, &code_or_slug).await?;
    let resolved = state.resolver.resolve(&occupation).await?;

    Ok(Json(OccupationDetails {
        tasks: resolved.resolved_tasks(),
        llm_analysis: resolved.llm_analysis,
        occupation,
    }))
}
