//! Occupation search handler.

use std::time::Instant;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

use metier_core::logging;
use metier_core::{search_occupations, summarize, Horizon, OccupationSummary};

use crate::{ApiError, AppState};

/// Query parameters for `GET /search`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Free text matched against title, code and sector.
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResponse {
    pub occupations: Vec<OccupationSummary>,
}

/// Search occupations.
///
/// Matching is case- and accent-insensitive. A blank query returns an empty
/// list rather than an error.
#[utoipa::path(
    get,
    path = "/search",
    tag = "Occupations",
    params(SearchQuery),
    responses((status = 200, description = "Ranked matches", body = SearchResponse))
)]
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    if query.q.trim().is_empty() {
        return Ok(Json(SearchResponse {
            occupations: Vec::new(),
        }));
    }

    let start = Instant::now();
    let matches = search_occupations(state.occupations.list().await?, &query.q);
    let codes: Vec<String> = matches.iter().map(|o| o.code.clone()).collect();
    let tasks = if codes.is_empty() {
        Vec::new()
    } else {
        state
            .tasks
            .list_with_scores_for(&codes, Horizon::Now)
            .await?
    };

    let occupations: Vec<OccupationSummary> =
        matches.iter().map(|o| summarize(o, &tasks)).collect();

    debug!(
        subsystem = logging::SUBSYSTEM_API,
        component = logging::COMPONENT_SEARCH,
        query = %query.q,
        result_count = occupations.len(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Search complete"
    );
    Ok(Json(SearchResponse { occupations }))
}
