//! Admin handlers. Every route here requires [`RequireAdmin`].

use axum::{extract::State, Json};

use metier_core::ClassificationStats;

use crate::auth::RequireAdmin;
use crate::services::{ImportRequest, ImportStats};
use crate::extract::ApiJson;
use crate::{ApiError, AppState};

/// Bulk import occupations and tasks.
///
/// # Returns
/// - 200 OK with per-batch statistics (failed batches are counted, not fatal)
/// - 401 Unauthorized without a valid admin token
#[utoipa::path(
    post,
    path = "/admin/import",
    tag = "Admin",
    request_body = ImportRequest,
    responses(
        (status = 200, description = "Import statistics", body = ImportStats),
        (status = 401, description = "Missing or invalid admin token")
    ),
    security(("admin_token" = []))
)]
pub async fn import(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ImportRequest>,
) -> Result<Json<ImportStats>, ApiError> {
    Ok(Json(state.importer().import(req).await))
}

/// Recompute the kind of every task from its label.
#[utoipa::path(
    post,
    path = "/admin/tasks/reclassify",
    tag = "Admin",
    responses(
        (status = 200, description = "Classification counts", body = ClassificationStats),
        (status = 401, description = "Missing or invalid admin token")
    ),
    security(("admin_token" = []))
)]
pub async fn reclassify(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<ClassificationStats>, ApiError> {
    Ok(Json(state.importer().reclassify().await?))
}
