//! OpenAPI document, served at `/openapi.json`.

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers::{admin, compare, health, occupations, search, simulation};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Metier API",
        description = "Automation potential of occupations: per-task scores, weekly time simulation, search and comparison"
    ),
    paths(
        search::search,
        occupations::get_occupation_details,
        simulation::get_simulation,
        simulation::run_simulation,
        simulation::redistribute,
        simulation::save_simulation,
        compare::compare,
        admin::import,
        admin::reclassify,
        health::health_check,
    ),
    components(schemas(
        metier_core::Occupation,
        metier_core::OccupationSummary,
        metier_core::ResolvedTask,
        metier_core::ScoreSource,
        metier_core::LlmAnalysisSummary,
        metier_core::SimulationResult,
        metier_core::TaskSimulationResult,
        metier_core::UserSimulation,
        metier_core::NewOccupation,
        metier_core::NewTask,
        metier_core::TaskKind,
        metier_core::ClassificationStats,
        search::SearchResponse,
        occupations::OccupationDetails,
        simulation::SimulationView,
        simulation::RunSimulationRequest,
        simulation::RedistributeRequest,
        simulation::RedistributeResponse,
        simulation::SaveSimulationRequest,
        compare::ComparedOccupation,
        compare::CompareResponse,
        crate::services::ImportRequest,
        crate::services::ImportStats,
    )),
    modifiers(&AdminTokenScheme),
    tags(
        (name = "Occupations", description = "Search, details and comparison"),
        (name = "Simulation", description = "Weekly time allocation scoring"),
        (name = "Admin", description = "Bulk import and maintenance (bearer token)"),
        (name = "System", description = "Health")
    )
)]
pub struct ApiDoc;

struct AdminTokenScheme;

impl Modify for AdminTokenScheme {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "admin_token",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}
