//! # metier-api
//!
//! HTTP API server for metier.
//!
//! The library exposes the router so it can be served by the binary or
//! exercised directly in tests with any repository implementation.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod openapi;
pub mod services;
pub mod state;

use std::time::Duration;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use metier_core::logging;

pub use config::AppConfig;
pub use error::ApiError;
pub use state::AppState;

use handlers::{admin, compare, health, occupations, search, simulation};

/// Largest accepted request body (bulk imports are the big ones).
const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    if let Some(limiter) = &state.rate_limiter {
        if limiter.check().is_err() {
            tracing::warn!(subsystem = logging::SUBSYSTEM_API, "Rate limit exceeded");
            return (
                StatusCode::TOO_MANY_REQUESTS,
                Json(serde_json::json!({
                    "error": "Too many requests. Please wait before retrying.",
                    "code": "rate_limit_exceeded",
                })),
            )
                .into_response();
        }
    }
    next.run(request).await
}

fn cors_layer(allowed_origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600))
}

/// Build the application router with all middleware.
pub fn build_router(state: AppState, allowed_origins: Vec<HeaderValue>) -> Router {
    Router::new()
        .route("/search", get(search::search))
        .route(
            "/occupations/:code_or_slug/details",
            get(occupations::get_occupation_details),
        )
        .route(
            "/occupations/:code/simulation",
            get(simulation::get_simulation).post(simulation::run_simulation),
        )
        .route(
            "/occupations/:code/simulation/redistribute",
            post(simulation::redistribute),
        )
        .route("/simulations", post(simulation::save_simulation))
        .route("/compare", get(compare::compare))
        .route("/admin/import", post(admin::import))
        .route("/admin/tasks/reclassify", post(admin::reclassify))
        .route("/health", get(health::health_check))
        .route("/openapi.json", get(health::openapi_json))
        // Middleware
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(cors_layer(allowed_origins))
        .layer(CatchPanicLayer::new())
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}
