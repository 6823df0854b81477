//! Shared application state.

use std::sync::Arc;
use std::time::Duration;

use governor::RateLimiter;

use metier_core::{
    AnalysisBackend, OccupationRepository, ScoreRepository, SimulationRepository, TaskRepository,
};
use metier_db::Database;

use crate::auth::token_digest;
use crate::services::{Importer, ScoreResolver};

/// Global rate limiter type (direct quota, no keyed bucketing).
pub type GlobalRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Application state shared across handlers.
///
/// Repositories are trait objects so the router can run against PostgreSQL
/// or against in-memory fakes.
#[derive(Clone)]
pub struct AppState {
    pub occupations: Arc<dyn OccupationRepository>,
    pub tasks: Arc<dyn TaskRepository>,
    pub scores: Arc<dyn ScoreRepository>,
    pub simulations: Arc<dyn SimulationRepository>,
    /// Resolves served scores, consulting the analysis backend when needed.
    pub resolver: ScoreResolver,
    /// SHA-256 of the admin bearer token (None disables admin routes).
    pub admin_token_digest: Option<[u8; 32]>,
    /// Global rate limiter (None if rate limiting is disabled).
    pub rate_limiter: Option<Arc<GlobalRateLimiter>>,
}

impl AppState {
    pub fn new(
        occupations: Arc<dyn OccupationRepository>,
        tasks: Arc<dyn TaskRepository>,
        scores: Arc<dyn ScoreRepository>,
        simulations: Arc<dyn SimulationRepository>,
    ) -> Self {
        let resolver = ScoreResolver::new(tasks.clone(), scores.clone());
        Self {
            occupations,
            tasks,
            scores,
            simulations,
            resolver,
            admin_token_digest: None,
            rate_limiter: None,
        }
    }

    /// State backed by the PostgreSQL repositories of `db`.
    pub fn from_database(db: Database) -> Self {
        Self::new(
            Arc::new(db.occupations),
            Arc::new(db.tasks),
            Arc::new(db.scores),
            Arc::new(db.simulations),
        )
    }

    /// Enable model analysis of unanalyzed occupations.
    pub fn with_analyzer(mut self, analyzer: Arc<dyn AnalysisBackend>, timeout: Duration) -> Self {
        self.resolver = self.resolver.with_analyzer(analyzer, timeout);
        self
    }

    /// Accept `token` as the admin bearer secret. Only its digest is kept.
    pub fn with_admin_token(mut self, token: &str) -> Self {
        self.admin_token_digest = Some(token_digest(token));
        self
    }

    pub fn with_rate_limiter(mut self, limiter: GlobalRateLimiter) -> Self {
        self.rate_limiter = Some(Arc::new(limiter));
        self
    }

    /// Importer over this state's repositories.
    pub fn importer(&self) -> Importer {
        Importer::new(
            self.occupations.clone(),
            self.tasks.clone(),
            self.scores.clone(),
        )
    }
}
