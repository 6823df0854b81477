//! Service layer for business logic.

pub mod importer;
pub mod score_resolver;

pub use importer::{ImportRequest, ImportStats, Importer};
pub use score_resolver::{ResolvedOccupation, ScoreResolver};
