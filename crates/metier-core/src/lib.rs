//! # metier-core
//!
//! Core types, traits, and scoring logic for metier.
//!
//! This crate holds the domain model (occupations, tasks, automation scores,
//! simulations), the repository and inference traits other crates implement,
//! and the pure algorithms that do not need I/O: simulation, search ranking,
//! classification, and the default score heuristic.

pub mod analysis;
pub mod classify;
pub mod defaults;
pub mod error;
pub mod heuristic;
pub mod identifier;
pub mod logging;
pub mod models;
pub mod search;
pub mod simulation;
pub mod text;
pub mod traits;

// Re-export commonly used types at crate root
pub use analysis::{analysis_state, apply_upserts, build_upserts, clamp_score, AnalysisState};
pub use classify::{classify_task_label, ClassificationStats};
pub use error::{Error, Result};
pub use heuristic::{categorize, default_score, TaskCategory};
pub use identifier::{is_occupation_code, OccupationIdentifier};
pub use models::*;
pub use search::{rank_occupations, search_occupations, summarize};
pub use simulation::{
    redistribute_equally, round_score, simulate, validate_allocation, ScoredTask,
    SimulationResult, TaskSimulationResult,
};
pub use text::normalize_for_search;
pub use traits::*;
