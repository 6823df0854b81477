//! Centralized default constants for metier.
//!
//! Shared defaults live here so the API, importer, and resolver never carry
//! their own magic numbers.

// =============================================================================
// SEARCH
// =============================================================================

/// Maximum number of occupations returned by a search.
pub const SEARCH_LIMIT: usize = 50;

// =============================================================================
// SIMULATION
// =============================================================================

/// Standard working week used for the default time allocation.
pub const WEEKLY_HOURS: u32 = 35;

/// Decimal places kept on simulation outputs.
pub const SCORE_DECIMALS: i32 = 2;

// =============================================================================
// SCORES
// =============================================================================

/// Lower bound of an automation score.
pub const SCORE_MIN: f64 = 0.0;

/// Upper bound of an automation score.
pub const SCORE_MAX: f64 = 100.0;

/// Maximum absolute perturbation applied to a heuristic default score.
pub const HEURISTIC_VARIATION: f64 = 15.0;

// =============================================================================
// ANALYSIS
// =============================================================================

/// Timeout for one occupation analysis call, in seconds.
pub const ANALYSIS_TIMEOUT_SECS: u64 = 45;

/// Sampling temperature for the analysis prompt.
pub const ANALYSIS_TEMPERATURE: f32 = 0.3;

/// Response token budget for the analysis prompt.
pub const ANALYSIS_MAX_TOKENS: u32 = 2000;

// =============================================================================
// IMPORT
// =============================================================================

/// Occupations written per import transaction.
pub const IMPORT_OCCUPATION_BATCH: usize = 100;

/// Tasks written per import transaction.
pub const IMPORT_TASK_BATCH: usize = 500;
