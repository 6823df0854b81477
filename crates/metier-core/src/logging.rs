//! Values for the structured `subsystem` and `component` log fields.
//!
//! Every `tracing` event in the workspace tags itself with one subsystem and
//! one component from this module, so log queries can filter on a fixed
//! vocabulary.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events, operation completions |
//! | DEBUG | Decision points, intermediate values |

pub const SUBSYSTEM_API: &str = "api";
pub const SUBSYSTEM_DB: &str = "db";
pub const SUBSYSTEM_INFERENCE: &str = "inference";
pub const SUBSYSTEM_IMPORT: &str = "import";

pub const COMPONENT_AUTH: &str = "auth";
pub const COMPONENT_SEARCH: &str = "search";
pub const COMPONENT_SCORE_RESOLVER: &str = "score_resolver";
pub const COMPONENT_IMPORTER: &str = "importer";
pub const COMPONENT_POOL: &str = "pool";
pub const COMPONENT_OCCUPATIONS: &str = "occupations";
pub const COMPONENT_TASKS: &str = "tasks";
pub const COMPONENT_SCORES: &str = "scores";
pub const COMPONENT_OPENAI: &str = "openai";
pub const COMPONENT_ANALYZER: &str = "analyzer";
