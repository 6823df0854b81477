//! # metier-inference
//!
//! LLM-backed occupation analysis for metier.
//!
//! This crate provides:
//! - OpenAI-compatible chat completion backend (feature `openai`, default)
//! - Occupation analysis prompt construction and reply parsing
//! - Mock backends for tests (feature `mock`)
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use metier_inference::{OccupationAnalyzer, OpenAIBackend, OpenAIConfig};
//!
//! let backend = OpenAIBackend::new(OpenAIConfig::default()).unwrap();
//! let analyzer = OccupationAnalyzer::new(Arc::new(backend));
//! ```

pub mod analysis;

#[cfg(feature = "openai")]
pub mod openai;

// Mock inference backends for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export core types
pub use metier_core::*;

pub use analysis::{
    build_analysis_prompt, extract_json_object, parse_analysis, OccupationAnalyzer,
    ANALYSIS_SYSTEM_PROMPT,
};

#[cfg(feature = "openai")]
pub use openai::{OpenAIBackend, OpenAIConfig};
