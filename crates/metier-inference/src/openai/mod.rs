//! OpenAI-compatible inference backend.
//!
//! Works with any endpoint that speaks the chat completions API: the OpenAI
//! cloud, Azure OpenAI, Ollama in compatibility mode, vLLM, LM Studio.
//!
//! # Example
//!
//! ```rust,no_run
//! use metier_inference::openai::{OpenAIBackend, OpenAIConfig};
//! use metier_core::GenerationBackend;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = OpenAIConfig {
//!         base_url: "http://localhost:11434/v1".to_string(),
//!         gen_model: "llama3".to_string(),
//!         ..Default::default()
//!     };
//!     let backend = OpenAIBackend::new(config).unwrap();
//!     let reply = backend.generate("Bonjour").await.unwrap();
//! }
//! ```

mod backend;
mod error;
mod types;

pub use backend::{
    OpenAIBackend, OpenAIConfig, DEFAULT_GEN_MODEL, DEFAULT_OPENAI_URL, DEFAULT_TIMEOUT_SECS,
};
pub use error::{to_metier_error, OpenAIErrorCode};
pub use types::*;
