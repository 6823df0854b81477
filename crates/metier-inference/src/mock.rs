//! Mock inference backends for deterministic testing.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use metier_inference::mock::MockAnalysisBackend;
//!
//! #[tokio::test]
//! async fn test_with_mock_backend() {
//!     let backend = MockAnalysisBackend::new().with_failure();
//!     // hand `Arc::new(backend.clone())` to the code under test, then
//!     assert_eq!(backend.call_count(), 1);
//! }
//! ```

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use metier_core::{
    AnalysisBackend, Error, GenerationBackend, Occupation, OccupationAnalysis, Result,
    TaskAnalysis, TaskRef,
};

/// A recorded call to a mock backend.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub system: String,
    pub prompt: String,
    pub timestamp: Instant,
}

#[derive(Debug, Clone)]
struct MockConfig {
    response: String,
    latency: Duration,
    fail: bool,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            response: "Mock response".to_string(),
            latency: Duration::ZERO,
            fail: false,
        }
    }
}

/// Mock generation backend returning a fixed reply.
#[derive(Clone)]
pub struct MockGenerationBackend {
    config: Arc<MockConfig>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

impl MockGenerationBackend {
    /// Create a new mock backend with default configuration.
    pub fn new() -> Self {
        Self {
            config: Arc::new(MockConfig::default()),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the reply returned for every prompt.
    pub fn with_fixed_response(mut self, response: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).response = response.into();
        self
    }

    /// Set simulated latency for every call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        Arc::make_mut(&mut self.config).latency = latency;
        self
    }

    /// Make every call fail with an inference error.
    pub fn with_failure(mut self) -> Self {
        Arc::make_mut(&mut self.config).fail = true;
        self
    }

    /// Get all logged calls for assertion.
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.call_log.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Default for MockGenerationBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationBackend for MockGenerationBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_with_system("", prompt).await
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        if let Ok(mut log) = self.call_log.lock() {
            log.push(MockCall {
                system: system.to_string(),
                prompt: prompt.to_string(),
                timestamp: Instant::now(),
            });
        }
        if !self.config.latency.is_zero() {
            tokio::time::sleep(self.config.latency).await;
        }
        if self.config.fail {
            return Err(Error::Inference("Simulated failure".to_string()));
        }
        Ok(self.config.response.clone())
    }

    fn model_name(&self) -> &str {
        "mock-gen"
    }
}

/// Mock analysis backend.
///
/// By default it scores every task it is given at a fixed percentage with
/// non-empty analysis text.
#[derive(Clone)]
pub struct MockAnalysisBackend {
    score: f64,
    extra_verdicts: Vec<TaskAnalysis>,
    latency: Duration,
    fail: bool,
    blank_analysis: bool,
    blank_reasoning: bool,
    calls: Arc<Mutex<Vec<(String, Vec<i64>)>>>,
}

impl MockAnalysisBackend {
    pub fn new() -> Self {
        Self {
            score: 50.0,
            extra_verdicts: Vec::new(),
            latency: Duration::ZERO,
            fail: false,
            blank_analysis: false,
            blank_reasoning: false,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Score returned for every task.
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }

    /// Append a verdict to every reply, e.g. one for an unknown task id.
    pub fn with_extra_verdict(mut self, verdict: TaskAnalysis) -> Self {
        self.extra_verdicts.push(verdict);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_failure(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Reply with empty `analysis` text on every generated verdict.
    pub fn with_blank_analysis(mut self) -> Self {
        self.blank_analysis = true;
        self
    }

    /// Reply with empty `reasoning` text on every generated verdict.
    pub fn with_blank_reasoning(mut self) -> Self {
        self.blank_reasoning = true;
        self
    }

    /// Number of analysis calls received.
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    /// Task ids sent with each call, keyed by occupation code.
    pub fn calls(&self) -> Vec<(String, Vec<i64>)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Default for MockAnalysisBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnalysisBackend for MockAnalysisBackend {
    async fn analyze_occupation(
        &self,
        occupation: &Occupation,
        tasks: &[TaskRef],
    ) -> Result<OccupationAnalysis> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((occupation.code.clone(), tasks.iter().map(|t| t.id).collect()));
        }
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.fail {
            return Err(Error::Inference("Simulated failure".to_string()));
        }

        let mut verdicts: Vec<TaskAnalysis> = tasks
            .iter()
            .map(|t| TaskAnalysis {
                task_id: t.id,
                label: Some(t.label.clone()),
                automation_score: self.score,
                analysis: if self.blank_analysis {
                    String::new()
                } else {
                    format!("Mock analysis of {}", t.label)
                },
                reasoning: if self.blank_reasoning {
                    String::new()
                } else {
                    "Mock reasoning".to_string()
                },
            })
            .collect();
        verdicts.extend(self.extra_verdicts.iter().cloned());

        Ok(OccupationAnalysis {
            occupation_code: occupation.code.clone(),
            overall_score: self.score,
            summary: format!("Mock summary for {}", occupation.title),
            tasks: verdicts,
        })
    }

    fn model_name(&self) -> &str {
        "mock-analysis"
    }
}
