//! # Message Analysis Engine
//!
//! Multi-task analysis of a client conversation: a concurrent fan-out of
//! triage, sentiment, and event detection over the latest message, a risk
//! assessment fed by the triage outcome, and a gated response draft. The
//! [`orchestrator::AnalysisOrchestrator`] joins the tasks into a single
//! [`crate::models::analysis::CompositeAnalysis`] and degrades to a
//! conservative fallback verdict when any task fails for good.
//!
//! Each task is a thin agent over the shared [`task::TaskRunner`], which owns
//! model dispatch, transient-failure retries, and JSON extraction. The
//! `*_structured_output` modules hold the per-task response schemas and their
//! strict validators.

pub mod event_agent;
pub mod event_structured_output;
pub mod orchestrator;
pub mod response_agent;
pub mod retry;
pub mod risk_agent;
pub mod risk_structured_output;
pub mod sentiment_agent;
pub mod sentiment_structured_output;
pub mod task;
pub mod triage_agent;
pub mod triage_structured_output;

// Re-export key types for convenience
pub use event_agent::EventAgent;
pub use orchestrator::{should_generate_response, AnalysisOrchestrator};
pub use response_agent::ResponseAgent;
pub use retry::RetryPolicy;
pub use risk_agent::RiskAgent;
pub use risk_structured_output::RiskVerdict;
pub use sentiment_agent::SentimentAgent;
pub use sentiment_structured_output::SentimentReading;
pub use task::{TaskRunner, TaskSpec};
pub use triage_agent::TriageAgent;
