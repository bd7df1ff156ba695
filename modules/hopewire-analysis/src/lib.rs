pub mod budget;
pub mod client;
pub mod configs;
pub mod orchestrator;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use budget::{Pacer, RequestBudget};
pub use client::ClaudeAnalyzer;
pub use configs::{default_configs, AnalysisConfig};
pub use orchestrator::{Analyzer, Orchestrator, OrchestratorOutcome};
