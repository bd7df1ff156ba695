pub mod dedup;
pub mod response;
pub mod run;
pub mod scheduler;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;

pub use dedup::{DedupFilter, DuplicateReason, FilterOutcome};
pub use response::AggregateResponse;
pub use run::{Pipeline, PipelineRun, RunSummary};
pub use scheduler::FetchScheduler;
pub use traits::{ArticleReader, ArticleWriter};
