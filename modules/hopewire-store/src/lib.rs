pub mod error;
pub mod research_log;
pub mod store;

pub use error::{Result, StoreError};
pub use research_log::{LogEntry, ResearchSink, SheetsSink};
pub use store::{PgStore, StoredArticle};
