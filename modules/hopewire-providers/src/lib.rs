pub mod aggregator;
pub mod currents;
pub mod gnews;
pub mod newsapi;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;

pub use aggregator::{AggregateOutcome, Aggregator, SourceFailure};
pub use currents::CurrentsProvider;
pub use gnews::GnewsProvider;
pub use newsapi::NewsApiProvider;
pub use traits::{FetchParams, NewsProvider, ProviderError};
