// Trait abstraction over one external news source.
//
// Every adapter normalizes its provider's response shape into the common
// Article type and reports recoverable conditions (auth expiry, rate limit,
// network trouble) as a typed ProviderError so the aggregator can continue
// with the remaining providers.

use async_trait::async_trait;
use thiserror::Error;

use hopewire_common::Article;

/// Fallback query when the caller supplies none.
pub const DEFAULT_QUERY: &str = "good news";
/// Fallback language when the caller supplies none.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Request parameters shared by every adapter.
#[derive(Debug, Clone)]
pub struct FetchParams {
    pub query: Option<String>,
    pub language: Option<String>,
    pub page_size: u32,
}

impl Default for FetchParams {
    fn default() -> Self {
        Self {
            query: None,
            language: None,
            page_size: 50,
        }
    }
}

impl FetchParams {
    pub fn query(&self) -> &str {
        self.query.as_deref().unwrap_or(DEFAULT_QUERY)
    }

    pub fn language(&self) -> &str {
        self.language.as_deref().unwrap_or(DEFAULT_LANGUAGE)
    }

    /// Page size clamped into the range every provider accepts.
    pub fn clamped_page_size(&self) -> u32 {
        self.page_size.clamp(1, 100)
    }
}

/// Recoverable provider failure. Never panics the pipeline; the aggregator
/// records these per provider and carries on.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Rate limited by provider")]
    RateLimited,

    #[error("Request failed: {0}")]
    Http(String),

    #[error("Unexpected response shape: {0}")]
    BadResponse(String),
}

#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Stable identifier recorded as `api_source` on retained articles.
    fn id(&self) -> &'static str;

    /// Static merge priority. Lower wins when deduplicating across providers.
    fn priority(&self) -> u8;

    /// Fetch a page of articles normalized into the common shape.
    /// An empty result is a success, not an error.
    async fn fetch(&self, params: &FetchParams) -> Result<Vec<Article>, ProviderError>;

    /// Cheap reachability/auth probe for the health-check boundary.
    async fn test_connection(&self) -> Result<(), ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_is_clamped_to_provider_bounds() {
        let mut params = FetchParams::default();
        params.page_size = 0;
        assert_eq!(params.clamped_page_size(), 1);
        params.page_size = 500;
        assert_eq!(params.clamped_page_size(), 100);
        params.page_size = 25;
        assert_eq!(params.clamped_page_size(), 25);
    }

    #[test]
    fn defaults_apply_when_params_are_empty() {
        let params = FetchParams::default();
        assert_eq!(params.query(), DEFAULT_QUERY);
        assert_eq!(params.language(), DEFAULT_LANGUAGE);
    }
}
