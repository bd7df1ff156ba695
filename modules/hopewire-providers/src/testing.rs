// Test mocks for provider-facing code.
//
// MockProvider is builder-style: `.with_articles()`, `.failing()`, `.with_delay()`.
// Shared with downstream crates through the `test-support` feature.

use std::time::Duration;

use async_trait::async_trait;

use hopewire_common::Article;

use crate::traits::{FetchParams, NewsProvider, ProviderError};

/// Canned news provider. Returns its configured articles, an error, or
/// sleeps first to exercise the aggregator's per-adapter timeout.
pub struct MockProvider {
    id: &'static str,
    priority: u8,
    articles: Vec<Article>,
    error: Option<String>,
    delay: Option<Duration>,
}

impl MockProvider {
    pub fn new(id: &'static str, priority: u8) -> Self {
        Self {
            id,
            priority,
            articles: Vec::new(),
            error: None,
            delay: None,
        }
    }

    pub fn with_articles(mut self, articles: Vec<Article>) -> Self {
        self.articles = articles;
        self
    }

    pub fn failing(mut self, reason: &str) -> Self {
        self.error = Some(reason.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl NewsProvider for MockProvider {
    fn id(&self) -> &'static str {
        self.id
    }

    fn priority(&self) -> u8 {
        self.priority
    }

    async fn fetch(&self, _params: &FetchParams) -> Result<Vec<Article>, ProviderError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(reason) = &self.error {
            return Err(ProviderError::Http(reason.clone()));
        }
        Ok(self.articles.clone())
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        if let Some(reason) = &self.error {
            return Err(ProviderError::Http(reason.clone()));
        }
        Ok(())
    }
}

/// Minimal article for tests.
pub fn article_from(source: &str, title: &str, url: &str) -> Article {
    Article {
        title: title.to_string(),
        description: Some(format!("{title} (description)")),
        url: url.to_string(),
        author: None,
        published_at: Some(chrono::Utc::now()),
        api_source: source.to_string(),
        content: None,
    }
}
