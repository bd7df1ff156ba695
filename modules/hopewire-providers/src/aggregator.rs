//! Concurrent multi-provider fetch with priority ranking and cross-batch dedup.
//!
//! Every configured adapter is invoked at once; per-adapter failures and
//! timeouts are collected into `sources_failed` and never abort the run.
//! Successes are concatenated in provider priority order, then duplicates
//! (canonical-URL match or title overlap >= threshold) are removed keeping
//! the higher-priority provider's copy.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{info, warn};

use hopewire_common::{normalize_title, title_similarity, Article, TITLE_SIMILARITY_THRESHOLD};

use crate::traits::{FetchParams, NewsProvider, ProviderError};

const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(20);

/// One provider that did not contribute to this run, and why.
#[derive(Debug, Clone)]
pub struct SourceFailure {
    pub provider: String,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct AggregateOutcome {
    /// Ranked, de-duplicated articles in provider priority order.
    pub articles: Vec<Article>,
    pub sources_used: Vec<String>,
    pub sources_failed: Vec<SourceFailure>,
    /// Cross-provider duplicates removed from this batch.
    pub batch_duplicates: usize,
}

pub struct Aggregator {
    providers: Vec<Arc<dyn NewsProvider>>,
    per_provider_timeout: Duration,
}

impl Aggregator {
    pub fn new(mut providers: Vec<Arc<dyn NewsProvider>>) -> Self {
        // Stable sort: ties keep original configuration order.
        providers.sort_by_key(|p| p.priority());
        Self {
            providers,
            per_provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.per_provider_timeout = timeout;
        self
    }

    /// Fan out to every adapter, merge by priority, dedup the batch.
    /// All-providers-failed yields an empty list plus the full failure list —
    /// callers must treat zero results distinctly from a pipeline error.
    pub async fn aggregate(&self, params: &FetchParams) -> AggregateOutcome {
        let fetches = self.providers.iter().map(|provider| {
            let provider = Arc::clone(provider);
            let params = params.clone();
            let timeout = self.per_provider_timeout;
            async move {
                let id = provider.id();
                match tokio::time::timeout(timeout, provider.fetch(&params)).await {
                    Ok(Ok(articles)) => (id, Ok(articles)),
                    Ok(Err(e)) => (id, Err(e)),
                    Err(_) => (
                        id,
                        Err(ProviderError::Http(format!(
                            "timed out after {}s",
                            timeout.as_secs()
                        ))),
                    ),
                }
            }
        });

        let results = join_all(fetches).await;

        let mut outcome = AggregateOutcome::default();
        let mut merged: Vec<Article> = Vec::new();

        // `results` preserves provider order, which is priority order.
        for (id, result) in results {
            match result {
                Ok(articles) => {
                    info!(provider = id, count = articles.len(), "Provider fetch ok");
                    outcome.sources_used.push(id.to_string());
                    merged.extend(articles);
                }
                Err(e) => {
                    warn!(provider = id, error = %e, "Provider fetch failed");
                    outcome.sources_failed.push(SourceFailure {
                        provider: id.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let before = merged.len();
        outcome.articles = dedup_batch(merged);
        outcome.batch_duplicates = before - outcome.articles.len();

        info!(
            articles = outcome.articles.len(),
            duplicates = outcome.batch_duplicates,
            sources_used = outcome.sources_used.len(),
            sources_failed = outcome.sources_failed.len(),
            "Aggregation complete"
        );
        outcome
    }
}

/// Remove within-batch duplicates, keeping the first (highest-priority) copy.
/// Duplicate = same canonical URL, or normalized-title overlap >= threshold.
fn dedup_batch(articles: Vec<Article>) -> Vec<Article> {
    let mut seen_urls: HashSet<String> = HashSet::new();
    let mut kept_titles: Vec<String> = Vec::new();
    let mut kept: Vec<Article> = Vec::new();

    for article in articles {
        if !seen_urls.insert(article.url.clone()) {
            continue;
        }
        let title = normalize_title(&article.title);
        if kept_titles
            .iter()
            .any(|t| title_similarity(t, &title) >= TITLE_SIMILARITY_THRESHOLD)
        {
            continue;
        }
        kept_titles.push(title);
        kept.push(article);
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{article_from, MockProvider};

    fn params() -> FetchParams {
        FetchParams::default()
    }

    #[tokio::test]
    async fn url_equal_pairs_keep_the_higher_priority_copy() {
        let shared = "https://example.org/story";
        let aggregator = Aggregator::new(vec![
            Arc::new(
                MockProvider::new("gnews", 1)
                    .with_articles(vec![article_from("gnews", "Rescue dogs find new homes", shared)]),
            ),
            Arc::new(
                MockProvider::new("newsapi", 0)
                    .with_articles(vec![article_from("newsapi", "Rescued dogs rehomed", shared)]),
            ),
        ]);

        let outcome = aggregator.aggregate(&params()).await;

        assert_eq!(outcome.articles.len(), 1);
        assert_eq!(outcome.articles[0].api_source, "newsapi");
        assert_eq!(outcome.batch_duplicates, 1);
    }

    #[tokio::test]
    async fn near_identical_titles_dedup_to_one_entry() {
        let aggregator = Aggregator::new(vec![
            Arc::new(MockProvider::new("newsapi", 0).with_articles(vec![article_from(
                "newsapi",
                "Scientists cure rare disease in trial",
                "https://a.example/1",
            )])),
            Arc::new(MockProvider::new("gnews", 1).with_articles(vec![article_from(
                "gnews",
                "Scientists cure a rare disease in trial",
                "https://b.example/1",
            )])),
        ]);

        let outcome = aggregator.aggregate(&params()).await;

        assert_eq!(outcome.articles.len(), 1);
        assert_eq!(outcome.articles[0].api_source, "newsapi");
    }

    #[tokio::test]
    async fn dissimilar_titles_are_both_retained() {
        let aggregator = Aggregator::new(vec![
            Arc::new(MockProvider::new("newsapi", 0).with_articles(vec![article_from(
                "newsapi",
                "Global markets rally after rate cut",
                "https://a.example/2",
            )])),
            Arc::new(MockProvider::new("gnews", 1).with_articles(vec![article_from(
                "gnews",
                "Community garden feeds hundreds weekly",
                "https://b.example/2",
            )])),
        ]);

        let outcome = aggregator.aggregate(&params()).await;

        assert_eq!(outcome.articles.len(), 2);
        assert_eq!(outcome.batch_duplicates, 0);
    }

    #[tokio::test]
    async fn timed_out_provider_lands_in_sources_failed() {
        let aggregator = Aggregator::new(vec![
            Arc::new(MockProvider::new("newsapi", 0).with_articles(vec![article_from(
                "newsapi",
                "Reforestation hits milestone",
                "https://a.example/3",
            )])),
            Arc::new(
                MockProvider::new("gnews", 1)
                    .with_articles(vec![article_from(
                        "gnews",
                        "Different story entirely about sports",
                        "https://b.example/3",
                    )])
                    .with_delay(Duration::from_millis(200)),
            ),
            Arc::new(MockProvider::new("currents", 2).with_articles(vec![article_from(
                "currents",
                "Village powered by solar microgrid",
                "https://c.example/3",
            )])),
        ])
        .with_timeout(Duration::from_millis(50));

        let outcome = aggregator.aggregate(&params()).await;

        assert_eq!(outcome.sources_failed.len(), 1);
        assert_eq!(outcome.sources_failed[0].provider, "gnews");
        assert_eq!(outcome.sources_used, vec!["newsapi", "currents"]);
        assert_eq!(outcome.articles.len(), 2);
    }

    #[tokio::test]
    async fn all_providers_failing_yields_empty_not_error() {
        let aggregator = Aggregator::new(vec![
            Arc::new(MockProvider::new("newsapi", 0).failing("key expired")),
            Arc::new(MockProvider::new("gnews", 1).failing("rate limited")),
        ]);

        let outcome = aggregator.aggregate(&params()).await;

        assert!(outcome.articles.is_empty());
        assert!(outcome.sources_used.is_empty());
        assert_eq!(outcome.sources_failed.len(), 2);
    }

    #[tokio::test]
    async fn priority_order_is_preserved_through_merge() {
        let aggregator = Aggregator::new(vec![
            Arc::new(MockProvider::new("currents", 2).with_articles(vec![article_from(
                "currents",
                "Cleanup crew restores river bank",
                "https://c.example/4",
            )])),
            Arc::new(MockProvider::new("newsapi", 0).with_articles(vec![article_from(
                "newsapi",
                "Library expands free tutoring",
                "https://a.example/4",
            )])),
        ]);

        let outcome = aggregator.aggregate(&params()).await;

        let sources: Vec<&str> = outcome.articles.iter().map(|a| a.api_source.as_str()).collect();
        assert_eq!(sources, vec!["newsapi", "currents"]);
    }
}
