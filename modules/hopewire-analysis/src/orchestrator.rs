//! Analysis orchestrator — submits article batches to every active
//! configuration under the request budget and pacer.
//!
//! For N articles and K active configurations the orchestrator produces up to
//! N×K results. A failed call is retried a bounded number of times; articles
//! submitted but still missing a primary-configuration result are reported
//! `unanalyzed` and persist downstream with raw fields only, while articles
//! the daily ceiling kept from being submitted at all are `deferred` to the
//! next cycle. Per-article failures never block the rest of the batch.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, warn};

use hopewire_common::{AnalysisResult, Article};

use crate::budget::{Pacer, RequestBudget};
use crate::configs::AnalysisConfig;

const DEFAULT_CHUNK_SIZE: usize = 5;
/// Attempts per chunk (first try + retries).
const MAX_ATTEMPTS: u32 = 3;

/// Seam for tests and for alternative analysis backends. Returns
/// (canonical url, result) pairs; the service tolerates duplicate submission
/// of the same article under retry.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze_batch(
        &self,
        articles: &[Article],
        config: &AnalysisConfig,
    ) -> Result<Vec<(String, AnalysisResult)>>;
}

#[derive(Debug, Default)]
pub struct OrchestratorOutcome {
    /// url → one result per configuration that produced output, primary first.
    pub scores: HashMap<String, Vec<AnalysisResult>>,
    /// urls submitted under the primary configuration that still have no
    /// primary result after retries. Persisted downstream with raw fields.
    pub unanalyzed: Vec<String>,
    /// urls never submitted under the primary configuration because the daily
    /// budget ran out first. Not persisted, so the next cycle re-fetches and
    /// analyzes them instead of dropping them at the URL dedup.
    pub deferred: Vec<String>,
    pub requests_made: u64,
}

pub struct Orchestrator {
    analyzer: Arc<dyn Analyzer>,
    configs: Vec<AnalysisConfig>,
    budget: Arc<RequestBudget>,
    pacer: Pacer,
    chunk_size: usize,
}

impl Orchestrator {
    pub fn new(
        analyzer: Arc<dyn Analyzer>,
        configs: Vec<AnalysisConfig>,
        budget: Arc<RequestBudget>,
        requests_per_minute: u32,
    ) -> Self {
        Self {
            analyzer,
            configs,
            budget,
            pacer: Pacer::new(requests_per_minute),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// The configuration whose result is promoted onto the article row:
    /// first active config in declaration order.
    pub fn primary_config(&self) -> Option<&AnalysisConfig> {
        self.configs.iter().find(|c| c.enabled)
    }

    /// Score `articles` under every active configuration.
    pub async fn run(&self, articles: &[Article]) -> OrchestratorOutcome {
        let mut outcome = OrchestratorOutcome::default();
        let active: Vec<&AnalysisConfig> = self.configs.iter().filter(|c| c.enabled).collect();

        let Some(primary) = active.first().copied() else {
            warn!("No active analysis configuration; batch left unanalyzed");
            outcome.unanalyzed = articles.iter().map(|a| a.url.clone()).collect();
            return outcome;
        };

        let mut submitted_primary: HashSet<&str> = HashSet::new();

        'configs: for config in &active {
            for chunk in articles.chunks(self.chunk_size) {
                if !self.budget.has_budget(1) {
                    warn!(
                        config = config.id,
                        "Daily request budget exhausted; deferring remaining work to the next cycle"
                    );
                    break 'configs;
                }
                if config.id == primary.id {
                    submitted_primary.extend(chunk.iter().map(|a| a.url.as_str()));
                }
                self.analyze_chunk(chunk, config, &mut outcome).await;
            }
        }

        for article in articles {
            let has_primary = outcome
                .scores
                .get(&article.url)
                .is_some_and(|results| results.iter().any(|r| r.config_id == primary.id));
            if has_primary {
                continue;
            }
            if submitted_primary.contains(article.url.as_str()) {
                outcome.unanalyzed.push(article.url.clone());
            } else {
                outcome.deferred.push(article.url.clone());
            }
        }

        info!(
            articles = articles.len(),
            configurations = active.len(),
            results = outcome.scores.values().map(Vec::len).sum::<usize>(),
            unanalyzed = outcome.unanalyzed.len(),
            deferred = outcome.deferred.len(),
            requests = outcome.requests_made,
            "Analysis batch complete"
        );
        outcome
    }

    /// One chunk under one configuration: bounded retries, then individual
    /// fallback for articles the model skipped inside an otherwise-good batch.
    async fn analyze_chunk(
        &self,
        chunk: &[Article],
        config: &AnalysisConfig,
        outcome: &mut OrchestratorOutcome,
    ) {
        let chunk_urls: HashSet<&str> = chunk.iter().map(|a| a.url.as_str()).collect();
        let mut returned: HashSet<String> = HashSet::new();

        for attempt in 1..=MAX_ATTEMPTS {
            // The ceiling binds every attempt, not just the first per chunk.
            if !self.budget.has_budget(1) {
                warn!(
                    config = config.id,
                    "Daily request budget exhausted mid-chunk; abandoning retries"
                );
                return;
            }
            self.pacer.acquire().await;
            self.budget.spend(1);
            outcome.requests_made += 1;

            match self.analyzer.analyze_batch(chunk, config).await {
                Ok(results) => {
                    for (url, result) in results {
                        // Ignore results for articles outside this chunk.
                        if chunk_urls.contains(url.as_str()) && returned.insert(url.clone()) {
                            outcome.scores.entry(url).or_default().push(result);
                        }
                    }
                    break;
                }
                Err(e) => {
                    warn!(
                        config = config.id,
                        attempt,
                        error = %e,
                        "Analysis call failed"
                    );
                }
            }
        }

        // Individual fallback for skipped entries.
        let missing: Vec<&Article> = chunk
            .iter()
            .filter(|a| !returned.contains(&a.url))
            .collect();
        for article in missing {
            if !self.budget.has_budget(1) {
                return;
            }
            self.pacer.acquire().await;
            self.budget.spend(1);
            outcome.requests_made += 1;

            match self
                .analyzer
                .analyze_batch(std::slice::from_ref(article), config)
                .await
            {
                Ok(results) => {
                    for (url, result) in results {
                        if url == article.url {
                            outcome.scores.entry(url).or_default().push(result);
                        }
                    }
                }
                Err(e) => {
                    warn!(
                        config = config.id,
                        url = article.url,
                        error = %e,
                        "Individual analysis retry failed"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configs::default_configs;
    use crate::testing::{test_articles, MockAnalyzer};

    fn orchestrator(analyzer: MockAnalyzer, daily_limit: u64) -> Orchestrator {
        Orchestrator::new(
            Arc::new(analyzer),
            default_configs(),
            Arc::new(RequestBudget::new(daily_limit)),
            0, // no pacing in tests
        )
    }

    #[tokio::test]
    async fn every_article_gets_one_result_per_active_config() {
        let articles = test_articles(3);
        let outcome = orchestrator(MockAnalyzer::new(), 0).run(&articles).await;

        for article in &articles {
            let results = &outcome.scores[&article.url];
            assert_eq!(results.len(), 2, "one result per configuration");
            assert_eq!(results[0].config_id, "baseline", "primary first");
            assert_eq!(results[1].config_id, "strict");
        }
        assert!(outcome.unanalyzed.is_empty());
    }

    #[tokio::test]
    async fn transient_failures_are_retried_within_bounds() {
        // First two calls fail; retries inside the chunk recover everything.
        let articles = test_articles(2);
        let outcome = orchestrator(MockAnalyzer::new().failing_first(2), 0)
            .run(&articles)
            .await;

        assert!(outcome.unanalyzed.is_empty());
        assert!(outcome.requests_made >= 3);
    }

    #[tokio::test]
    async fn skipped_article_is_retried_individually_then_marked_unanalyzed() {
        let articles = test_articles(3);
        let skipped = articles[1].url.clone();
        let outcome = orchestrator(MockAnalyzer::new().skipping(&skipped), 0)
            .run(&articles)
            .await;

        assert_eq!(outcome.unanalyzed, vec![skipped.clone()]);
        assert!(!outcome.scores.contains_key(&skipped));
        // The rest of the batch is unaffected.
        assert_eq!(outcome.scores.len(), 2);
    }

    #[tokio::test]
    async fn exhausted_budget_defers_unsubmitted_articles() {
        let articles = test_articles(4);
        // One request covers the first chunk of the primary config only.
        let outcome = orchestrator(MockAnalyzer::new(), 1)
            .with_chunk_size(2)
            .run(&articles)
            .await;

        assert_eq!(outcome.requests_made, 1);
        // Second chunk never ran under the primary config: deferred to the
        // next cycle, never reported as an analysis failure.
        assert!(outcome.unanalyzed.is_empty());
        assert_eq!(
            outcome.deferred,
            vec![articles[2].url.clone(), articles[3].url.clone()]
        );
    }

    #[tokio::test]
    async fn failing_retries_never_breach_the_daily_ceiling() {
        let articles = test_articles(2);
        let budget = Arc::new(RequestBudget::new(1));
        let orchestrator = Orchestrator::new(
            Arc::new(MockAnalyzer::new().failing_first(u64::MAX)),
            default_configs(),
            Arc::clone(&budget),
            0,
        );
        let outcome = orchestrator.run(&articles).await;

        // The first attempt spends the whole budget; retries must not.
        assert_eq!(outcome.requests_made, 1);
        assert_eq!(budget.total_used(), 1);
        // The chunk was submitted once, so its articles failed, not deferred.
        assert_eq!(outcome.unanalyzed.len(), 2);
        assert!(outcome.deferred.is_empty());
    }

    #[tokio::test]
    async fn no_active_configs_leaves_batch_unanalyzed() {
        let mut configs = default_configs();
        for c in &mut configs {
            c.enabled = false;
        }
        let orchestrator = Orchestrator::new(
            Arc::new(MockAnalyzer::new()),
            configs,
            Arc::new(RequestBudget::new(0)),
            0,
        );
        let articles = test_articles(2);
        let outcome = orchestrator.run(&articles).await;

        assert_eq!(outcome.unanalyzed.len(), 2);
        assert_eq!(outcome.requests_made, 0);
    }
}
