// Test mocks for analysis-facing code.
//
// MockAnalyzer scores deterministically and can be configured to fail its
// first N calls or to skip specific URLs (simulating a model that omits an
// entry from an otherwise-good batch). Shared downstream via `test-support`.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::Utc;

use hopewire_common::{AnalysisResult, Article, EmotionScores, Sentiment};

use crate::configs::AnalysisConfig;
use crate::orchestrator::Analyzer;

pub struct MockAnalyzer {
    calls: AtomicU64,
    fail_first: u64,
    skip_urls: HashSet<String>,
    geo_codes: Vec<u32>,
    delay: Option<Duration>,
}

impl MockAnalyzer {
    pub fn new() -> Self {
        Self {
            calls: AtomicU64::new(0),
            fail_first: 0,
            skip_urls: HashSet::new(),
            geo_codes: Vec::new(),
            delay: None,
        }
    }

    /// Error out the first `n` calls, then succeed.
    pub fn failing_first(mut self, n: u64) -> Self {
        self.fail_first = n;
        self
    }

    /// Never return a result for this URL.
    pub fn skipping(mut self, url: &str) -> Self {
        self.skip_urls.insert(url.to_string());
        self
    }

    /// Report these geographic codes on every result.
    pub fn with_geo_codes(mut self, codes: Vec<u32>) -> Self {
        self.geo_codes = codes;
        self
    }

    /// Sleep this long before answering, to exercise deadline handling.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }
}

impl Default for MockAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Analyzer for MockAnalyzer {
    async fn analyze_batch(
        &self,
        articles: &[Article],
        config: &AnalysisConfig,
    ) -> Result<Vec<(String, AnalysisResult)>> {
        let call = self.calls.fetch_add(1, Ordering::Relaxed);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if call < self.fail_first {
            bail!("mock analyzer failure (call {call})");
        }

        Ok(articles
            .iter()
            .filter(|a| !self.skip_urls.contains(&a.url))
            .map(|a| {
                (
                    a.url.clone(),
                    AnalysisResult {
                        sentiment: Sentiment::Positive,
                        confidence: 0.9,
                        emotions: EmotionScores {
                            hope: 0.8,
                            joy: 0.5,
                            gratitude: 0.4,
                            awe: 0.3,
                            compassion: 0.6,
                            relief: 0.2,
                        },
                        categories: vec!["community".to_string()],
                        geo_codes: self.geo_codes.clone(),
                        hopefulness: 0.75,
                        config_id: config.id.to_string(),
                        analyzed_at: Utc::now(),
                    },
                )
            })
            .collect())
    }
}

/// `n` distinct articles for orchestrator tests.
pub fn test_articles(n: usize) -> Vec<Article> {
    (0..n)
        .map(|i| Article {
            title: format!("Uplifting story number {i}"),
            description: Some(format!("Description {i}")),
            url: format!("https://news.example/story/{i}"),
            author: None,
            published_at: Some(Utc::now()),
            api_source: "newsapi".to_string(),
            content: None,
        })
        .collect()
}
