//! One full ingestion cycle: fetch, dedup, analyze, resolve, store, log.
//!
//! The run only fails outright when every configured provider failed or the
//! store's read side is unreachable. Everything downstream of a single
//! article is best-effort: a write failure is counted and the batch moves on,
//! and the research log never blocks the cycle.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{info, warn};

use hopewire_analysis::{Orchestrator, OrchestratorOutcome};
use hopewire_atlas::Resolver;
use hopewire_common::{Article, HopewireError};
use hopewire_providers::{AggregateOutcome, Aggregator, FetchParams};
use hopewire_store::{LogEntry, ResearchSink};

use crate::dedup::DedupFilter;
use crate::response::AggregateResponse;
use crate::traits::{ArticleReader, ArticleWriter};

const DEFAULT_DEDUP_WINDOW_DAYS: i64 = 30;

fn past(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|at| Instant::now() >= at)
}

/// Counters for one cycle, logged at the end of every run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub sources_used: Vec<String>,
    pub sources_failed: usize,
    /// Articles returned by providers before any dedup.
    pub fetched: usize,
    /// Cross-provider duplicates removed within the batch.
    pub batch_duplicates: usize,
    /// Duplicates against the store (URL or recent-title match).
    pub store_duplicates: usize,
    pub analyzed: usize,
    pub unanalyzed: usize,
    /// Articles held back for the next cycle: the daily AI budget or the run
    /// deadline ran out before they were submitted. Not persisted, so the URL
    /// dedup cannot drop them next time around.
    pub deferred: usize,
    pub stored: usize,
    pub store_failures: usize,
    pub log_rows: usize,
    pub ai_requests: u64,
    pub deadline_exceeded: bool,
}

#[derive(Debug)]
pub struct PipelineRun {
    pub summary: RunSummary,
    pub response: AggregateResponse,
}

pub struct Pipeline {
    aggregator: Aggregator,
    reader: Arc<dyn ArticleReader>,
    orchestrator: Orchestrator,
    resolver: Resolver,
    writer: Arc<dyn ArticleWriter>,
    sink: Option<Arc<dyn ResearchSink>>,
    dedup_window_days: i64,
    deadline: Option<Duration>,
}

impl Pipeline {
    pub fn new(
        aggregator: Aggregator,
        reader: Arc<dyn ArticleReader>,
        orchestrator: Orchestrator,
        resolver: Resolver,
        writer: Arc<dyn ArticleWriter>,
    ) -> Self {
        Self {
            aggregator,
            reader,
            orchestrator,
            resolver,
            writer,
            sink: None,
            dedup_window_days: DEFAULT_DEDUP_WINDOW_DAYS,
            deadline: None,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn ResearchSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_dedup_window(mut self, days: i64) -> Self {
        self.dedup_window_days = days;
        self
    }

    /// Global per-run deadline. A run that overshoots it returns whatever has
    /// completed so far instead of failing; unfinished articles are deferred.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub async fn run(&self, params: &FetchParams) -> Result<PipelineRun, HopewireError> {
        let AggregateOutcome {
            articles,
            sources_used,
            sources_failed,
            batch_duplicates,
        } = self.aggregator.aggregate(params).await;

        if sources_used.is_empty() && !sources_failed.is_empty() {
            return Err(HopewireError::AllProvidersFailed);
        }

        let mut summary = RunSummary {
            sources_used: sources_used.clone(),
            sources_failed: sources_failed.len(),
            fetched: articles.len() + batch_duplicates,
            batch_duplicates,
            ..Default::default()
        };

        let deadline = self.deadline.map(|d| Instant::now() + d);

        let filter = DedupFilter::new(Arc::clone(&self.reader), self.dedup_window_days);
        let filtered = filter.filter(articles).await?;
        summary.store_duplicates = filtered.duplicates.len();
        let fresh = filtered.fresh;

        let scored = self.analyze_within_deadline(&fresh, deadline, &mut summary).await;
        summary.unanalyzed = scored.unanalyzed.len();
        summary.ai_requests = scored.requests_made;

        let primary_id = self
            .orchestrator
            .primary_config()
            .map(|c| c.id)
            .unwrap_or_default();

        let deferred: HashSet<&str> = scored.deferred.iter().map(String::as_str).collect();
        let unanalyzed: HashSet<&str> = scored.unanalyzed.iter().map(String::as_str).collect();
        let mut log_entries = Vec::new();
        for article in &fresh {
            if deferred.contains(article.url.as_str()) {
                summary.deferred += 1;
                continue;
            }
            if past(deadline) {
                if !summary.deadline_exceeded {
                    warn!("Run deadline exceeded while storing; deferring the rest of the batch");
                    summary.deadline_exceeded = true;
                }
                if unanalyzed.contains(article.url.as_str()) {
                    summary.unanalyzed -= 1;
                }
                summary.deferred += 1;
                continue;
            }
            self.store_one(article, &scored.scores, primary_id, &mut summary)
                .await;
            if let Some(results) = scored.scores.get(&article.url) {
                for result in results {
                    log_entries.push(LogEntry::from_result(article, result));
                }
            }
        }
        // analyzed / unanalyzed / deferred partition the fresh batch.
        summary.analyzed = fresh.len() - summary.unanalyzed - summary.deferred;

        if let Some(sink) = &self.sink {
            if !log_entries.is_empty() {
                summary.log_rows = sink.append(&log_entries).await;
            }
        }

        let location_names = self.location_names(&scored.scores).await;
        let response = AggregateResponse::build(
            &fresh,
            &scored.scores,
            primary_id,
            &location_names,
            &sources_used,
            &sources_failed,
        );

        info!(
            fetched = summary.fetched,
            batch_duplicates = summary.batch_duplicates,
            store_duplicates = summary.store_duplicates,
            analyzed = summary.analyzed,
            unanalyzed = summary.unanalyzed,
            deferred = summary.deferred,
            stored = summary.stored,
            store_failures = summary.store_failures,
            log_rows = summary.log_rows,
            ai_requests = summary.ai_requests,
            "Ingestion cycle complete"
        );

        Ok(PipelineRun { summary, response })
    }

    /// Run the orchestrator, bounded by the run deadline when one is set.
    /// A timed-out analysis defers the whole fresh batch: partial results
    /// beat a failed run, and deferred articles come back next cycle.
    async fn analyze_within_deadline(
        &self,
        fresh: &[Article],
        deadline: Option<Instant>,
        summary: &mut RunSummary,
    ) -> OrchestratorOutcome {
        let Some(at) = deadline else {
            return self.orchestrator.run(fresh).await;
        };
        match tokio::time::timeout_at(at, self.orchestrator.run(fresh)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(
                    articles = fresh.len(),
                    "Run deadline exceeded during analysis; deferring the batch"
                );
                summary.deadline_exceeded = true;
                OrchestratorOutcome {
                    deferred: fresh.iter().map(|a| a.url.clone()).collect(),
                    ..Default::default()
                }
            }
        }
    }

    /// Persist one article, counting the outcome. Never aborts the batch.
    async fn store_one(
        &self,
        article: &Article,
        scores: &HashMap<String, Vec<hopewire_common::AnalysisResult>>,
        primary_id: &str,
        summary: &mut RunSummary,
    ) {
        let canonical = scores
            .get(&article.url)
            .and_then(|per_config| per_config.iter().find(|r| r.config_id == primary_id));

        let resolution = match canonical {
            Some(result) => match self.resolver.resolve(result).await {
                Ok(resolution) => Some(resolution),
                Err(e) => {
                    warn!(url = article.url, error = %e, "Taxonomy resolution failed; article not stored");
                    summary.store_failures += 1;
                    return;
                }
            },
            None => None,
        };

        match self
            .writer
            .persist(article, canonical, resolution.as_ref())
            .await
        {
            Ok(Some(_)) => summary.stored += 1,
            Ok(None) => {
                // Another writer landed the same URL between dedup and here.
                summary.store_duplicates += 1;
            }
            Err(e) => {
                warn!(url = article.url, error = %e, "Failed to store article");
                summary.store_failures += 1;
            }
        }
    }

    /// Display names for every code any result reported. Best-effort: the
    /// response degrades to code-only locations if the lookup fails.
    async fn location_names(
        &self,
        scores: &HashMap<String, Vec<hopewire_common::AnalysisResult>>,
    ) -> HashMap<u32, String> {
        let mut codes: Vec<u32> = Vec::new();
        for results in scores.values() {
            for result in results {
                for &code in &result.geo_codes {
                    if !codes.contains(&code) {
                        codes.push(code);
                    }
                }
            }
        }
        if codes.is_empty() {
            return HashMap::new();
        }
        match self.reader.location_names_by_code(&codes).await {
            Ok(names) => names,
            Err(e) => {
                warn!(error = %e, "Location name lookup failed; responding with raw codes");
                HashMap::new()
            }
        }
    }
}
