use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use hopewire_analysis::{default_configs, ClaudeAnalyzer, Orchestrator, RequestBudget};
use hopewire_atlas::{CategoryStore, LocationStore, Resolver};
use hopewire_common::Config;
use hopewire_pipeline::{ArticleReader, ArticleWriter, FetchScheduler, Pipeline};
use hopewire_providers::{
    Aggregator, CurrentsProvider, FetchParams, GnewsProvider, NewsApiProvider, NewsProvider,
};
use hopewire_store::{PgStore, ResearchSink, SheetsSink};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("hopewire=info".parse()?))
        .init();

    info!("Hopewire pipeline starting...");

    let config = Config::from_env();
    config.log_redacted();

    // Connect to Postgres and run migrations
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let store = Arc::new(PgStore::new(pool));
    store.migrate().await?;

    // News providers, in rank order: only the ones with keys configured.
    let mut providers: Vec<Arc<dyn NewsProvider>> = Vec::new();
    if let Some(key) = &config.newsapi_key {
        providers.push(Arc::new(NewsApiProvider::new(key)));
    }
    if let Some(key) = &config.gnews_api_key {
        providers.push(Arc::new(GnewsProvider::new(key)));
    }
    if let Some(key) = &config.currents_api_key {
        providers.push(Arc::new(CurrentsProvider::new(key)));
    }
    if providers.is_empty() {
        anyhow::bail!("No news provider keys configured; set at least one of NEWSAPI_KEY, GNEWS_API_KEY, CURRENTS_API_KEY");
    }
    info!(providers = providers.len(), "Providers configured");

    let analyzer = Arc::new(ClaudeAnalyzer::new(&config.anthropic_api_key));
    let budget = Arc::new(RequestBudget::new(config.ai_requests_per_day));
    let orchestrator = Orchestrator::new(
        analyzer,
        default_configs(),
        budget,
        config.ai_requests_per_minute,
    );

    let resolver = Resolver::new(
        Arc::clone(&store) as Arc<dyn LocationStore>,
        Arc::clone(&store) as Arc<dyn CategoryStore>,
    );

    let mut pipeline = Pipeline::new(
        Aggregator::new(providers),
        Arc::clone(&store) as Arc<dyn ArticleReader>,
        orchestrator,
        resolver,
        Arc::clone(&store) as Arc<dyn ArticleWriter>,
    )
    .with_dedup_window(config.dedup_window_days);

    if config.research_log_enabled() {
        let sink = SheetsSink::new(
            config.sheets_spreadsheet_id.as_deref().unwrap_or_default(),
            config.sheets_api_token.as_deref().unwrap_or_default(),
        );
        pipeline = pipeline.with_sink(Arc::new(sink) as Arc<dyn ResearchSink>);
    } else {
        warn!("Research log disabled (sheets credentials not set)");
    }

    let scheduler = FetchScheduler::new(
        pipeline,
        FetchParams::default(),
        Duration::from_secs(config.fetch_interval_minutes * 60),
    );
    scheduler.run().await;

    Ok(())
}
