//! Periodic driver: runs the pipeline on a fixed interval, forever.
//!
//! A failed cycle is logged and the loop waits for the next tick — the
//! process only exits on signal, never because one run went bad.

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use hopewire_providers::FetchParams;

use crate::run::Pipeline;

pub struct FetchScheduler {
    pipeline: Pipeline,
    params: FetchParams,
    interval: Duration,
}

impl FetchScheduler {
    pub fn new(pipeline: Pipeline, params: FetchParams, interval: Duration) -> Self {
        Self {
            pipeline,
            params,
            interval,
        }
    }

    /// Run cycles until the task is cancelled. The first cycle starts
    /// immediately rather than waiting out a full interval.
    pub async fn run(&self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            info!(interval_secs = self.interval.as_secs(), "Starting ingestion cycle");
            match self.pipeline.run(&self.params).await {
                Ok(run) => info!(
                    stored = run.summary.stored,
                    unanalyzed = run.summary.unanalyzed,
                    "Cycle succeeded"
                ),
                Err(e) => error!(error = %e, "Cycle failed; will retry on the next tick"),
            }
        }
    }
}
