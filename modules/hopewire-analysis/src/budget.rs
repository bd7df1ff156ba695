//! Rate controls for the AI service: a daily request budget and a pacer that
//! spaces requests to stay under the per-minute ceiling.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{info, warn};

/// Tracks requests against a daily ceiling.
/// Thread-safe via atomic operations for concurrent analysis tasks.
pub struct RequestBudget {
    /// Daily limit in requests. 0 = unlimited.
    daily_limit: u64,
    /// Requests issued this run.
    used: AtomicU64,
}

impl RequestBudget {
    pub fn new(daily_limit: u64) -> Self {
        Self {
            daily_limit,
            used: AtomicU64::new(0),
        }
    }

    /// Whether another `count` requests fit under the ceiling.
    pub fn has_budget(&self, count: u64) -> bool {
        if self.daily_limit == 0 {
            return true;
        }
        self.used.load(Ordering::Relaxed) + count <= self.daily_limit
    }

    /// Record requests. Returns false if the ceiling is now exceeded
    /// (the spend is still recorded).
    pub fn spend(&self, count: u64) -> bool {
        let prev = self.used.fetch_add(count, Ordering::Relaxed);
        if self.daily_limit > 0 && prev + count > self.daily_limit {
            warn!(
                used = prev + count,
                limit = self.daily_limit,
                "AI request budget exceeded"
            );
            return false;
        }
        true
    }

    pub fn total_used(&self) -> u64 {
        self.used.load(Ordering::Relaxed)
    }

    pub fn is_active(&self) -> bool {
        self.daily_limit > 0
    }

    pub fn log_status(&self) {
        if self.is_active() {
            info!(
                used = self.total_used(),
                limit = self.daily_limit,
                "AI request budget status"
            );
        }
    }
}

/// Enforces a minimum delay between requests so the per-minute ceiling is
/// never exceeded. Callers queue (await) rather than being rejected.
pub struct Pacer {
    min_interval: Duration,
    next_allowed: Mutex<Option<Instant>>,
}

impl Pacer {
    /// `requests_per_minute` of 0 disables pacing.
    pub fn new(requests_per_minute: u32) -> Self {
        let min_interval = if requests_per_minute == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(60.0 / requests_per_minute as f64)
        };
        Self {
            min_interval,
            next_allowed: Mutex::new(None),
        }
    }

    /// Wait until the next request slot, then claim it.
    pub async fn acquire(&self) {
        if self.min_interval.is_zero() {
            return;
        }
        let mut next = self.next_allowed.lock().await;
        let now = Instant::now();
        let slot = match *next {
            Some(t) if t > now => t,
            _ => now,
        };
        *next = Some(slot + self.min_interval);
        drop(next);
        tokio::time::sleep_until(slot).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlimited_budget_always_has_budget() {
        let budget = RequestBudget::new(0);
        assert!(budget.has_budget(1000));
        assert!(budget.spend(1000));
        assert!(!budget.is_active());
    }

    #[test]
    fn budget_tracks_usage() {
        let budget = RequestBudget::new(100);
        assert!(budget.has_budget(50));
        assert!(budget.spend(50));
        assert_eq!(budget.total_used(), 50);
        assert!(!budget.has_budget(51));
    }

    #[test]
    fn budget_exceeded_returns_false() {
        let budget = RequestBudget::new(10);
        assert!(budget.spend(8));
        assert!(!budget.spend(3)); // Still records but reports the breach
        assert_eq!(budget.total_used(), 11);
    }

    #[tokio::test(start_paused = true)]
    async fn pacer_spaces_requests_by_the_minimum_interval() {
        // 600 rpm → 100ms between requests.
        let pacer = Pacer::new(600);
        let start = Instant::now();
        pacer.acquire().await;
        pacer.acquire().await;
        pacer.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test]
    async fn zero_rpm_means_no_pacing() {
        let pacer = Pacer::new(0);
        let start = std::time::Instant::now();
        pacer.acquire().await;
        pacer.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }
}
