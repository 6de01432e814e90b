//! Counters for provider traffic, token refreshes and degraded searches.
//!
//! Cloning a [`Metrics`] shares the underlying counters, so one value can be
//! handed to every HTTP client and service.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Metrics collector for the integration layer.
#[derive(Debug, Clone)]
pub struct Metrics {
    /// Total number of HTTP requests made
    http_requests_total: Arc<AtomicU64>,

    /// Total number of HTTP errors
    http_errors_total: Arc<AtomicU64>,

    /// Total duration of all HTTP requests in milliseconds
    http_duration_total_ms: Arc<AtomicU64>,

    /// Number of provider contacts fetched
    contacts_fetched_total: Arc<AtomicU64>,

    /// Successful refresh-token exchanges
    token_refreshes_total: Arc<AtomicU64>,

    /// Failed refresh-token exchanges
    token_refresh_failures_total: Arc<AtomicU64>,

    /// Search sources that timed out or failed and contributed nothing
    search_sources_dropped_total: Arc<AtomicU64>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Create a new metrics collector.
    pub fn new() -> Self {
        Self {
            http_requests_total: Arc::new(AtomicU64::new(0)),
            http_errors_total: Arc::new(AtomicU64::new(0)),
            http_duration_total_ms: Arc::new(AtomicU64::new(0)),
            contacts_fetched_total: Arc::new(AtomicU64::new(0)),
            token_refreshes_total: Arc::new(AtomicU64::new(0)),
            token_refresh_failures_total: Arc::new(AtomicU64::new(0)),
            search_sources_dropped_total: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Record an HTTP request with duration.
    pub fn record_http_request(&self, duration: Duration) {
        self.http_requests_total.fetch_add(1, Ordering::Relaxed);
        self.http_duration_total_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    /// Record an HTTP error.
    pub fn record_http_error(&self) {
        self.http_errors_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record contacts fetched.
    pub fn record_contacts_fetched(&self, count: usize) {
        self.contacts_fetched_total
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Record the outcome of a refresh-token exchange.
    pub fn record_token_refresh(&self, success: bool) {
        if success {
            self.token_refreshes_total.fetch_add(1, Ordering::Relaxed);
        } else {
            self.token_refresh_failures_total
                .fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a search source that contributed an empty result because it failed or timed out.
    pub fn record_search_source_dropped(&self) {
        self.search_sources_dropped_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn http_requests_total(&self) -> u64 {
        self.http_requests_total.load(Ordering::Relaxed)
    }

    pub fn http_errors_total(&self) -> u64 {
        self.http_errors_total.load(Ordering::Relaxed)
    }

    pub fn http_duration_total_ms(&self) -> u64 {
        self.http_duration_total_ms.load(Ordering::Relaxed)
    }

    /// Get average HTTP request duration in milliseconds.
    pub fn http_duration_avg_ms(&self) -> f64 {
        let total = self.http_duration_total_ms.load(Ordering::Relaxed);
        let count = self.http_requests_total.load(Ordering::Relaxed);
        if count == 0 {
            0.0
        } else {
            total as f64 / count as f64
        }
    }

    pub fn contacts_fetched_total(&self) -> u64 {
        self.contacts_fetched_total.load(Ordering::Relaxed)
    }

    pub fn token_refreshes_total(&self) -> u64 {
        self.token_refreshes_total.load(Ordering::Relaxed)
    }

    pub fn token_refresh_failures_total(&self) -> u64 {
        self.token_refresh_failures_total.load(Ordering::Relaxed)
    }

    pub fn search_sources_dropped_total(&self) -> u64 {
        self.search_sources_dropped_total.load(Ordering::Relaxed)
    }

    /// Get a summary of all metrics.
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            http_requests_total: self.http_requests_total(),
            http_errors_total: self.http_errors_total(),
            http_duration_total_ms: self.http_duration_total_ms(),
            http_duration_avg_ms: self.http_duration_avg_ms(),
            contacts_fetched_total: self.contacts_fetched_total(),
            token_refreshes_total: self.token_refreshes_total(),
            token_refresh_failures_total: self.token_refresh_failures_total(),
            search_sources_dropped_total: self.search_sources_dropped_total(),
        }
    }
}

/// A snapshot of metrics values.
#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricsSummary {
    pub http_requests_total: u64,
    pub http_errors_total: u64,
    pub http_duration_total_ms: u64,
    pub http_duration_avg_ms: f64,
    pub contacts_fetched_total: u64,
    pub token_refreshes_total: u64,
    pub token_refresh_failures_total: u64,
    pub search_sources_dropped_total: u64,
}

/// Helper for timing HTTP requests.
pub struct HttpTimer {
    start: Instant,
    metrics: Metrics,
}

impl HttpTimer {
    /// Start timing an HTTP request.
    pub fn new(metrics: Metrics) -> Self {
        Self {
            start: Instant::now(),
            metrics,
        }
    }

    /// Complete the timing and record the duration.
    pub fn complete(self) {
        self.metrics.record_http_request(self.start.elapsed());
    }

    /// Complete the timing and record as an error.
    pub fn complete_with_error(self) {
        self.metrics.record_http_request(self.start.elapsed());
        self.metrics.record_http_error();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new();
        assert_eq!(metrics.http_requests_total(), 0);
        assert_eq!(metrics.token_refreshes_total(), 0);
        assert_eq!(metrics.search_sources_dropped_total(), 0);
    }

    #[test]
    fn test_average_duration() {
        let metrics = Metrics::new();
        metrics.record_http_request(Duration::from_millis(100));
        metrics.record_http_request(Duration::from_millis(200));
        assert_eq!(metrics.http_requests_total(), 2);
        assert_eq!(metrics.http_duration_total_ms(), 300);
        assert_eq!(metrics.http_duration_avg_ms(), 150.0);
    }

    #[test]
    fn test_token_refresh_outcomes() {
        let metrics = Metrics::new();
        metrics.record_token_refresh(true);
        metrics.record_token_refresh(true);
        metrics.record_token_refresh(false);

        let summary = metrics.summary();
        assert_eq!(summary.token_refreshes_total, 2);
        assert_eq!(summary.token_refresh_failures_total, 1);
    }

    #[test]
    fn test_http_timer_with_error() {
        let metrics = Metrics::new();
        let timer = HttpTimer::new(metrics.clone());
        timer.complete_with_error();

        assert_eq!(metrics.http_requests_total(), 1);
        assert_eq!(metrics.http_errors_total(), 1);
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = Metrics::new();
        let clone = metrics.clone();

        let handle = thread::spawn(move || {
            for _ in 0..100 {
                clone.record_search_source_dropped();
            }
        });
        for _ in 0..100 {
            metrics.record_search_source_dropped();
        }
        handle.join().unwrap();

        assert_eq!(metrics.search_sources_dropped_total(), 200);
    }
}
