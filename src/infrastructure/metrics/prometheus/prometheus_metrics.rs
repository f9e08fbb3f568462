//! Prometheus metrics implementation.
//!
//! Implements the `Metrics` trait on top of the global `metrics` crate
//! registry. Counters and histograms are registered on first use by the
//! helpers in `counters.rs`; `recorder.rs` owns the handle that renders them.

use crate::domain::Metrics;
use std::time::Instant;

/// Prometheus-based metrics implementation.
///
/// Stateless: all series live in the global registry installed by
/// `recorder::init_metrics`.
pub struct PrometheusMetrics {
    // Empty - uses global metrics registry pattern
}

impl PrometheusMetrics {
    pub fn new() -> Self {
        tracing::info!("Creating Prometheus metrics");
        PrometheusMetrics {}
    }
}

impl Metrics for PrometheusMetrics {
    fn render(&self) -> String {
        super::render_metrics()
    }

    fn record_prediction_created(&self) {
        tracing::debug!("Recording prediction created event");
        super::increment_prediction_created();
    }

    fn record_duplicate_prediction(&self) {
        super::increment_duplicate_prediction();
    }

    fn record_admin_login(&self, success: bool) {
        super::increment_admin_login(success);
    }

    fn record_reveal_event(&self) {
        super::increment_reveal_event();
    }

    fn record_http_request(&self, start: Instant, path: &str, method: &str, status: u16) {
        super::track_http_request(start, path, method, status);
    }
}
