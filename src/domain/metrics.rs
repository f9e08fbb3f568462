use std::sync::Arc;
use std::time::Instant;

/// Abstraction for application metrics (counters, histograms).
pub trait Metrics: Send + Sync + 'static {
    // ---
    /// Render current metrics in Prometheus text format.
    fn render(&self) -> String;

    /// Record an accepted guest prediction.
    fn record_prediction_created(&self);

    /// Record a submission rejected by the unique email constraint.
    fn record_duplicate_prediction(&self);

    /// Record an admin login attempt and whether it succeeded.
    fn record_admin_login(&self, success: bool);

    /// Record a reveal-state change delivered to the push hub.
    fn record_reveal_event(&self);

    /// Record HTTP request duration and labels.
    fn record_http_request(&self, start: Instant, path: &str, method: &str, status: u16);
}

/// Type alias for any backend that implements Metrics.
pub type MetricsPtr = Arc<dyn Metrics>;
