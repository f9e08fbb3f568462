use metrics::{counter, histogram};
use std::time::Instant;

/// Increment the counter of accepted predictions.
pub fn increment_prediction_created() {
    counter!("predictions_created_total").increment(1);
}

/// Increment the counter of submissions rejected as duplicates.
pub fn increment_duplicate_prediction() {
    counter!("predictions_duplicate_total").increment(1);
}

/// Count admin logins, labelled by outcome.
pub fn increment_admin_login(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!("admin_logins_total", "outcome" => outcome).increment(1);
}

/// Count reveal-state changes fanned out to subscribers.
pub fn increment_reveal_event() {
    counter!("reveal_events_total").increment(1);
}

/// Track HTTP request latency using a histogram.
pub fn track_http_request(start: Instant, path: &str, method: &str, status: u16) {
    let elapsed = start.elapsed();
    histogram!(
        "http_request_duration_seconds",
        "path" => path.to_string(),
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .record(elapsed);
}
