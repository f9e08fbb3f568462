use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

static HANDLE: OnceLock<Result<PrometheusHandle, String>> = OnceLock::new();

/// Install the Prometheus recorder globally, once, and keep its handle.
pub fn init_metrics() -> anyhow::Result<()> {
    // ---
    let installed = HANDLE.get_or_init(|| {
        PrometheusBuilder::new()
            .install_recorder()
            .map_err(|err| err.to_string())
    });

    match installed {
        Ok(_) => Ok(()),
        Err(err) => Err(anyhow::anyhow!("failed to install Prometheus recorder: {err}")),
    }
}

/// Render the current metrics in Prometheus text format.
pub fn render_metrics() -> String {
    // ---
    match HANDLE.get() {
        Some(Ok(handle)) => handle.render(),
        _ => String::new(),
    }
}
