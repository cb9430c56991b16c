use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the in-process Prometheus recorder.
/// The process is one-shot, so nothing is served over HTTP; callers
/// render the handle once the run is over.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Prometheus text exposition of everything recorded so far.
pub fn render_metrics(handle: &PrometheusHandle) -> String {
    handle.render()
}

// ── Fetch metrics ────────────────────────────────────────────────

pub fn record_fetch(endpoint: &str, outcome: &'static str) {
    counter!("snapshot_fetches_total", "endpoint" => endpoint.to_string(), "outcome" => outcome)
        .increment(1);
}

pub fn record_fetch_latency(endpoint: &str, latency_ms: f64) {
    histogram!("snapshot_fetch_latency_ms", "endpoint" => endpoint.to_string())
        .record(latency_ms);
}

pub fn record_ticks(count: usize) {
    counter!("snapshot_ticks_total").increment(count as u64);
}

pub fn record_sentinel_prices(count: usize) {
    counter!("snapshot_sentinel_prices_total").increment(count as u64);
}

// ── Persist metrics ──────────────────────────────────────────────

pub fn record_persist(outcome: &'static str) {
    counter!("snapshot_persists_total", "outcome" => outcome).increment(1);
}

pub fn record_persisted_bytes(bytes: usize) {
    histogram!("snapshot_persisted_bytes").record(bytes as f64);
}
