use once_cell::sync::Lazy;
use prometheus::{register_histogram, register_int_counter, Encoder, Histogram, IntCounter, TextEncoder};

// Prometheus metrics (default registry)
pub static COMMITS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "creation_store_commits_total",
        "Total successful commits, including empty ones"
    )
    .expect("register commits_total")
});

pub static COMMIT_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "creation_store_commit_failures_total",
        "Total commits rejected by the backing store"
    )
    .expect("register commit_failures_total")
});

pub static ROWS_COMMITTED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "creation_store_rows_committed_total",
        "Total creations written by commits"
    )
    .expect("register rows_committed_total")
});

pub static COMMIT_DURATION: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "creation_store_commit_duration_seconds",
        "Commit duration in seconds",
        vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
    )
    .expect("register commit_duration")
});

pub fn encode_metrics() -> (axum::http::StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (
        axum::http::StatusCode::OK,
        String::from_utf8(buffer).unwrap_or_default(),
    )
}
