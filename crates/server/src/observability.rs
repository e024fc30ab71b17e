use once_cell::sync::Lazy;
use prometheus::{register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec, TextEncoder};
use service::errors::ServiceError;

// Prometheus metrics (default registry)
pub static ITEM_OPS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "item_store_operations_total",
        "Item store operations by operation and outcome",
        &["op", "outcome"]
    )
    .expect("register item_store_operations_total")
});

pub static ITEM_OP_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "item_store_operation_duration_seconds",
        "Item store operation duration in seconds",
        &["op"],
        vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .expect("register item_store_operation_duration_seconds")
});

pub fn outcome<T>(res: &Result<T, ServiceError>) -> &'static str {
    match res {
        Ok(_) => "ok",
        Err(ServiceError::NotFound(_)) => "not_found",
        Err(ServiceError::Validation(_)) => "invalid",
        Err(ServiceError::StorageIo(_)) => "io_error",
        Err(ServiceError::CorruptStore(_)) => "corrupt",
    }
}

/// Count one store call and its latency.
pub fn record<T>(op: &str, started: std::time::Instant, res: &Result<T, ServiceError>) {
    ITEM_OPS_TOTAL.with_label_values(&[op, outcome(res)]).inc();
    ITEM_OP_DURATION
        .with_label_values(&[op])
        .observe(started.elapsed().as_secs_f64());
}

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
