//! Prometheus metrics for receipt-service.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, HistogramVec, TextEncoder,
};

/// Issued receipts by service type.
pub static RECEIPTS_ISSUED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "receipt_issued_total",
        "Total number of receipts issued by service type",
        &["service_type"]
    )
    .expect("Failed to register receipt_issued_total")
});

/// Verification lookups by outcome.
pub static VERIFICATIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "receipt_verifications_total",
        "Total number of verification lookups by outcome",
        &["outcome"] // valid, already_verified, not_found, tampered, cancelled, rejected
    )
    .expect("Failed to register receipt_verifications_total")
});

/// Status transitions by target status.
pub static TRANSITIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "receipt_transitions_total",
        "Total number of status transitions by target status",
        &["to_status"] // paid, verified, rejected
    )
    .expect("Failed to register receipt_transitions_total")
});

/// Error counter for alerting.
pub static ERRORS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "receipt_errors_total",
        "Total number of errors by type",
        &["error_type"]
    )
    .expect("Failed to register receipt_errors_total")
});

/// Document-store operation duration histogram.
pub static DB_OP_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "receipt_db_op_duration_seconds",
        "Document-store operation duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .expect("Failed to register receipt_db_op_duration")
});

/// Initialize all metrics (forces lazy initialization).
pub fn init_metrics() {
    Lazy::force(&RECEIPTS_ISSUED_TOTAL);
    Lazy::force(&VERIFICATIONS_TOTAL);
    Lazy::force(&TRANSITIONS_TOTAL);
    Lazy::force(&ERRORS_TOTAL);
    Lazy::force(&DB_OP_DURATION);
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder
        .encode_to_string(&metric_families)
        .unwrap_or_default()
}
