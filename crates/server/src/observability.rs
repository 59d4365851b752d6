use once_cell::sync::Lazy;
use prometheus::{register_histogram, register_int_counter, Encoder, Histogram, IntCounter, TextEncoder};
use service::survey::domain::DeliveryReport;

// Prometheus metrics (default registry)
pub static REQUESTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "survey_relay_requests_total",
        "Total survey API requests"
    )
    .expect("register requests_total")
});

pub static LOOKUPS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "survey_relay_lookups_total",
        "Total lead lookups served"
    )
    .expect("register lookups_total")
});

pub static SUBMISSIONS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "survey_relay_submissions_total",
        "Total survey submissions processed"
    )
    .expect("register submissions_total")
});

pub static CRM_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "survey_relay_crm_failures_total",
        "Requests where a CRM call failed"
    )
    .expect("register crm_failures_total")
});

pub static SHEET_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "survey_relay_sheet_failures_total",
        "Requests where the sheet write failed"
    )
    .expect("register sheet_failures_total")
});

pub static REQUEST_DURATION: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "survey_relay_request_duration_seconds",
        "Survey API request duration in seconds",
        vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
    )
    .expect("register request_duration")
});

/// Touch every metric so `/metrics` lists them before the first request.
pub fn register_all() {
    Lazy::force(&REQUESTS_TOTAL);
    Lazy::force(&LOOKUPS_TOTAL);
    Lazy::force(&SUBMISSIONS_TOTAL);
    Lazy::force(&CRM_FAILURES_TOTAL);
    Lazy::force(&SHEET_FAILURES_TOTAL);
    Lazy::force(&REQUEST_DURATION);
}

/// Count collaborator failures from one request.
pub fn record_delivery(report: &DeliveryReport) {
    if report.crm_failed() {
        CRM_FAILURES_TOTAL.inc();
    }
    if report.sheet_failed() {
        SHEET_FAILURES_TOTAL.inc();
    }
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
