use once_cell::sync::Lazy;
use prometheus::{
    register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec, TextEncoder,
};

// Prometheus metrics (default registry)
pub static EMBED_TOKENS_ISSUED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "prime_hub_embed_tokens_issued_total",
        "Total dashboard embed tokens signed"
    )
    .expect("register embed_tokens_issued_total")
});

pub static EMBED_FAILURES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "prime_hub_embed_failures_total",
        "Embed token requests rejected, by error kind",
        &["kind"]
    )
    .expect("register embed_failures_total")
});

pub static HELPDESK_CALLS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "prime_hub_helpdesk_calls_total",
        "Upstream helpdesk calls, by operation",
        &["operation"]
    )
    .expect("register helpdesk_calls_total")
});

pub static HELPDESK_ERRORS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "prime_hub_helpdesk_errors_total",
        "Upstream helpdesk calls that ended in an error"
    )
    .expect("register helpdesk_errors_total")
});

pub static HELPDESK_RETRIES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "prime_hub_helpdesk_retries_total",
        "Retry attempts against the helpdesk"
    )
    .expect("register helpdesk_retries_total")
});

pub static DEGRADED_RESULTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "prime_hub_degraded_results_total",
        "Ticket requests answered with an empty degraded result, by reason",
        &["reason"]
    )
    .expect("register degraded_results_total")
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_metrics_include_touched_counters() {
        EMBED_TOKENS_ISSUED_TOTAL.inc();
        DEGRADED_RESULTS_TOTAL.with_label_values(&["user_without_school"]).inc();
        let (status, body) = encode_metrics();
        assert_eq!(status, axum::http::StatusCode::OK);
        assert!(body.contains("prime_hub_embed_tokens_issued_total"));
        assert!(body.contains("reason=\"user_without_school\""));
    }
}
