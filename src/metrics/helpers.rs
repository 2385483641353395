//! Metrics helper structs for convenient metric recording

use prometheus::{Encoder, HistogramTimer, TextEncoder};

use crate::provider::ProviderError;

use super::{
    GATE_REJECTIONS_TOTAL, PROVIDER_CALL_DURATION, PROVIDER_ERRORS_TOTAL, SEND_REQUESTS_TOTAL,
};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording send pipeline outcomes
pub struct SendMetrics;

impl SendMetrics {
    /// Record a terminal pipeline outcome
    pub fn record_outcome(outcome: &str) {
        SEND_REQUESTS_TOTAL.with_label_values(&[outcome]).inc();
    }
}

/// Helper struct for recording provider calls
pub struct ProviderMetrics;

impl ProviderMetrics {
    /// Start a latency timer; the duration is observed when it drops
    pub fn start_timer(operation: &str) -> HistogramTimer {
        PROVIDER_CALL_DURATION
            .with_label_values(&[operation])
            .start_timer()
    }

    pub fn record_error(operation: &str, error: &ProviderError) {
        PROVIDER_ERRORS_TOTAL
            .with_label_values(&[operation, error.kind()])
            .inc();
    }
}

/// Helper struct for recording access gate decisions
pub struct GateMetrics;

impl GateMetrics {
    pub fn record_rejection(reason: &str) {
        GATE_REJECTIONS_TOTAL.with_label_values(&[reason]).inc();
    }
}
