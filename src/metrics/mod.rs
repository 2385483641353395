//! Prometheus metrics for the template console.
//!
//! This module provides metrics for monitoring the console:
//! - Send pipeline outcomes by terminal state
//! - Provider call latency and errors by operation
//! - Access gate rejections

mod helpers;

pub use helpers::{encode_metrics, GateMetrics, ProviderMetrics, SendMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "ses_console";

lazy_static! {
    // ============================================================================
    // Send Pipeline Metrics
    // ============================================================================

    /// Send requests by terminal outcome
    pub static ref SEND_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_send_requests_total", METRIC_PREFIX),
        "Templated send requests by terminal outcome",
        &["outcome"]
    ).unwrap();

    // ============================================================================
    // Provider Metrics
    // ============================================================================

    /// Provider call latency by operation
    pub static ref PROVIDER_CALL_DURATION: HistogramVec = register_histogram_vec!(
        format!("{}_provider_call_duration_seconds", METRIC_PREFIX),
        "Email provider call latency in seconds",
        &["operation"],
        vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    ).unwrap();

    /// Provider errors by operation and kind
    pub static ref PROVIDER_ERRORS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_provider_errors_total", METRIC_PREFIX),
        "Email provider errors",
        &["operation", "kind"]
    ).unwrap();

    // ============================================================================
    // Access Gate Metrics
    // ============================================================================

    /// Gate rejections by reason
    pub static ref GATE_REJECTIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_gate_rejections_total", METRIC_PREFIX),
        "Requests rejected by the access gate",
        &["reason"]
    ).unwrap();
}
