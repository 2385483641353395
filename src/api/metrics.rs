//! Console metrics in Prometheus text format.
//!
//! Serves the `ses_console_*` families: send outcomes, provider call latency
//! and errors, and access gate rejections.

use axum::{http::header, response::IntoResponse};

use crate::error::AppError;
use crate::metrics::encode_metrics;

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// GET /metrics - unauthenticated scrape target
pub async fn prometheus_metrics() -> Result<impl IntoResponse, AppError> {
    let output = encode_metrics()
        .map_err(|e| AppError::Internal(format!("Failed to encode console metrics: {}", e)))?;

    Ok(([(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], output))
}
