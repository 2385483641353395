use std::net::SocketAddr;

use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// How the caller was authenticated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    Session,
    ApiKey,
    /// No credential was required
    Anonymous,
}

/// Per-request principal attached by the access gate.
///
/// Only used for audit logging; dropped with the request.
#[derive(Debug, Clone, Serialize)]
pub struct AuthContext {
    pub request_id: Uuid,
    /// Session subject, when authenticated by session
    pub principal: Option<String>,
    pub method: AuthMethod,
    pub is_authenticated: bool,
    pub client_ip: String,
    pub timestamp: DateTime<Utc>,
}

impl AuthContext {
    pub fn new(method: AuthMethod, principal: Option<String>, client_ip: String) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            principal,
            method,
            is_authenticated: method != AuthMethod::Anonymous,
            client_ip,
            timestamp: Utc::now(),
        }
    }
}

/// Resolve the caller's network origin.
///
/// First `X-Forwarded-For` entry, then `X-Real-IP`, then the socket peer.
pub fn resolve_client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    forwarded
        .or_else(real_ip)
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}
