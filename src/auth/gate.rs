//! Access gate: authenticates and authorizes a request before any handler runs.

use axum::http::{header, HeaderMap};

use crate::config::{ApiConfig, AuthConfig};
use crate::error::AppError;
use crate::metrics::GateMetrics;

use super::{AuthContext, AuthMethod, SessionValidator};

const API_KEY_HEADER: &str = "x-api-key";

pub struct AccessGate {
    validator: SessionValidator,
    config: AuthConfig,
    api_key: Option<String>,
    provider_credentials_configured: bool,
}

impl AccessGate {
    pub fn new(config: &AuthConfig, api: &ApiConfig, provider_credentials_configured: bool) -> Self {
        Self {
            validator: SessionValidator::new(config),
            config: config.clone(),
            api_key: api.key.clone(),
            provider_credentials_configured,
        }
    }

    /// Run every configured check; on success returns the audit context.
    pub fn authenticate(&self, headers: &HeaderMap, client_ip: String) -> Result<AuthContext, AppError> {
        let mut method = AuthMethod::Anonymous;
        let mut principal = None;

        if self.config.require_api_key {
            self.check_api_key(headers, &client_ip)?;
            method = AuthMethod::ApiKey;
        }

        if self.config.require_session {
            let Some(token) = self.session_token(headers) else {
                return Err(reject(
                    "missing_session",
                    &client_ip,
                    AppError::Auth("Authentication required".to_string()),
                ));
            };

            let claims = self.validator.validate(token).map_err(|e| {
                tracing::debug!(error = %e, "Session token rejected");
                reject(
                    "invalid_session",
                    &client_ip,
                    AppError::Auth("Invalid or expired session".to_string()),
                )
            })?;

            if let Some(role) = &self.config.required_role {
                if !claims.has_role(role) {
                    return Err(reject(
                        "missing_role",
                        &client_ip,
                        AppError::Forbidden("Insufficient permissions".to_string()),
                    ));
                }
            }

            method = AuthMethod::Session;
            principal = Some(claims.subject().to_string());
        }

        if self.config.validate_provider_credentials && !self.provider_credentials_configured {
            return Err(reject(
                "provider_credentials",
                &client_ip,
                AppError::Forbidden("Email provider credentials are not configured".to_string()),
            ));
        }

        let context = AuthContext::new(method, principal, client_ip);

        tracing::info!(
            request_id = %context.request_id,
            timestamp = %context.timestamp.to_rfc3339(),
            client_ip = %context.client_ip,
            authenticated = context.is_authenticated,
            method = ?context.method,
            "Request admitted"
        );

        Ok(context)
    }

    fn check_api_key(&self, headers: &HeaderMap, client_ip: &str) -> Result<(), AppError> {
        let Some(expected) = self.api_key.as_deref().filter(|key| !key.is_empty()) else {
            return Err(reject(
                "api_key_unconfigured",
                client_ip,
                AppError::Auth("API key authentication is not configured".to_string()),
            ));
        };

        match headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()) {
            Some(key) if key == expected => Ok(()),
            Some(_) => Err(reject(
                "invalid_api_key",
                client_ip,
                AppError::Auth("Invalid API key".to_string()),
            )),
            None => Err(reject(
                "missing_api_key",
                client_ip,
                AppError::Auth("Missing API key".to_string()),
            )),
        }
    }

    /// Session token from the session cookie, else a Bearer header
    fn session_token<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        let from_cookie = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.config.session_cookie)
            .map(|(_, value)| value)
            .filter(|value| !value.is_empty());

        from_cookie.or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
        })
    }
}

fn reject(reason: &str, client_ip: &str, err: AppError) -> AppError {
    GateMetrics::record_rejection(reason);
    tracing::warn!(
        reason = %reason,
        client_ip = %client_ip,
        timestamp = %chrono::Utc::now().to_rfc3339(),
        "Unauthorized access attempt"
    );
    err
}
